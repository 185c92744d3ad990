use std::sync::Arc;

use device::RamDisk;
use meta::usage::{Usage, size_of_path};
use meta::{Filesystem, RAMFS_MAGIC};
use store::{Geometry, RamStore};
use sync::RawSpinLock;
use test_support::MockClock;

fn mounted() -> Filesystem<RamStore, RawSpinLock> {
    Filesystem::mount(1, RawSpinLock::new(), Arc::new(MockClock::new(0.0)))
}

#[test]
fn test_fresh_filesystem() {
    let fs = mounted();
    let stat = fs.statvfs();
    assert_eq!(stat.fs_type, RAMFS_MAGIC);
    assert_eq!(stat.fs_type, 2_245_214_966);
    assert_eq!(stat.bsize, 4096);
    assert_eq!(stat.blocks, 256);
    assert_eq!(stat.blocks - stat.bfree, 2);
    assert_eq!(stat.bavail, stat.bfree);
    assert_eq!(stat.files, 0);
    assert_eq!(stat.dirs, 1);
    assert_eq!(stat.ffree, i32::MAX as usize);
}

#[test]
fn test_file_data_consumes_blocks() {
    let fs = mounted();
    let before = fs.statvfs();

    fs.write_file("/a", &[1u8; 5000]).unwrap();
    let after = fs.statvfs();
    assert!(after.bfree < before.bfree);
    assert_eq!(before.bfree - after.bfree, 2);
    assert_eq!(after.files, 1);
    assert_eq!(after.ffree, before.ffree - 1);

    fs.remove("/a").unwrap();
    assert_eq!(fs.statvfs(), before);
}

#[test]
fn test_directories_are_counted() {
    let fs = mounted();
    fs.mkdir("/d", 0o755).unwrap();
    fs.mkdir("/d/e", 0o755).unwrap();
    fs.write_file("/d/e/f", b"hello").unwrap();

    let stat = fs.statvfs();
    assert_eq!(stat.dirs, 3);
    assert_eq!(stat.files, 1);
    // 根目录块对 + 两个目录块对 + 一个数据块
    assert_eq!(stat.blocks - stat.bfree, 7);
}

#[test]
fn test_empty_directory_usage() {
    let fs = mounted();
    fs.mkdir("/d", 0o755).unwrap();
    let disk = fs.lock();

    let mut usage = Usage { files: 4, dirs: 4 };
    assert_eq!(size_of_path(&*disk, "/d", Some(&mut usage)), 0);
    assert_eq!(usage, Usage { files: 4, dirs: 5 });
}

#[test]
fn test_directory_with_file_and_subdir() {
    let fs = mounted();
    fs.mkdir("/d", 0o755).unwrap();
    fs.write_file("/d/f", &[0u8; 100]).unwrap();
    fs.mkdir("/d/s", 0o755).unwrap();

    {
        let disk = fs.lock();
        let mut usage = Usage::default();
        assert_eq!(size_of_path(&*disk, "/d", Some(&mut usage)), 100);
        assert_eq!(usage, Usage { files: 1, dirs: 2 });
        assert_eq!(disk.open_dirs(), 0);
    }
    assert_eq!(fs.query_attributes("/d").size, 100);
}

#[test]
#[should_panic(expected = "statvfs traversal failed")]
fn test_traversal_failure_is_fatal() {
    let disk = RamDisk::new(512 * 8, 512, 0);
    let mut store = RamStore::new(disk, Geometry::new(512, 8));
    store.format().unwrap();
    // 未挂载的存储拒绝遍历
    let fs = Filesystem::with_store(store, RawSpinLock::new(), Arc::new(MockClock::new(0.0)));
    fs.statvfs();
}
