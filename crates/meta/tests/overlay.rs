use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use device::RamDisk;
use meta::{Attributes, Filesystem};
use store::{BlockStore, Geometry, RamStore, StoreError};
use test_support::{CountingStore, MockClock, RecordingLock};

fn ram_store() -> RamStore {
    let disk = RamDisk::new(512 * 64, 512, 0);
    let mut store = RamStore::new(disk, Geometry::new(512, 64));
    store.format().unwrap();
    store.mount().unwrap();
    store
}

fn counting_fs() -> (
    Filesystem<CountingStore<RamStore>, RecordingLock>,
    Arc<AtomicUsize>,
) {
    let mut store = ram_store();
    store.create("/f").unwrap();
    store.write("/f", 0, &[0xab; 42]).unwrap();
    store.mkdir("/d").unwrap();
    let store = CountingStore::new(store);
    let counter = store.counter();
    let fs = Filesystem::with_store(store, RecordingLock::new(), Arc::new(MockClock::new(0.0)));
    (fs, counter)
}

fn sample() -> Attributes {
    Attributes {
        ino: 17,
        mode: 0o100640,
        uid: 1000,
        gid: 1001,
        birthtime: 1_700_000_000.25,
        atime: 1_700_000_001.5,
        mtime: 1_700_000_002.75,
        ctime: 1_700_000_003.0,
        nlink: 3,
        link: true,
        symlink: true,
    }
}

#[test]
fn test_unattributed_path_reads_zero() {
    let (fs, _) = counting_fs();
    let meta = fs.query_attributes("/f");
    assert_eq!(meta.attrs, Attributes::default());
    assert_eq!(meta.size, 42);

    let meta = fs.query_attributes("/d");
    assert_eq!(meta.attrs, Attributes::default());
    assert_eq!(meta.size, 0);
}

#[test]
fn test_missing_path_is_all_zero() {
    let (fs, _) = counting_fs();
    let meta = fs.query_attributes("/nope");
    assert_eq!(meta.attrs, Attributes::default());
    assert_eq!(meta.size, 0);
}

#[test]
fn test_patch_then_query_round_trips() {
    let (fs, _) = counting_fs();
    let want = sample();
    assert_eq!(fs.patch_attributes("/f", &want), Ok(11));
    let meta = fs.query_attributes("/f");
    assert_eq!(meta.attrs, want);
    assert_eq!(meta.size, 42);

    fs.patch_attributes("/d", &want).unwrap();
    assert_eq!(fs.query_attributes("/d").attrs, want);
}

#[test]
fn test_patch_with_equal_record_writes_nothing() {
    let (fs, counter) = counting_fs();
    fs.patch_attributes("/f", &sample()).unwrap();
    let before = counter.load(Ordering::SeqCst);

    assert_eq!(fs.patch_attributes("/f", &sample()), Ok(0));
    assert_eq!(counter.load(Ordering::SeqCst), before);
}

#[test]
fn test_patch_single_field() {
    let (fs, counter) = counting_fs();
    fs.patch_attributes("/f", &sample()).unwrap();
    let mut next = fs.query_attributes("/f").attrs;
    next.mtime += 1.0;
    let before = counter.load(Ordering::SeqCst);
    assert_eq!(fs.patch_attributes("/f", &next), Ok(1));
    assert_eq!(counter.load(Ordering::SeqCst), before + 1);
}

#[test]
fn test_reset_is_idempotent() {
    let (fs, _) = counting_fs();
    fs.patch_attributes("/f", &sample()).unwrap();
    fs.reset_attributes("/f").unwrap();
    let once = fs.query_attributes("/f");
    fs.reset_attributes("/f").unwrap();
    let twice = fs.query_attributes("/f");
    assert_eq!(once, twice);
    assert_eq!(once.attrs, Attributes::default());
}

#[test]
fn test_first_failed_write_is_returned() {
    let mut store = ram_store();
    store.create("/f").unwrap();
    let store = CountingStore::new(store);
    store.fail_set_attr_after(1);
    let counter = store.counter();
    let fs = Filesystem::with_store(store, RecordingLock::new(), Arc::new(MockClock::new(0.0)));

    assert_eq!(fs.patch_attributes("/f", &sample()), Err(StoreError::Io));
    // 一次成功，一次失败，不重试
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(fs.query_attributes("/f").attrs.ino, 17);
    assert_eq!(fs.query_attributes("/f").attrs.mode, 0);
}

#[test]
fn test_patch_on_missing_path_fails() {
    let (fs, _) = counting_fs();
    assert_eq!(
        fs.patch_attributes("/nope", &sample()),
        Err(StoreError::NoEntry)
    );
    assert_eq!(fs.reset_attributes("/nope"), Err(StoreError::NoEntry));
}
