use std::sync::Arc;
use std::thread;

use meta::{Attributes, Filesystem, TouchKind};
use store::RamStore;
use test_support::{LockEvent, MockClock, RecordingLock};

type Fs = Filesystem<RamStore, RecordingLock>;

fn mounted() -> Arc<Fs> {
    let fs = Filesystem::mount(1, RecordingLock::new(), Arc::new(MockClock::new(1.0)));
    fs.disk_lock().clear();
    Arc::new(fs)
}

fn assert_alternating(events: &[LockEvent]) {
    assert_eq!(events.len() % 2, 0);
    for pair in events.chunks(2) {
        assert_eq!(pair, [LockEvent::Enter, LockEvent::Exit]);
    }
}

/// 执行一次操作并返回它进入临界区的次数
fn enters(fs: &Fs, op: impl FnOnce(&Fs)) -> usize {
    fs.disk_lock().clear();
    op(fs);
    let events = fs.disk_lock().events();
    assert_alternating(&events);
    fs.disk_lock().enters()
}

#[test]
fn test_each_operation_locks_once() {
    let fs = mounted();
    fs.write_file("/f", b"data").unwrap();
    fs.mkdir("/d", 0o755).unwrap();

    let query = |fs: &Fs| {
        let _ = fs.query_attributes("/d");
    };
    assert_eq!(enters(&fs, query), 1);
    let statvfs = |fs: &Fs| {
        let _ = fs.statvfs();
    };
    assert_eq!(enters(&fs, statvfs), 1);
    let stat = |fs: &Fs| {
        let _ = fs.stat("/f");
    };
    assert_eq!(enters(&fs, stat), 1);

    // 先查询再 patch 是两个独立操作
    let query_then_patch = |fs: &Fs| {
        let attrs = Attributes {
            uid: 3,
            ..fs.query_attributes("/f").attrs
        };
        fs.patch_attributes("/f", &attrs).unwrap();
    };
    assert_eq!(enters(&fs, query_then_patch), 2);

    assert_eq!(enters(&fs, |fs| fs.reset_attributes("/f").unwrap()), 1);
    assert_eq!(enters(&fs, |fs| fs.write_file("/g", b"x").unwrap()), 1);
    assert_eq!(enters(&fs, |fs| assert_eq!(fs.read_file("/g").unwrap(), b"x")), 1);
    assert_eq!(
        enters(&fs, |fs| fs.touch("/g", TouchKind::Birth, None).unwrap()),
        1
    );
    assert_eq!(enters(&fs, |fs| fs.remove("/g").unwrap()), 1);
}

#[test]
fn test_failed_operation_still_unlocks() {
    let fs = mounted();
    assert_eq!(enters(&fs, |fs| assert!(fs.read_file("/missing").is_err())), 1);
    assert_eq!(enters(&fs, |fs| assert!(fs.remove("/missing").is_err())), 1);
    assert!(fs.disk_lock().events().ends_with(&[LockEvent::Exit]));
}

#[test]
fn test_parallel_operations_are_serialised() {
    let fs = mounted();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let fs = fs.clone();
            thread::spawn(move || {
                for i in 0..16 {
                    let path = format!("/t{}_{}", t, i);
                    fs.write_file(&path, path.as_bytes()).unwrap();
                    let mut attrs = fs.query_attributes(&path).attrs;
                    attrs.uid = t;
                    fs.patch_attributes(&path, &attrs).unwrap();
                    fs.statvfs();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let events = fs.disk_lock().events();
    assert_alternating(&events);
    // 每次迭代四个操作
    assert_eq!(fs.disk_lock().enters(), 4 * 16 * 4);

    let stat = fs.statvfs();
    assert_eq!(stat.files, 64);
    for t in 0..4u32 {
        for i in 0..16 {
            let path = format!("/t{}_{}", t, i);
            assert_eq!(fs.query_attributes(&path).attrs.uid, t);
            assert_eq!(fs.read_file(&path).unwrap(), path.as_bytes());
        }
    }
    // 64 个文件各分配一个不同的 inode 号
    assert_eq!(fs.inodes_in_use(), 65);
}
