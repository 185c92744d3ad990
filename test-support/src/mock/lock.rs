//! 记录加解锁顺序的锁

use alloc::vec::Vec;
use sync::{DiskLock, RawSpinLock, SpinLock};

/// 锁事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    /// 进入临界区
    Enter,
    /// 离开临界区
    Exit,
}

/// 在自旋锁之上记录每次进入和离开临界区
///
/// 事件在持锁期间追加，因此记录顺序就是临界区的真实顺序。
pub struct RecordingLock {
    raw: RawSpinLock,
    events: SpinLock<Vec<LockEvent>>,
}

impl RecordingLock {
    /// 创建一个未加锁、没有记录的实例
    pub const fn new() -> Self {
        Self {
            raw: RawSpinLock::new(),
            events: SpinLock::new(Vec::new()),
        }
    }

    /// 到目前为止的事件
    pub fn events(&self) -> Vec<LockEvent> {
        self.events.lock().clone()
    }

    /// 进入临界区的次数
    pub fn enters(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|&&e| e == LockEvent::Enter)
            .count()
    }

    /// 清空记录
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for RecordingLock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: 互斥完全委托给内部的 RawSpinLock
unsafe impl DiskLock for RecordingLock {
    fn lock(&self) {
        DiskLock::lock(&self.raw);
        self.events.lock().push(LockEvent::Enter);
    }

    unsafe fn unlock(&self) {
        self.events.lock().push(LockEvent::Exit);
        // SAFETY: 调用者保证当前持有锁
        unsafe { DiskLock::unlock(&self.raw) };
    }
}
