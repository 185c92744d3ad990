//! 自旋锁实现
//!
//! 基于原子操作实现自旋锁机制。

use core::{
    hint,
    sync::atomic::{AtomicBool, Ordering},
};

use lock_api::{GuardSend, RawMutex};

/// 自旋锁结构体，提供互斥访问临界区的能力。
///
/// 不可重入 (即不能嵌套调用 RawSpinLock::lock())。
///
/// # 示例
/// ```ignore
/// let lock = RawSpinLock::new();
/// {
///   let guard = lock.lock(); // 获取锁
///   // 临界区代码
/// } // 离开作用域，自动释放锁
/// ```
#[derive(Debug)]
pub struct RawSpinLock {
    lock: AtomicBool,
}

impl RawSpinLock {
    /// 创建一个新的 RawSpinLock 实例。
    pub const fn new() -> Self {
        RawSpinLock {
            lock: AtomicBool::new(false),
        }
    }

    /// 获取自旋锁，并返回一个 RAII 保护器。
    pub fn lock(&self) -> RawSpinLockGuard<'_> {
        self.acquire();
        RawSpinLockGuard { lock: self }
    }

    /// 尝试获取自旋锁，如果成功则返回 RAII 保护器，否则返回 None。
    pub fn try_lock(&self) -> Option<RawSpinLockGuard<'_>> {
        self.try_acquire().then_some(RawSpinLockGuard { lock: self })
    }

    /// 检查锁是否被占用 (仅用于调试/测试)
    pub fn is_locked(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
    }

    /// 自旋直到获得锁标志。
    pub(crate) fn acquire(&self) {
        while self
            .lock
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.lock.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
        }
    }

    pub(crate) fn try_acquire(&self) -> bool {
        self.lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// 仅释放锁标志。
    pub(crate) fn release(&self) {
        self.lock.store(false, Ordering::Release);
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: acquire/release 使用 Acquire/Release 语义的原子操作，
// 同一时刻至多一个持有者。
unsafe impl RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawSpinLock::new();

    type GuardMarker = GuardSend;

    fn lock(&self) {
        self.acquire();
    }

    fn try_lock(&self) -> bool {
        self.try_acquire()
    }

    unsafe fn unlock(&self) {
        self.release();
    }

    fn is_locked(&self) -> bool {
        RawSpinLock::is_locked(self)
    }
}

/// 自动释放自旋锁的 RAII 结构体
pub struct RawSpinLockGuard<'a> {
    lock: &'a RawSpinLock,
}

impl Drop for RawSpinLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
