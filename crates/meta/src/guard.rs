//! 磁盘访问守卫
//!
//! [`DiskGuard`] 独占地持有块存储，只有通过 [`DiskGuard::lock`] 拿到的
//! [`DiskAccess`] 才能访问它。`DiskAccess` 离开作用域时释放锁，
//! 因此每次 `lock` 恰好对应一次 `unlock`，提前返回和 panic 展开也不例外。

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};

use sync::DiskLock;

/// 由 [`DiskLock`] 保护的块存储
pub struct DiskGuard<S, L: DiskLock> {
    lock: L,
    store: UnsafeCell<S>,
}

// SAFETY: 对 store 的访问全部经过 lock，DiskLock 的实现保证同一时刻只有一个 DiskAccess
unsafe impl<S: Send, L: DiskLock> Sync for DiskGuard<S, L> {}

impl<S, L: DiskLock> DiskGuard<S, L> {
    /// 创建守卫
    pub const fn new(store: S, lock: L) -> Self {
        Self {
            lock,
            store: UnsafeCell::new(store),
        }
    }

    /// 阻塞获取锁
    pub fn lock(&self) -> DiskAccess<'_, S, L> {
        self.lock.lock();
        DiskAccess { guard: self }
    }

    /// 已独占时直接访问，无需加锁
    pub fn get_mut(&mut self) -> &mut S {
        self.store.get_mut()
    }

    /// 锁资源
    pub fn raw_lock(&self) -> &L {
        &self.lock
    }

    /// 取回块存储
    pub fn into_inner(self) -> S {
        self.store.into_inner()
    }
}

/// 持锁期间对块存储的访问
pub struct DiskAccess<'a, S, L: DiskLock> {
    guard: &'a DiskGuard<S, L>,
}

impl<S, L: DiskLock> Deref for DiskAccess<'_, S, L> {
    type Target = S;

    fn deref(&self) -> &S {
        // SAFETY: 持有锁期间没有其他访问者
        unsafe { &*self.guard.store.get() }
    }
}

impl<S, L: DiskLock> DerefMut for DiskAccess<'_, S, L> {
    fn deref_mut(&mut self) -> &mut S {
        // SAFETY: 持有锁期间没有其他访问者
        unsafe { &mut *self.guard.store.get() }
    }
}

impl<S, L: DiskLock> Drop for DiskAccess<'_, S, L> {
    fn drop(&mut self) {
        // SAFETY: DiskAccess 只由 DiskGuard::lock 在加锁后构造，且每个只 drop 一次
        unsafe { self.guard.lock.unlock() };
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::sync::Arc;
    use std::thread;
    use std::vec::Vec;
    use sync::RawSpinLock;
    use test_support::{LockEvent, RecordingLock};

    #[test]
    fn test_access_pairs_lock_and_unlock() {
        let guard = DiskGuard::new(0u32, RecordingLock::new());
        {
            let mut access = guard.lock();
            *access += 1;
        }
        assert_eq!(*guard.lock(), 1);
        assert_eq!(
            guard.raw_lock().events(),
            [LockEvent::Enter, LockEvent::Exit, LockEvent::Enter, LockEvent::Exit]
        );
    }

    #[test]
    fn test_access_holds_the_lock() {
        let guard = DiskGuard::new(0u32, RawSpinLock::new());
        let access = guard.lock();
        assert!(guard.raw_lock().is_locked());
        assert!(guard.raw_lock().try_lock().is_none());
        drop(access);
        assert!(!guard.raw_lock().is_locked());
    }

    #[test]
    fn test_concurrent_increments() {
        let guard = Arc::new(DiskGuard::new(0usize, RawSpinLock::new()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let guard = guard.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        *guard.lock() += 1;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*guard.lock(), 4000);
        assert!(!guard.raw_lock().is_locked());
    }
}
