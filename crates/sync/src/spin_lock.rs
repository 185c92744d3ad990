//! 自旋锁封装
//!
//! 提供对数据的互斥访问的自旋锁类型，由 [`lock_api`] 在 [`RawSpinLock`] 之上构建。

use crate::raw_spin_lock::RawSpinLock;

/// 提供对数据的互斥访问的自旋锁。
///
/// # 示例
/// ```ignore
/// let lock = SpinLock::new(0);
/// {
///     let mut guard = lock.lock(); // 获取锁
///     *guard += 1; // 访问和修改数据
/// } // 离开作用域，自动释放锁
/// ```
///
/// # 注意
/// SpinLock 不是可重入的。当持有锁时，尝试再次获取锁将导致死锁。
pub type SpinLock<T> = lock_api::Mutex<RawSpinLock, T>;

/// SpinLock 的 RAII 保护器，离开作用域时自动释放锁。
pub type SpinLockGuard<'a, T> = lock_api::MutexGuard<'a, RawSpinLock, T>;

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn test_spin_lock_counts_across_threads() {
        let counter = Arc::new(SpinLock::new(0usize));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        *counter.lock() += 1;
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*counter.lock(), 4000);
    }

    #[test]
    fn test_try_lock_while_held() {
        let lock = SpinLock::new(());
        let guard = lock.lock();
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(lock.try_lock().is_some());
    }
}
