//! 磁盘访问锁能力接口
//!
//! 文件系统在挂载时接收一个 [`DiskLock`]，之后每个触及块存储的操作都在
//! `lock()` / `unlock()` 之间执行。

use lock_api::RawMutex;

use crate::raw_spin_lock::RawSpinLock;

/// 可阻塞获取的锁资源
///
/// 等待者之间的顺序由实现自行决定。
///
/// # Safety
///
/// 上层依赖这个锁交出块存储的独占可变引用，实现必须保证互斥：
/// `lock` 返回后，在对应的 `unlock` 之前，其他调用者的 `lock` 不会返回。
/// 因此实现本 trait 需要 `unsafe impl`，安全代码写不出不互斥的锁：
///
/// ```compile_fail
/// struct NoopLock;
///
/// impl sync::DiskLock for NoopLock {
///     fn lock(&self) {}
///     unsafe fn unlock(&self) {}
/// }
/// ```
pub unsafe trait DiskLock: Send + Sync {
    /// 阻塞直到获得锁
    fn lock(&self);

    /// 释放锁
    ///
    /// # Safety
    ///
    /// 只能由当前持有锁的一方调用，且每次 `lock` 恰好对应一次 `unlock`。
    unsafe fn unlock(&self);
}

// SAFETY: acquire 自旋直到独占，release 之前其他 acquire 不会返回
unsafe impl DiskLock for RawSpinLock {
    fn lock(&self) {
        self.acquire();
    }

    unsafe fn unlock(&self) {
        self.release();
    }
}

/// 将任意 [`lock_api::RawMutex`] 适配为 [`DiskLock`]
#[derive(Debug)]
pub struct RawDiskLock<R: RawMutex> {
    raw: R,
}

impl<R: RawMutex> RawDiskLock<R> {
    /// 创建一个未加锁的实例
    pub const fn new() -> Self {
        Self { raw: R::INIT }
    }
}

impl<R: RawMutex> Default for RawDiskLock<R> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: RawMutex 本身就是 unsafe trait，互斥由它保证
unsafe impl<R: RawMutex + Send + Sync> DiskLock for RawDiskLock<R> {
    fn lock(&self) {
        self.raw.lock();
    }

    unsafe fn unlock(&self) {
        // SAFETY: 调用者保证当前持有锁
        unsafe { self.raw.unlock() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_spin_lock_as_disk_lock() {
        let lock = RawSpinLock::new();
        DiskLock::lock(&lock);
        assert!(lock.is_locked());
        unsafe { DiskLock::unlock(&lock) };
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_adapter_over_raw_mutex() {
        let lock: RawDiskLock<RawSpinLock> = RawDiskLock::new();
        lock.lock();
        assert!(lock.raw.is_locked());
        unsafe { lock.unlock() };
        assert!(!lock.raw.is_locked());
    }
}
