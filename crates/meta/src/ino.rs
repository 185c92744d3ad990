//! inode 号分配
//!
//! 总是分配最小的可用编号。0 号保留给根目录，永远不会分配出去或被释放。

use alloc::collections::BTreeSet;
use sync::SpinLock;

/// 根目录的 inode 号
pub const ROOT_INO: u32 = 0;

/// inode 号池
pub struct InoPool {
    used: SpinLock<BTreeSet<u32>>,
}

impl InoPool {
    /// 创建只保留了根目录编号的池
    pub fn new() -> Self {
        let mut used = BTreeSet::new();
        used.insert(ROOT_INO);
        Self {
            used: SpinLock::new(used),
        }
    }

    /// 分配一个编号
    pub fn alloc(&self) -> u32 {
        let mut used = self.used.lock();
        // 查找最小可用编号
        let mut next = ROOT_INO;
        for &ino in used.iter() {
            if ino != next {
                break;
            }
            next += 1;
        }
        used.insert(next);
        next
    }

    /// 标记编号为已占用（接管已有数据时使用）
    pub fn reserve(&self, ino: u32) {
        self.used.lock().insert(ino);
    }

    /// 归还编号
    pub fn release(&self, ino: u32) {
        if ino != ROOT_INO {
            self.used.lock().remove(&ino);
        }
    }

    /// 已分配的编号数（含根目录）
    pub fn in_use(&self) -> usize {
        self.used.lock().len()
    }
}

impl Default for InoPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_free_first() {
        let pool = InoPool::new();
        assert_eq!(pool.alloc(), 1);
        assert_eq!(pool.alloc(), 2);
        assert_eq!(pool.alloc(), 3);
        pool.release(2);
        assert_eq!(pool.alloc(), 2);
        assert_eq!(pool.in_use(), 4);
    }

    #[test]
    fn test_root_is_never_released() {
        let pool = InoPool::new();
        pool.release(ROOT_INO);
        assert_eq!(pool.alloc(), 1);
    }

    #[test]
    fn test_reserve_skips_number() {
        let pool = InoPool::new();
        pool.reserve(2);
        assert_eq!(pool.alloc(), 1);
        assert_eq!(pool.alloc(), 3);
    }
}
