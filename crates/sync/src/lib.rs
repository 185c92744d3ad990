//! 同步原语
//!
//! 向文件系统各层提供基本的锁原语：
//!
//! - [`RawSpinLock`] - 基于原子操作的自旋锁，实现了 [`lock_api::RawMutex`]
//! - [`SpinLock`] - 保护数据的自旋互斥锁
//! - [`DiskLock`] - 磁盘访问锁能力接口，挂载时注入，用于串行化所有对块存储的访问

#![no_std]

mod disk_lock;
mod raw_spin_lock;
mod spin_lock;

pub use disk_lock::*;
pub use raw_spin_lock::*;
pub use spin_lock::*;
