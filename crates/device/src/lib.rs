//! 闪存块设备驱动
//!
//! 此 crate 提供块设备的抽象接口和内存实现：
//!
//! - [`BlockDriver`] trait - 以擦除块为单位寻址、支持块内偏移读写的闪存设备接口
//! - [`RamDisk`] - 内存模拟的闪存设备
//! - [`Clock`] trait - 时间戳来源

#![no_std]

extern crate alloc;

pub mod block;
pub mod rtc;

pub use block::{BlockDriver, DiskStats, ERASE_VALUE, RamDisk};
pub use rtc::{Clock, SoftClock};
