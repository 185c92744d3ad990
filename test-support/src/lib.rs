//! 测试支持 crate
//!
//! 提供锁、块存储和时间源的 Mock 实现

#![no_std]

extern crate alloc;

pub mod mock;

pub use mock::{CountingStore, LockEvent, MockClock, RecordingLock};
