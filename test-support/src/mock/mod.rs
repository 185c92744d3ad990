//! Mock 实现模块
//!
//! 提供各个子系统的 Mock 实现，用于测试

pub mod clock;
pub mod lock;
pub mod counting_store;

pub use clock::MockClock;
pub use lock::{LockEvent, RecordingLock};
pub use counting_store::CountingStore;
