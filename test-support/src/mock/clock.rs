//! 可手动设置的时间源

use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use device::Clock;

/// Mock 的时钟，同时统计读取次数
pub struct MockClock {
    bits: AtomicU64,
    reads: AtomicUsize,
}

impl MockClock {
    /// 创建停在 `now` 的时钟
    pub const fn new(now: f64) -> Self {
        Self {
            bits: AtomicU64::new(now.to_bits()),
            reads: AtomicUsize::new(0),
        }
    }

    /// 把时钟拨到 `now`
    pub fn set(&self, now: f64) {
        self.bits.store(now.to_bits(), Ordering::SeqCst);
    }

    /// `now()` 被调用的次数
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Clock for MockClock {
    fn now(&self) -> f64 {
        self.reads.fetch_add(1, Ordering::SeqCst);
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
