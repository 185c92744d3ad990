//! 时间源
//!
//! 元数据层写入的时间戳都来自 [`Clock`]，单位为自纪元以来的秒数，允许带小数部分。

use core::sync::atomic::{AtomicU64, Ordering};

/// 时间源接口
pub trait Clock: Send + Sync {
    /// 读取自纪元以来的秒数
    fn now(&self) -> f64;
}

/// 由软件推进的时钟
///
/// 没有硬件 RTC 的 RAM 部署使用，初值通常来自启动参数。
#[derive(Debug)]
pub struct SoftClock {
    bits: AtomicU64,
}

impl SoftClock {
    /// 以给定的纪元秒数创建
    pub const fn new(epoch: f64) -> Self {
        Self {
            bits: AtomicU64::new(epoch.to_bits()),
        }
    }

    /// 设置当前时间
    pub fn set(&self, epoch: f64) {
        self.bits.store(epoch.to_bits(), Ordering::Release);
    }

    /// 向前推进若干秒
    pub fn advance(&self, secs: f64) {
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + secs).to_bits())
            });
    }
}

impl Clock for SoftClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}
