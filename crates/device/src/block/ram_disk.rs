//! 内存模拟块设备

use super::BlockDriver;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use log::warn;
use sync::SpinLock;

/// 擦除后的字节值
pub const ERASE_VALUE: u8 = 0xff;

/// 内存模拟的闪存设备
///
/// 用于测试和 RAM 部署
pub struct RamDisk {
    /// 存储数据
    data: SpinLock<Vec<u8>>,

    /// 擦除块大小
    block_size: usize,

    /// 设备 ID
    device_id: usize,

    reads: AtomicUsize,
    progs: AtomicUsize,
    erases: AtomicUsize,
}

/// 设备操作计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskStats {
    /// 读操作次数
    pub reads: usize,
    /// 编程操作次数
    pub progs: usize,
    /// 擦除操作次数
    pub erases: usize,
}

impl RamDisk {
    /// 创建指定大小的内存磁盘
    pub fn new(size: usize, block_size: usize, device_id: usize) -> Arc<Self> {
        Self::from_bytes(vec![0u8; size], block_size, device_id)
    }

    /// 从字节数组创建
    pub fn from_bytes(data: Vec<u8>, block_size: usize, device_id: usize) -> Arc<Self> {
        Arc::new(Self {
            data: SpinLock::new(data),
            block_size,
            device_id,
            reads: AtomicUsize::new(0),
            progs: AtomicUsize::new(0),
            erases: AtomicUsize::new(0),
        })
    }

    /// 获取原始数据（用于调试）
    pub fn raw_data(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    /// 获取设备 ID
    pub fn device_id(&self) -> usize {
        self.device_id
    }

    /// 获取累计的操作计数
    pub fn stats(&self) -> DiskStats {
        DiskStats {
            reads: self.reads.load(Ordering::Relaxed),
            progs: self.progs.load(Ordering::Relaxed),
            erases: self.erases.load(Ordering::Relaxed),
        }
    }

    /// 计算块内区间在底层数组中的位置，越界返回 None
    fn span(&self, len: usize, block_id: usize, offset: usize, size: usize) -> Option<usize> {
        if offset.checked_add(size)? > self.block_size {
            return None;
        }
        let start = block_id.checked_mul(self.block_size)?.checked_add(offset)?;
        (start + size <= len).then_some(start)
    }
}

impl BlockDriver for RamDisk {
    fn read(&self, block_id: usize, offset: usize, buf: &mut [u8]) -> bool {
        let data = self.data.lock();
        let Some(start) = self.span(data.len(), block_id, offset, buf.len()) else {
            warn!(
                "ramdisk{}: read out of range: block {} offset {} len {}",
                self.device_id,
                block_id,
                offset,
                buf.len()
            );
            return false;
        };
        buf.copy_from_slice(&data[start..start + buf.len()]);
        self.reads.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn prog(&self, block_id: usize, offset: usize, buf: &[u8]) -> bool {
        let mut data = self.data.lock();
        let Some(start) = self.span(data.len(), block_id, offset, buf.len()) else {
            warn!(
                "ramdisk{}: prog out of range: block {} offset {} len {}",
                self.device_id,
                block_id,
                offset,
                buf.len()
            );
            return false;
        };
        data[start..start + buf.len()].copy_from_slice(buf);
        self.progs.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn erase(&self, block_id: usize) -> bool {
        let mut data = self.data.lock();
        let Some(start) = self.span(data.len(), block_id, 0, self.block_size) else {
            warn!("ramdisk{}: erase out of range: block {}", self.device_id, block_id);
            return false;
        };
        data[start..start + self.block_size].fill(ERASE_VALUE);
        self.erases.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn sync(&self) -> bool {
        true // 内存设备无需 flush
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn total_blocks(&self) -> usize {
        self.data.lock().len() / self.block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramdisk_prog_read_roundtrip() {
        let rd = RamDisk::new(4096, 512, 1);
        assert_eq!(rd.block_size(), 512);
        assert_eq!(rd.total_blocks(), 8);

        let wbuf = [0xAAu8; 128];
        assert!(rd.prog(3, 256, &wbuf));

        let mut rbuf = [0u8; 128];
        assert!(rd.read(3, 256, &mut rbuf));
        assert_eq!(rbuf, wbuf);

        // Other blocks remain zero.
        let mut rbuf2 = [0u8; 512];
        assert!(rd.read(2, 0, &mut rbuf2));
        assert_eq!(rbuf2, [0u8; 512]);
    }

    #[test]
    fn test_ramdisk_erase_fills_block() {
        let rd = RamDisk::new(1024, 512, 1);
        assert!(rd.erase(1));
        let mut buf = [0u8; 512];
        assert!(rd.read(1, 0, &mut buf));
        assert!(buf.iter().all(|&b| b == ERASE_VALUE));
        assert!(rd.read(0, 0, &mut buf));
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(rd.stats().erases, 1);
    }

    #[test]
    fn test_ramdisk_bounds() {
        let rd = RamDisk::new(1024, 512, 1);
        assert_eq!(rd.total_blocks(), 2);

        let mut buf = [0u8; 16];
        assert!(!rd.read(0, 500, &mut buf)); // crosses block end
        assert!(!rd.read(2, 0, &mut buf)); // out of range
        assert!(!rd.prog(2, 0, &buf));
        assert!(!rd.erase(2));
        assert_eq!(rd.stats(), DiskStats::default());
    }
}
