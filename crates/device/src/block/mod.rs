//! 块设备模块
//!
//! 包含块设备相关的驱动接口和实现

mod ram_disk;

pub use ram_disk::{DiskStats, ERASE_VALUE, RamDisk};

/// 闪存块设备驱动程序接口
///
/// 设备按擦除块编号寻址，读和编程操作可以落在块内任意偏移。
/// 编程前目标区域应当已被擦除，是否检查由具体设备决定。
pub trait BlockDriver: Send + Sync {
    /// 读取块设备数据
    /// # 参数：
    /// * `block_id` - 擦除块编号
    /// * `offset` - 块内偏移
    /// * `buf` - 用于存储读取数据的缓冲区
    /// # 返回值：
    /// 如果读取成功则返回 true，否则返回 false
    fn read(&self, block_id: usize, offset: usize, buf: &mut [u8]) -> bool;

    /// 编程（写入）块设备数据
    /// # 参数：
    /// * `block_id` - 擦除块编号
    /// * `offset` - 块内偏移
    /// * `buf` - 包含要写入数据的缓冲区
    /// # 返回值：
    /// 如果写入成功则返回 true，否则返回 false
    fn prog(&self, block_id: usize, offset: usize, buf: &[u8]) -> bool;

    /// 擦除整个块
    /// # 返回值：
    /// 如果擦除成功则返回 true，否则返回 false
    fn erase(&self, block_id: usize) -> bool;

    /// 刷新到介质
    fn sync(&self) -> bool {
        true
    }

    /// 获取擦除块大小（字节）
    fn block_size(&self) -> usize;

    /// 获取总块数
    fn total_blocks(&self) -> usize;
}
