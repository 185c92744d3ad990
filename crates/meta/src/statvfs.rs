//! 文件系统统计

use log::debug;
use store::{BlockStore, StoreError};

use crate::usage::{Usage, size_of_path};

/// RAMFS 魔数，作为文件系统类型上报
pub const RAMFS_MAGIC: u32 = 0x85d3_42f6;

/// statvfs 结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatVfs {
    /// 文件系统类型
    pub fs_type: u32,
    /// 块大小
    pub bsize: usize,
    /// 总块数
    pub blocks: usize,
    /// 空闲块数
    pub bfree: usize,
    /// 非特权用户可用块数，与 `bfree` 相同
    pub bavail: usize,
    /// 普通文件数
    pub files: usize,
    /// 还能创建的文件数
    pub ffree: usize,
    /// 目录数
    pub dirs: usize,
}

/// 遍历全部在用块并统计文件树，构造 [`StatVfs`]
pub fn build<S: BlockStore>(store: &S) -> Result<StatVfs, StoreError> {
    let geometry = *store.geometry();

    let mut bfree = geometry.block_count;
    store.traverse(&mut |_block: usize| {
        bfree = bfree.checked_sub(1).ok_or(StoreError::Corrupt)?;
        Ok(())
    })?;

    let mut usage = Usage::default();
    size_of_path(store, "/", Some(&mut usage));

    let stat = StatVfs {
        fs_type: RAMFS_MAGIC,
        bsize: geometry.block_size,
        blocks: geometry.block_count,
        bfree,
        bavail: bfree,
        files: usage.files,
        ffree: geometry.file_max.saturating_sub(usage.files),
        dirs: usage.dirs,
    };
    debug!(
        "meta: statvfs {}/{} blocks free, {} files, {} dirs",
        stat.bfree, stat.blocks, stat.files, stat.dirs
    );
    Ok(stat)
}
