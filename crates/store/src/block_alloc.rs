//! 块分配器
//!
//! 使用位图记录块的占用情况。分配从一个循环前进的游标开始扫描，
//! 使新的写入轮流落在不同的擦除块上。

use alloc::vec;
use alloc::vec::Vec;

use crate::StoreError;

/// 擦除块分配器
#[derive(Debug, Clone)]
pub struct BlockAllocator {
    used: Vec<bool>,
    cursor: usize,
    free: usize,
}

impl BlockAllocator {
    /// 创建全部空闲的分配器
    pub fn new(block_count: usize) -> Self {
        Self {
            used: vec![false; block_count],
            cursor: 0,
            free: block_count,
        }
    }

    /// 标记指定块为已占用（格式化时保留超级块使用）
    pub fn reserve(&mut self, block: usize) {
        if let Some(slot) = self.used.get_mut(block) {
            if !*slot {
                *slot = true;
                self.free -= 1;
            }
        }
    }

    /// 分配一个空闲块
    pub fn alloc(&mut self) -> Result<usize, StoreError> {
        let count = self.used.len();
        if self.free == 0 {
            return Err(StoreError::NoSpace);
        }
        for step in 0..count {
            let block = (self.cursor + step) % count;
            if !self.used[block] {
                self.used[block] = true;
                self.free -= 1;
                self.cursor = (block + 1) % count;
                return Ok(block);
            }
        }
        Err(StoreError::NoSpace)
    }

    /// 释放一个块
    pub fn free(&mut self, block: usize) {
        if let Some(slot) = self.used.get_mut(block) {
            if *slot {
                *slot = false;
                self.free += 1;
            }
        }
    }

    /// 空闲块数量
    pub fn free_count(&self) -> usize {
        self.free
    }

    /// 块是否已被占用
    pub fn is_used(&self, block: usize) -> bool {
        self.used.get(block).copied().unwrap_or(false)
    }
}
