//! 块存储几何配置

use crate::StoreError;

/// littlefs 默认的最大文件大小
pub const DEFAULT_FILE_MAX: usize = i32::MAX as usize;
/// 默认最大文件名长度
pub const DEFAULT_NAME_MAX: usize = 255;
/// 默认单个属性最大长度
pub const DEFAULT_ATTR_MAX: usize = 1022;

/// 块存储的几何参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// 最小读取单元（字节）
    pub read_size: usize,
    /// 最小编程单元（字节）
    pub prog_size: usize,
    /// 擦除块大小（字节）
    pub block_size: usize,
    /// 擦除块数量
    pub block_count: usize,
    /// 块缓存大小（字节）
    pub cache_size: usize,
    /// 分配器预读窗口（字节，每字节对应 8 个块）
    pub lookahead_size: usize,
    /// 元数据块擦写周期阈值，-1 表示关闭磨损均衡
    pub block_cycles: i32,
    /// 最大文件大小
    pub file_max: usize,
    /// 最大文件名长度
    pub name_max: usize,
    /// 单个属性最大长度
    pub attr_max: usize,
}

impl Geometry {
    /// 以给定块大小和块数构造，其余参数取与块大小一致的默认值
    pub const fn new(block_size: usize, block_count: usize) -> Self {
        Self {
            read_size: block_size,
            prog_size: block_size,
            block_size,
            block_count,
            cache_size: block_size,
            lookahead_size: 16,
            block_cycles: -1,
            file_max: DEFAULT_FILE_MAX,
            name_max: DEFAULT_NAME_MAX,
            attr_max: DEFAULT_ATTR_MAX,
        }
    }

    /// 总容量（字节）
    pub fn capacity(&self) -> usize {
        self.block_size * self.block_count
    }

    /// 检查参数之间的整除关系
    pub fn validate(&self) -> Result<(), StoreError> {
        let sizes_ok = self.read_size > 0
            && self.prog_size > 0
            && self.block_size > 0
            && self.cache_size > 0
            && self.lookahead_size > 0;
        if !sizes_ok {
            return Err(StoreError::Invalid);
        }
        if self.cache_size % self.read_size != 0
            || self.cache_size % self.prog_size != 0
            || self.block_size % self.cache_size != 0
        {
            return Err(StoreError::Invalid);
        }
        // 根目录需要一个元数据块对
        if self.block_count < 2 {
            return Err(StoreError::Invalid);
        }
        if self.name_max == 0 || self.attr_max == 0 {
            return Err(StoreError::Invalid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_is_valid() {
        let g = Geometry::new(4096, 16);
        assert_eq!(g.validate(), Ok(()));
        assert_eq!(g.capacity(), 65536);
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let mut g = Geometry::new(4096, 1);
        assert_eq!(g.validate(), Err(StoreError::Invalid));

        g.block_count = 16;
        g.cache_size = 1000;
        assert_eq!(g.validate(), Err(StoreError::Invalid));

        g.cache_size = 1024;
        g.read_size = 0;
        assert_eq!(g.validate(), Err(StoreError::Invalid));
    }
}
