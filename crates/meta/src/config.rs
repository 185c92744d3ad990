//! 挂载参数

use store::Geometry;

/// 最小读取单元
pub const READ_SIZE: usize = 1024;
/// 最小编程单元
pub const PROG_SIZE: usize = 1024;
/// 擦除块大小
pub const BLOCK_SIZE: usize = 4096;
/// 块缓存大小
pub const CACHE_SIZE: usize = 1024;
/// 分配器预读窗口
pub const LOOKAHEAD_SIZE: usize = 1024;
/// 元数据块擦写周期阈值
pub const BLOCK_CYCLES: i32 = 500;

/// 默认容量（MiB）
pub const DEFAULT_SIZE_MB: usize = 256;
/// 新建目录的默认权限
pub const DEFAULT_PERM_DIR: u32 = 0o777;
/// 新建文件的默认权限
pub const DEFAULT_PERM_FILE: u32 = 0o666;

/// 解析硬链接时最多跟随的次数
pub const LINK_DEPTH_MAX: usize = 100;

const MIB: usize = 1024 * 1024;

/// 按容量计算挂载几何参数
pub const fn geometry_for(size_mb: usize) -> Geometry {
    let mut geometry = Geometry::new(BLOCK_SIZE, size_mb * MIB / BLOCK_SIZE);
    geometry.read_size = READ_SIZE;
    geometry.prog_size = PROG_SIZE;
    geometry.cache_size = CACHE_SIZE;
    geometry.lookahead_size = LOOKAHEAD_SIZE;
    geometry.block_cycles = BLOCK_CYCLES;
    geometry
}
