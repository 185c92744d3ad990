//! 块存储
//!
//! 此 crate 提供元数据层之下的块存储，包括：
//!
//! - [`BlockStore`] trait - 按路径寻址、带属性槽和块遍历的存储接口
//! - [`RamStore`] - 建立在 [`device::BlockDriver`] 之上的写时复制实现
//! - [`Geometry`] - 读/编程/擦除单元等几何参数
//! - [`StoreError`] - 与 littlefs 一致的错误码
//! - 路径处理工具

#![no_std]

extern crate alloc;

mod block_alloc;
mod error;
mod geometry;
pub mod path;
mod ram_store;
mod store;

pub use block_alloc::BlockAllocator;
pub use error::StoreError;
pub use geometry::{DEFAULT_ATTR_MAX, DEFAULT_FILE_MAX, DEFAULT_NAME_MAX, Geometry};
pub use path::{join_path, normalize_path, split_path};
pub use ram_store::{RamDir, RamStore, SUPERBLOCK_MAGIC};
pub use store::{BlockStore, EntryInfo, EntryType};
