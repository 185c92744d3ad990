//! POSIX 元数据叠加层
//!
//! 块存储只提供文件内容、目录结构和按编号区分的小属性槽。此 crate 在其之上
//! 补充 inode 号、权限、属主、四个时间戳、链接数和链接标志，并提供整个文件系统的
//! 用量统计：
//!
//! - [`codec`] - 字段与属性槽之间的编解码
//! - [`overlay`] - query / patch / reset 协议
//! - [`usage`] - 递归的大小与文件数、目录数统计
//! - [`statvfs`] - 基于块遍历的 statvfs
//! - [`DiskGuard`] - 串行化全部存储访问
//! - [`Filesystem`] - 挂载后的实例及节点生命周期操作

#![no_std]

extern crate alloc;

pub mod codec;
pub mod config;
mod fs;
mod guard;
mod ino;
pub mod overlay;
mod record;
pub mod statvfs;
pub mod usage;

pub use codec::AttrKind;
pub use device::Clock;
pub use fs::Filesystem;
pub use guard::{DiskAccess, DiskGuard};
pub use ino::{InoPool, ROOT_INO};
pub use record::{Attributes, FileMode, Metadata, Stat, TouchKind};
pub use statvfs::{RAMFS_MAGIC, StatVfs};
pub use usage::Usage;
