//! 块存储接口
//!
//! 该模块定义了元数据层依赖的底层存储能力：按路径寻址的文件和目录、
//! 每个路径下按编号区分的属性槽，以及遍历全部在用块的回调。
//! 存储本身没有所有者、时间戳或用量统计的概念。

use alloc::string::String;

use crate::{Geometry, StoreError};

/// 目录项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// 普通文件
    File,
    /// 目录
    Dir,
}

/// stat 和目录迭代返回的条目信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// 条目名称，根目录为 "/"
    pub name: String,
    /// 条目类型
    pub kind: EntryType,
    /// 文件长度（字节），目录恒为 0
    pub size: usize,
}

impl EntryInfo {
    /// 是否为普通文件
    pub fn is_file(&self) -> bool {
        self.kind == EntryType::File
    }

    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        self.kind == EntryType::Dir
    }
}

/// 按路径寻址的块存储
///
/// 所有方法都假定调用者已经串行化了访问；实现不需要内部加锁。
pub trait BlockStore: Send {
    /// 目录迭代句柄，离开作用域时关闭
    type Dir<'a>: Iterator<Item = EntryInfo>
    where
        Self: 'a;

    /// 几何参数
    fn geometry(&self) -> &Geometry;

    /// 底层设备实例的地址，作为不透明标识使用
    fn device_address(&self) -> usize;

    /// 查询路径信息
    fn stat(&self, path: &str) -> Result<EntryInfo, StoreError>;

    /// 读取属性槽，返回属性的实际长度
    ///
    /// 复制 `min(buf.len(), 实际长度)` 字节；未写过的属性返回 [`StoreError::NoAttr`]。
    fn get_attr(&self, path: &str, kind: u8, buf: &mut [u8]) -> Result<usize, StoreError>;

    /// 写入属性槽（整体替换）
    fn set_attr(&mut self, path: &str, kind: u8, data: &[u8]) -> Result<(), StoreError>;

    /// 删除属性槽
    fn remove_attr(&mut self, path: &str, kind: u8) -> Result<(), StoreError>;

    /// 打开目录进行迭代
    fn open_dir(&self, path: &str) -> Result<Self::Dir<'_>, StoreError>;

    /// 对每个在用块调用一次 `visit`，访问器返回错误时立即停止
    fn traverse(
        &self,
        visit: &mut dyn FnMut(usize) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;

    /// 创建目录
    fn mkdir(&mut self, path: &str) -> Result<(), StoreError>;

    /// 创建空文件
    fn create(&mut self, path: &str) -> Result<(), StoreError>;

    /// 从 `offset` 开始写入，返回写入的字节数
    fn write(&mut self, path: &str, offset: usize, data: &[u8]) -> Result<usize, StoreError>;

    /// 从 `offset` 开始读取，返回读取的字节数
    fn read(&self, path: &str, offset: usize, buf: &mut [u8]) -> Result<usize, StoreError>;

    /// 截断或扩展文件（扩展部分填零）
    fn truncate(&mut self, path: &str, len: usize) -> Result<(), StoreError>;

    /// 删除文件或空目录
    fn remove(&mut self, path: &str) -> Result<(), StoreError>;

    /// 重命名，连同属性一起移动
    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError>;
}
