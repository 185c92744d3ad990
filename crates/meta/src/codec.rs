//! 属性槽编解码
//!
//! 每个元数据字段占用块存储中一个固定编号的属性槽。槽宽度是固定的：
//! 32 位整数为 4 字节，时间戳和两个布尔标志为 8 字节。所有读写都使用完整宽度，
//! 数值以小端序存放，整数和布尔值从低位字节取出。
//!
//! 从未写过的槽（或不存在的路径）读出全零，而不是报错。

use log::{trace, warn};
use store::{BlockStore, StoreError};

/// 最大槽宽度
pub const MAX_WIDTH: usize = 8;

/// 一个槽的原始字节，未用到的高位部分保持为零
pub type Slot = [u8; MAX_WIDTH];

/// 全零槽
pub const ZERO_SLOT: Slot = [0; MAX_WIDTH];

/// 属性种类，编号即块存储中的属性槽编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AttrKind {
    /// inode 号
    Ino = 0,
    /// 类型与权限位
    Mode = 1,
    /// 属主 ID
    Uid = 2,
    /// 属组 ID
    Gid = 3,
    /// 创建时间
    Birthtime = 4,
    /// 访问时间
    Atime = 5,
    /// 修改时间
    Mtime = 6,
    /// 状态改变时间
    Ctime = 7,
    /// 硬链接数
    Nlink = 8,
    /// 是否为硬链接
    Link = 9,
    /// 是否为符号链接
    Symlink = 10,
}

impl AttrKind {
    /// 全部种类，按编号排列
    pub const ALL: [AttrKind; 11] = [
        AttrKind::Ino,
        AttrKind::Mode,
        AttrKind::Uid,
        AttrKind::Gid,
        AttrKind::Birthtime,
        AttrKind::Atime,
        AttrKind::Mtime,
        AttrKind::Ctime,
        AttrKind::Nlink,
        AttrKind::Link,
        AttrKind::Symlink,
    ];

    /// 属性槽编号
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// 由槽编号还原
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// 槽宽度（字节）
    pub const fn width(self) -> usize {
        match self {
            AttrKind::Birthtime
            | AttrKind::Atime
            | AttrKind::Mtime
            | AttrKind::Ctime
            | AttrKind::Link
            | AttrKind::Symlink => 8,
            AttrKind::Ino | AttrKind::Mode | AttrKind::Uid | AttrKind::Gid | AttrKind::Nlink => 4,
        }
    }
}

/// 编码 32 位整数
pub fn encode_u32(value: u32) -> Slot {
    let mut slot = ZERO_SLOT;
    slot[..4].copy_from_slice(&value.to_le_bytes());
    slot
}

/// 解码 32 位整数
pub fn decode_u32(slot: &Slot) -> u32 {
    u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]])
}

/// 编码时间戳
pub fn encode_time(value: f64) -> Slot {
    value.to_le_bytes()
}

/// 解码时间戳
pub fn decode_time(slot: &Slot) -> f64 {
    f64::from_le_bytes(*slot)
}

/// 编码布尔标志
pub fn encode_flag(value: bool) -> Slot {
    let mut slot = ZERO_SLOT;
    slot[0] = value as u8;
    slot
}

/// 解码布尔标志
pub fn decode_flag(slot: &Slot) -> bool {
    slot[0] != 0
}

/// 读取一个属性槽
///
/// 槽不存在或路径不存在时返回全零；其他错误同样降级为全零并记录警告。
pub fn read_slot<S: BlockStore + ?Sized>(store: &S, path: &str, kind: AttrKind) -> Slot {
    let mut slot = ZERO_SLOT;
    match store.get_attr(path, kind.id(), &mut slot[..kind.width()]) {
        Ok(_) => slot,
        Err(err) if err.is_absent() => ZERO_SLOT,
        Err(err) => {
            warn!("meta: read {:?} of {} failed: {}", kind, path, err);
            ZERO_SLOT
        }
    }
}

/// 写入一个属性槽（按完整宽度）
pub fn write_slot<S: BlockStore + ?Sized>(
    store: &mut S,
    path: &str,
    kind: AttrKind,
    slot: &Slot,
) -> Result<(), StoreError> {
    trace!("meta: write {:?} of {}", kind, path);
    store.set_attr(path, kind.id(), &slot[..kind.width()])
}
