//! 块存储错误类型
//!
//! 定义了与 littlefs 错误码一致的存储错误，可通过 [`StoreError::to_errno()`] 转换为负数错误码。

use core::fmt;

/// 块存储错误类型
///
/// 各错误码对应 littlefs / POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    // 介质相关
    /// 设备 I/O 错误 (-EIO)
    Io,
    /// 磁盘结构损坏 (-EILSEQ)
    Corrupt,

    // 路径相关
    /// 路径不存在 (-ENOENT)
    NoEntry,
    /// 路径已存在 (-EEXIST)
    Exists,
    /// 不是目录 (-ENOTDIR)
    NotDir,
    /// 是目录 (-EISDIR)
    IsDir,
    /// 目录非空 (-ENOTEMPTY)
    NotEmpty,
    /// 文件名过长 (-ENAMETOOLONG)
    NameTooLong,

    // 句柄与参数
    /// 无效句柄 (-EBADF)
    BadHandle,
    /// 无效参数或未挂载 (-EINVAL)
    Invalid,

    // 容量相关
    /// 文件过大 (-EFBIG)
    FileTooBig,
    /// 设备空间不足 (-ENOSPC)
    NoSpace,
    /// 内存不足 (-ENOMEM)
    NoMemory,

    // 属性
    /// 属性不存在 (-ENODATA)
    NoAttr,
}

impl StoreError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> i32 {
        match self {
            StoreError::NoEntry => -2,
            StoreError::Io => -5,
            StoreError::BadHandle => -9,
            StoreError::NoMemory => -12,
            StoreError::Exists => -17,
            StoreError::NotDir => -20,
            StoreError::IsDir => -21,
            StoreError::Invalid => -22,
            StoreError::FileTooBig => -27,
            StoreError::NoSpace => -28,
            StoreError::NameTooLong => -36,
            StoreError::NotEmpty => -39,
            StoreError::NoAttr => -61,
            StoreError::Corrupt => -84,
        }
    }

    /// 属性或路径缺失，上层按零值处理
    pub fn is_absent(&self) -> bool {
        matches!(self, StoreError::NoAttr | StoreError::NoEntry)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StoreError::Io => "device I/O error",
            StoreError::Corrupt => "corrupted filesystem",
            StoreError::NoEntry => "no such file or directory",
            StoreError::Exists => "entry already exists",
            StoreError::NotDir => "not a directory",
            StoreError::IsDir => "is a directory",
            StoreError::NotEmpty => "directory not empty",
            StoreError::NameTooLong => "file name too long",
            StoreError::BadHandle => "bad handle",
            StoreError::Invalid => "invalid argument",
            StoreError::FileTooBig => "file too large",
            StoreError::NoSpace => "no space left on device",
            StoreError::NoMemory => "out of memory",
            StoreError::NoAttr => "no such attribute",
        };
        write!(f, "{} ({})", msg, self.to_errno())
    }
}

impl core::error::Error for StoreError {}
