//! 元数据记录

use crate::codec::{
    AttrKind, Slot, decode_flag, decode_time, decode_u32, encode_flag, encode_time, encode_u32,
};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// 文件类型和权限（与 POSIX 兼容）
    pub struct FileMode: u32 {
        // 文件类型掩码
        /// 文件类型掩码
        const S_IFMT   = 0o170000;
        /// 普通文件
        const S_IFREG  = 0o100000;
        /// 目录
        const S_IFDIR  = 0o040000;
        /// 符号链接
        const S_IFLNK  = 0o120000;

        // 用户权限
        /// 用户读
        const S_IRUSR  = 0o400;
        /// 用户写
        const S_IWUSR  = 0o200;
        /// 用户执行
        const S_IXUSR  = 0o100;

        // 组权限
        /// 组读
        const S_IRGRP  = 0o040;
        /// 组写
        const S_IWGRP  = 0o020;
        /// 组执行
        const S_IXGRP  = 0o010;

        // 其他用户权限
        /// 其他读
        const S_IROTH  = 0o004;
        /// 其他写
        const S_IWOTH  = 0o002;
        /// 其他执行
        const S_IXOTH  = 0o001;

        // 特殊位
        /// Set UID
        const S_ISUID  = 0o4000;
        /// Set GID
        const S_ISGID  = 0o2000;
        /// Sticky bit
        const S_ISVTX  = 0o1000;
    }
}

impl FileMode {
    /// 权限位掩码（含特殊位）
    pub const PERM_MASK: u32 = 0o7777;

    /// 由类型位和权限位组合，权限中超出 0o7777 的部分被丢弃
    pub fn with_perm(file_type: FileMode, perm: u32) -> Self {
        FileMode::from_bits_retain((file_type & FileMode::S_IFMT).bits() | (perm & Self::PERM_MASK))
    }

    /// 类型位
    pub fn file_type(&self) -> FileMode {
        *self & FileMode::S_IFMT
    }

    /// 权限位
    pub fn perm(&self) -> u32 {
        self.bits() & Self::PERM_MASK
    }

    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        self.file_type() == FileMode::S_IFDIR
    }

    /// 是否为普通文件
    pub fn is_file(&self) -> bool {
        self.file_type() == FileMode::S_IFREG
    }

    /// 是否为符号链接
    pub fn is_symlink(&self) -> bool {
        self.file_type() == FileMode::S_IFLNK
    }
}

/// 持久化在属性槽中的字段
///
/// 每个字段对应一个 [`AttrKind`]。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attributes {
    /// inode 号
    pub ino: u32,
    /// 类型与权限位，见 [`FileMode`]
    pub mode: u32,
    /// 属主 ID
    pub uid: u32,
    /// 属组 ID
    pub gid: u32,
    /// 创建时间（纪元秒）
    pub birthtime: f64,
    /// 访问时间
    pub atime: f64,
    /// 修改时间
    pub mtime: f64,
    /// 状态改变时间
    pub ctime: f64,
    /// 硬链接数
    pub nlink: u32,
    /// 是否为硬链接
    pub link: bool,
    /// 是否为符号链接
    pub symlink: bool,
}

impl Attributes {
    /// 以 [`FileMode`] 形式返回 mode
    pub fn file_mode(&self) -> FileMode {
        FileMode::from_bits_retain(self.mode)
    }

    /// 编码指定字段
    pub fn encode(&self, kind: AttrKind) -> Slot {
        match kind {
            AttrKind::Ino => encode_u32(self.ino),
            AttrKind::Mode => encode_u32(self.mode),
            AttrKind::Uid => encode_u32(self.uid),
            AttrKind::Gid => encode_u32(self.gid),
            AttrKind::Birthtime => encode_time(self.birthtime),
            AttrKind::Atime => encode_time(self.atime),
            AttrKind::Mtime => encode_time(self.mtime),
            AttrKind::Ctime => encode_time(self.ctime),
            AttrKind::Nlink => encode_u32(self.nlink),
            AttrKind::Link => encode_flag(self.link),
            AttrKind::Symlink => encode_flag(self.symlink),
        }
    }

    /// 用槽内容更新指定字段
    pub fn decode(&mut self, kind: AttrKind, slot: &Slot) {
        match kind {
            AttrKind::Ino => self.ino = decode_u32(slot),
            AttrKind::Mode => self.mode = decode_u32(slot),
            AttrKind::Uid => self.uid = decode_u32(slot),
            AttrKind::Gid => self.gid = decode_u32(slot),
            AttrKind::Birthtime => self.birthtime = decode_time(slot),
            AttrKind::Atime => self.atime = decode_time(slot),
            AttrKind::Mtime => self.mtime = decode_time(slot),
            AttrKind::Ctime => self.ctime = decode_time(slot),
            AttrKind::Nlink => self.nlink = decode_u32(slot),
            AttrKind::Link => self.link = decode_flag(slot),
            AttrKind::Symlink => self.symlink = decode_flag(slot),
        }
    }

    /// 将 [`TouchKind`] 指定的时间戳设置为 `now`
    pub fn touch(&mut self, kind: TouchKind, now: f64) {
        match kind {
            TouchKind::Birth => {
                self.birthtime = now;
                self.atime = now;
                self.mtime = now;
                self.ctime = now;
            }
            TouchKind::Access => self.atime = now,
            TouchKind::Modify => self.mtime = now,
            TouchKind::Change => self.ctime = now,
        }
    }
}

/// 一个路径的完整元数据
///
/// `size` 每次都从块存储重新计算，不经过属性槽。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metadata {
    /// 属性槽中的字段
    pub attrs: Attributes,
    /// 文件长度，目录为递归总和
    pub size: usize,
}

/// 需要更新的时间戳
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    /// 创建：四个时间戳全部更新
    Birth,
    /// 访问时间
    Access,
    /// 修改时间
    Modify,
    /// 状态改变时间
    Change,
}

/// POSIX stat 视图
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stat {
    /// 设备标识（底层设备地址）
    pub dev: usize,
    /// inode 号
    pub ino: u32,
    /// 类型与权限位
    pub mode: u32,
    /// 硬链接数
    pub nlink: u32,
    /// 属主 ID
    pub uid: u32,
    /// 属组 ID
    pub gid: u32,
    /// 设备号，恒为 0
    pub rdev: u64,
    /// 大小（字节）
    pub size: usize,
    /// 块大小
    pub blksize: usize,
    /// 占用块数
    pub blocks: usize,
    /// 创建时间
    pub birthtime: f64,
    /// 访问时间
    pub atime: f64,
    /// 修改时间
    pub mtime: f64,
    /// 状态改变时间
    pub ctime: f64,
}

impl Stat {
    /// 由元数据构造
    pub fn new(meta: &Metadata, dev: usize, blksize: usize) -> Self {
        let a = &meta.attrs;
        Self {
            dev,
            ino: a.ino,
            mode: a.mode,
            nlink: a.nlink,
            uid: a.uid,
            gid: a.gid,
            rdev: 0,
            size: meta.size,
            blksize,
            blocks: meta.size.div_ceil(blksize),
            birthtime: a.birthtime,
            atime: a.atime,
            mtime: a.mtime,
            ctime: a.ctime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_mode_helpers() {
        let mode = FileMode::with_perm(FileMode::S_IFDIR, 0o170755);
        assert!(mode.is_dir());
        assert_eq!(mode.perm(), 0o755);
        assert_eq!(mode.bits(), 0o040755);
        assert!(FileMode::with_perm(FileMode::S_IFLNK, 0o777).is_symlink());
    }

    #[test]
    fn test_encode_decode_every_kind() {
        let src = Attributes {
            ino: 9,
            mode: 0o100644,
            uid: 1000,
            gid: 100,
            birthtime: 1.5,
            atime: 2.5,
            mtime: 3.5,
            ctime: 4.5,
            nlink: 2,
            link: true,
            symlink: false,
        };
        let mut dst = Attributes::default();
        for kind in AttrKind::ALL {
            dst.decode(kind, &src.encode(kind));
        }
        assert_eq!(dst, src);
    }

    #[test]
    fn test_touch_birth_sets_all_times() {
        let mut a = Attributes::default();
        a.touch(TouchKind::Birth, 10.0);
        assert_eq!((a.birthtime, a.atime, a.mtime, a.ctime), (10.0, 10.0, 10.0, 10.0));
        a.touch(TouchKind::Modify, 11.0);
        assert_eq!((a.atime, a.mtime), (10.0, 11.0));
    }

    #[test]
    fn test_stat_blocks_round_up() {
        let meta = Metadata {
            attrs: Attributes::default(),
            size: 4097,
        };
        let stat = Stat::new(&meta, 1, 4096);
        assert_eq!(stat.blocks, 2);
        assert_eq!(stat.rdev, 0);
    }
}
