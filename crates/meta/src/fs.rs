//! 文件系统实例
//!
//! [`Filesystem`] 持有块存储、几何参数、锁和时间源。每个公开操作只加锁一次，
//! 整个操作（包括 patch 内部的查询）都在同一个临界区内完成；
//! 内部辅助函数直接接收 `&S` / `&mut S`，不再加锁。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use device::{Clock, RamDisk};
use log::{debug, error, warn};
use store::path::path_names;
use store::{BlockStore, EntryInfo, Geometry, RamStore, StoreError, join_path, normalize_path};
use sync::DiskLock;

use crate::codec::{AttrKind, decode_flag, decode_u32, read_slot};
use crate::config::{self, DEFAULT_PERM_FILE};
use crate::guard::{DiskAccess, DiskGuard};
use crate::ino::{InoPool, ROOT_INO};
use crate::overlay::{self, read_attributes};
use crate::record::{Attributes, FileMode, Metadata, Stat, TouchKind};
use crate::statvfs::{self, StatVfs};

/// 带 POSIX 元数据的文件系统实例
pub struct Filesystem<S: BlockStore, L: DiskLock> {
    disk: DiskGuard<S, L>,
    geometry: Geometry,
    device_address: usize,
    clock: Arc<dyn Clock>,
    inos: InoPool,
}

impl<L: DiskLock> Filesystem<RamStore, L> {
    /// 在 `size_mb` MiB 的内存闪存上格式化并挂载
    ///
    /// 之后初始化根目录属性。任何一步失败都是致命的。
    pub fn mount(size_mb: usize, lock: L, clock: Arc<dyn Clock>) -> Self {
        let geometry = config::geometry_for(size_mb);
        let disk = RamDisk::new(geometry.capacity(), geometry.block_size, 0);
        let mut store = RamStore::new(disk, geometry);
        if let Err(err) = store.format().and_then(|_| store.mount()) {
            error!("meta: mount of {} MiB failed: {}", size_mb, err);
            panic!("failed to mount {} MiB ram store: {}", size_mb, err);
        }

        let fs = Self::with_store(store, lock, clock);
        if let Err(err) = fs.init_root() {
            error!("meta: root init failed: {}", err);
            panic!("failed to initialise root attributes: {}", err);
        }
        debug!(
            "meta: mounted {} blocks of {} bytes",
            geometry.block_count, geometry.block_size
        );
        fs
    }
}

impl<S: BlockStore, L: DiskLock> Filesystem<S, L> {
    /// 接管一个已挂载的块存储，不修改根目录属性
    ///
    /// 已有路径的 inode 号会被登记，之后不会重复分配。
    pub fn with_store(store: S, lock: L, clock: Arc<dyn Clock>) -> Self {
        let geometry = *store.geometry();
        let device_address = store.device_address();
        let inos = InoPool::new();
        reserve_inos(&store, "/", &inos);
        Self {
            disk: DiskGuard::new(store, lock),
            geometry,
            device_address,
            clock,
            inos,
        }
    }

    fn init_root(&self) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        overlay::reset(&mut *disk, "/")?;
        let mut attrs = Attributes {
            ino: ROOT_INO,
            mode: FileMode::with_perm(FileMode::S_IFDIR, config::DEFAULT_PERM_DIR).bits(),
            nlink: 1,
            ..Attributes::default()
        };
        attrs.touch(TouchKind::Birth, self.clock.now());
        overlay::patch(&mut *disk, "/", &attrs)?;
        Ok(())
    }

    /// 加锁后直接访问块存储（例如写文件内容）
    pub fn lock(&self) -> DiskAccess<'_, S, L> {
        self.disk.lock()
    }

    /// 挂载时传入的锁
    pub fn disk_lock(&self) -> &L {
        self.disk.raw_lock()
    }

    /// 取回块存储
    pub fn into_store(self) -> S {
        self.disk.into_inner()
    }

    /// 块大小
    pub fn block_size(&self) -> usize {
        self.geometry.block_size
    }

    /// 总块数
    pub fn block_count(&self) -> usize {
        self.geometry.block_count
    }

    /// 底层设备地址
    pub fn device_address(&self) -> usize {
        self.device_address
    }

    /// 当前分配出去的 inode 号数量（含根目录）
    pub fn inodes_in_use(&self) -> usize {
        self.inos.in_use()
    }

    // ========== 元数据协议 ==========

    /// 查询路径元数据，路径不存在时返回全零记录
    pub fn query_attributes(&self, path: &str) -> Metadata {
        let disk = self.disk.lock();
        overlay::query(&*disk, path)
    }

    /// 写入与当前值不同的属性，返回写入的槽数
    pub fn patch_attributes(&self, path: &str, attrs: &Attributes) -> Result<usize, StoreError> {
        let mut disk = self.disk.lock();
        overlay::patch(&mut *disk, path, attrs)
    }

    /// 清零全部属性槽
    pub fn reset_attributes(&self, path: &str) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        overlay::reset(&mut *disk, path)
    }

    /// 统计整个文件系统
    ///
    /// 块遍历失败说明存储已损坏，直接 panic。
    pub fn statvfs(&self) -> StatVfs {
        let disk = self.disk.lock();
        match statvfs::build(&*disk) {
            Ok(stat) => stat,
            Err(err) => {
                error!("meta: block traversal failed: {}", err);
                panic!("statvfs traversal failed: {}", err);
            }
        }
    }

    // ========== 查询 ==========

    /// 路径是否存在，硬链接按目标判断
    pub fn exists(&self, path: &str) -> bool {
        let disk = self.disk.lock();
        resolve_link(&*disk, path).and_then(|p| disk.stat(&p)).is_ok()
    }

    /// 是否为普通文件
    pub fn is_file(&self, path: &str) -> bool {
        let disk = self.disk.lock();
        resolve_link(&*disk, path)
            .and_then(|p| disk.stat(&p))
            .is_ok_and(|info| info.is_file())
    }

    /// 是否为目录
    pub fn is_directory(&self, path: &str) -> bool {
        let disk = self.disk.lock();
        resolve_link(&*disk, path)
            .and_then(|p| disk.stat(&p))
            .is_ok_and(|info| info.is_dir())
    }

    /// 是否为硬链接
    pub fn is_link(&self, path: &str) -> bool {
        let disk = self.disk.lock();
        decode_flag(&read_slot(&*disk, path, AttrKind::Link))
    }

    /// 是否为符号链接
    pub fn is_symlink(&self, path: &str) -> bool {
        let disk = self.disk.lock();
        decode_flag(&read_slot(&*disk, path, AttrKind::Symlink))
    }

    /// POSIX stat，路径不存在时返回 `None`
    ///
    /// 硬链接报告目标的信息。
    pub fn stat(&self, path: &str) -> Option<Stat> {
        let disk = self.disk.lock();
        let path = resolve_link(&*disk, path).ok()?;
        disk.stat(&path).ok()?;
        let meta = overlay::query(&*disk, &path);
        Some(Stat::new(&meta, self.device_address, self.geometry.block_size))
    }

    /// 列出目录项
    pub fn read_dir(&self, path: &str) -> Result<Vec<EntryInfo>, StoreError> {
        let disk = self.disk.lock();
        let entries = disk.open_dir(path)?.collect();
        Ok(entries)
    }

    // ========== 节点生命周期 ==========

    /// 创建空文件
    pub fn create_file(&self, path: &str, perm: u32) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        self.create_node(&mut disk, path, FileMode::S_IFREG, perm)
            .map(|_| ())
    }

    /// 创建目录
    pub fn mkdir(&self, path: &str, perm: u32) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        self.create_node(&mut disk, path, FileMode::S_IFDIR, perm)
            .map(|_| ())
    }

    /// 逐级创建目录，已存在的目录跳过
    ///
    /// 中间某一级是文件时返回 [`StoreError::NotDir`]，最后一级是文件时返回
    /// [`StoreError::Exists`]。
    pub fn mkdir_all(&self, path: &str, perm: u32) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let names = path_names(path);
        let mut current = String::new();
        for (i, name) in names.iter().enumerate() {
            current.push('/');
            current.push_str(name);
            match disk.stat(&current) {
                Ok(info) if info.is_dir() => {}
                Ok(_) if i + 1 == names.len() => return Err(StoreError::Exists),
                Ok(_) => return Err(StoreError::NotDir),
                Err(StoreError::NoEntry) => {
                    self.create_node(&mut disk, &current, FileMode::S_IFDIR, perm)?;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// 删除文件或空目录，归还其 inode 号
    ///
    /// 删除硬链接只删除链接本身并减少目标的链接数；删除目标时，
    /// 指向它的硬链接一并删除。
    pub fn remove(&self, path: &str) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        self.remove_node(&mut disk, path)
    }

    /// 递归删除整个子树
    pub fn remove_all(&self, path: &str) -> Result<(), StoreError> {
        let path = normalize_path(path);
        if path == "/" {
            return Err(StoreError::Invalid);
        }
        let mut disk = self.disk.lock();
        self.remove_tree(&mut disk, &path)
    }

    /// 重命名，属性随路径一起移动
    ///
    /// 被覆盖的目标路径的 inode 号归还给池。
    pub fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let replaced = if normalize_path(from) != normalize_path(to) && disk.stat(to).is_ok() {
            Some(decode_u32(&read_slot(&*disk, to, AttrKind::Ino)))
        } else {
            None
        };
        disk.rename(from, to)?;
        if let Some(ino) = replaced {
            self.inos.release(ino);
            debug!("meta: rename replaced {} (ino {})", to, ino);
        }
        self.touch_times(&mut disk, to, &[TouchKind::Change], self.clock.now())
    }

    /// 复制文件内容，`exclusive` 时目标已存在则失败
    pub fn copy_file(&self, src: &str, dst: &str, exclusive: bool) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let src = resolve_link(&*disk, src)?;
        let dst = resolve_link(&*disk, dst)?;
        if exclusive && disk.stat(&dst).is_ok() {
            return Err(StoreError::Exists);
        }
        let data = read_content(&*disk, &src)?;
        let now = self.clock.now();
        self.touch_times(&mut disk, &src, &[TouchKind::Access], now)?;
        self.replace_content(&mut disk, &dst, &data, now)
    }

    // ========== 文件内容 ==========

    /// 替换文件内容，文件不存在时以默认权限创建
    pub fn write_file(&self, path: &str, data: &[u8]) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let path = resolve_link(&*disk, path)?;
        let now = self.clock.now();
        self.replace_content(&mut disk, &path, data, now)
    }

    /// 在文件末尾追加，文件不存在时以默认权限创建
    pub fn append_file(&self, path: &str, data: &[u8]) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let path = resolve_link(&*disk, path)?;
        self.ensure_file(&mut disk, &path)?;
        let end = disk.stat(&path)?.size;
        disk.write(&path, end, data)?;
        let now = self.clock.now();
        self.touch_times(&mut disk, &path, &[TouchKind::Modify, TouchKind::Change], now)
    }

    /// 读取整个文件
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let mut disk = self.disk.lock();
        let path = resolve_link(&*disk, path)?;
        let buf = read_content(&*disk, &path)?;
        self.touch_times(&mut disk, &path, &[TouchKind::Access], self.clock.now())?;
        Ok(buf)
    }

    /// 截断或扩展文件
    pub fn truncate(&self, path: &str, len: usize) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let path = resolve_link(&*disk, path)?;
        disk.truncate(&path, len)?;
        self.touch_times(&mut disk, &path, &[TouchKind::Modify], self.clock.now())
    }

    // ========== 属性修改 ==========

    /// 修改权限位，类型位保持不变
    pub fn chmod(&self, path: &str, perm: u32) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let path = resolve_link(&*disk, path)?;
        disk.stat(&path)?;
        let mut attrs = read_attributes(&*disk, &path);
        attrs.mode = FileMode::with_perm(attrs.file_mode().file_type(), perm).bits();
        attrs.touch(TouchKind::Change, self.clock.now());
        overlay::patch(&mut *disk, &path, &attrs).map(|_| ())
    }

    /// 修改属主和属组
    pub fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let path = resolve_link(&*disk, path)?;
        disk.stat(&path)?;
        let mut attrs = read_attributes(&*disk, &path);
        attrs.uid = uid;
        attrs.gid = gid;
        attrs.touch(TouchKind::Change, self.clock.now());
        overlay::patch(&mut *disk, &path, &attrs).map(|_| ())
    }

    /// 设置访问时间和修改时间
    pub fn utimes(&self, path: &str, atime: f64, mtime: f64) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let path = resolve_link(&*disk, path)?;
        disk.stat(&path)?;
        let mut attrs = read_attributes(&*disk, &path);
        attrs.atime = atime;
        attrs.mtime = mtime;
        overlay::patch(&mut *disk, &path, &attrs).map(|_| ())
    }

    /// 更新时间戳，`time` 为 `None` 时取当前时间
    pub fn touch(&self, path: &str, kind: TouchKind, time: Option<f64>) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let now = time.unwrap_or_else(|| self.clock.now());
        self.touch_times(&mut disk, path, &[kind], now)
    }

    // ========== 链接 ==========

    /// 创建硬链接
    ///
    /// 新路径是一个内容为目标路径的文件，标记为链接并复制目标的属性；
    /// 目标的链接数加一。读写、stat 等操作经由链接作用在目标上。
    pub fn link(&self, old: &str, new: &str) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        let target = resolve_link(&*disk, old)?;
        disk.stat(&target)?;
        let ino = self.create_node(&mut disk, new, FileMode::S_IFREG, DEFAULT_PERM_FILE)?;
        if let Err(err) = self.init_link(&mut disk, &target, new, ino) {
            self.discard_node(&mut disk, new, ino);
            return Err(err);
        }
        Ok(())
    }

    /// 创建指向 `target` 的符号链接
    pub fn symlink(&self, target: &str, path: &str) -> Result<(), StoreError> {
        let mut disk = self.disk.lock();
        disk.stat(target)?;
        let ino = self.create_node(&mut disk, path, FileMode::S_IFLNK, 0o777)?;
        if let Err(err) = init_symlink(&mut *disk, target, path) {
            self.discard_node(&mut disk, path, ino);
            return Err(err);
        }
        Ok(())
    }

    /// 读取符号链接的目标
    pub fn readlink(&self, path: &str) -> Result<String, StoreError> {
        let disk = self.disk.lock();
        disk.stat(path)?;
        if !decode_flag(&read_slot(&*disk, path, AttrKind::Symlink)) {
            return Err(StoreError::Invalid);
        }
        let buf = read_content(&*disk, path)?;
        String::from_utf8(buf).map_err(|_| StoreError::Corrupt)
    }

    // ========== 内部辅助（调用者已持锁） ==========

    /// 创建节点并初始化全部属性，返回分配的 inode 号
    ///
    /// 属性初始化失败时撤销创建，路径和 inode 号都不会残留。
    fn create_node(
        &self,
        store: &mut S,
        path: &str,
        file_type: FileMode,
        perm: u32,
    ) -> Result<u32, StoreError> {
        if file_type == FileMode::S_IFDIR {
            store.mkdir(path)?;
        } else {
            store.create(path)?;
        }

        let ino = self.inos.alloc();
        let mut attrs = Attributes {
            ino,
            mode: FileMode::with_perm(file_type, perm).bits(),
            nlink: 1,
            ..Attributes::default()
        };
        attrs.touch(TouchKind::Birth, self.clock.now());
        let init = overlay::reset(store, path).and_then(|_| overlay::patch(store, path, &attrs));
        if let Err(err) = init {
            self.discard_node(store, path, ino);
            return Err(err);
        }
        debug!("meta: created {} (ino {}, mode {:o})", path, ino, attrs.mode);
        Ok(ino)
    }

    /// 撤销创建到一半的节点
    fn discard_node(&self, store: &mut S, path: &str, ino: u32) {
        if let Err(err) = store.remove(path) {
            warn!("meta: failed to roll back {}: {}", path, err);
        }
        self.inos.release(ino);
    }

    fn init_link(
        &self,
        store: &mut S,
        target: &str,
        path: &str,
        ino: u32,
    ) -> Result<(), StoreError> {
        store.write(path, 0, target.as_bytes())?;
        let mut target_attrs = read_attributes(store, target);
        let attrs = Attributes {
            ino,
            nlink: 1,
            link: true,
            ..target_attrs
        };
        overlay::patch(store, path, &attrs)?;
        target_attrs.nlink += 1;
        overlay::patch(store, target, &target_attrs).map(|_| ())
    }

    fn remove_node(&self, store: &mut S, path: &str) -> Result<(), StoreError> {
        let path = normalize_path(path);
        store.stat(&path)?;
        let attrs = read_attributes(store, &path);
        let target = if attrs.link {
            Some(link_target(store, &path)?)
        } else {
            None
        };
        store.remove(&path)?;
        self.inos.release(attrs.ino);
        debug!("meta: removed {} (ino {})", path, attrs.ino);

        match target {
            Some(target) if store.stat(&target).is_ok() => {
                let mut target_attrs = read_attributes(store, &target);
                target_attrs.nlink = target_attrs.nlink.saturating_sub(1);
                overlay::patch(store, &target, &target_attrs)?;
            }
            Some(_) => {}
            None => {
                let mut links = Vec::new();
                collect_links(store, "/", &path, &mut links);
                for link in links {
                    let ino = decode_u32(&read_slot(store, &link, AttrKind::Ino));
                    store.remove(&link)?;
                    self.inos.release(ino);
                    debug!("meta: removed link {} to {}", link, path);
                }
            }
        }
        Ok(())
    }

    fn remove_tree(&self, store: &mut S, path: &str) -> Result<(), StoreError> {
        if store.stat(path)?.is_dir() {
            let children: Vec<String> = store
                .open_dir(path)?
                .filter(|entry| entry.name != "." && entry.name != "..")
                .map(|entry| join_path(path, &entry.name))
                .collect();
            for child in children {
                // 链接可能已随目标一起删除
                match self.remove_tree(store, &child) {
                    Ok(()) | Err(StoreError::NoEntry) => {}
                    Err(err) => return Err(err),
                }
            }
        }
        self.remove_node(store, path)
    }

    fn ensure_file(&self, store: &mut S, path: &str) -> Result<(), StoreError> {
        match store.stat(path) {
            Ok(info) if info.is_dir() => Err(StoreError::IsDir),
            Ok(_) => Ok(()),
            Err(StoreError::NoEntry) => self
                .create_node(store, path, FileMode::S_IFREG, DEFAULT_PERM_FILE)
                .map(|_| ()),
            Err(err) => Err(err),
        }
    }

    fn replace_content(
        &self,
        store: &mut S,
        path: &str,
        data: &[u8],
        now: f64,
    ) -> Result<(), StoreError> {
        self.ensure_file(store, path)?;
        store.truncate(path, 0)?;
        store.write(path, 0, data)?;
        self.touch_times(store, path, &[TouchKind::Modify, TouchKind::Change], now)
    }

    fn touch_times(
        &self,
        store: &mut S,
        path: &str,
        kinds: &[TouchKind],
        now: f64,
    ) -> Result<(), StoreError> {
        store.stat(path)?;
        let mut attrs = read_attributes(store, path);
        for &kind in kinds {
            attrs.touch(kind, now);
        }
        overlay::patch(store, path, &attrs).map(|_| ())
    }
}

fn init_symlink<S: BlockStore>(store: &mut S, target: &str, path: &str) -> Result<(), StoreError> {
    store.write(path, 0, target.as_bytes())?;
    let mut attrs = read_attributes(store, path);
    attrs.symlink = true;
    overlay::patch(store, path, &attrs).map(|_| ())
}

/// 读出整个文件的内容
fn read_content<S: BlockStore>(store: &S, path: &str) -> Result<Vec<u8>, StoreError> {
    let info = store.stat(path)?;
    if info.is_dir() {
        return Err(StoreError::IsDir);
    }
    let mut buf = vec![0u8; info.size];
    let n = store.read(path, 0, &mut buf)?;
    buf.truncate(n);
    Ok(buf)
}

/// 硬链接中记录的目标路径
fn link_target<S: BlockStore>(store: &S, path: &str) -> Result<String, StoreError> {
    let content = read_content(store, path)?;
    let target = String::from_utf8(content).map_err(|_| StoreError::Corrupt)?;
    Ok(normalize_path(&target))
}

/// 沿硬链接找到最终路径
///
/// 不是链接的路径（包括不存在的路径）规范化后原样返回。
fn resolve_link<S: BlockStore>(store: &S, path: &str) -> Result<String, StoreError> {
    let mut path = normalize_path(path);
    for _ in 0..config::LINK_DEPTH_MAX {
        if !decode_flag(&read_slot(store, &path, AttrKind::Link)) {
            return Ok(path);
        }
        path = link_target(store, &path)?;
    }
    warn!("meta: link chain through {} is too deep", path);
    Err(StoreError::Invalid)
}

/// 收集 `dir` 下所有指向 `target` 的硬链接
fn collect_links<S: BlockStore>(store: &S, dir: &str, target: &str, out: &mut Vec<String>) {
    let Ok(entries) = store.open_dir(dir) else {
        return;
    };
    for entry in entries {
        if entry.name == "." || entry.name == ".." {
            continue;
        }
        let path = join_path(dir, &entry.name);
        if entry.is_dir() {
            collect_links(store, &path, target, out);
        } else if decode_flag(&read_slot(store, &path, AttrKind::Link))
            && link_target(store, &path).is_ok_and(|t| t == target)
        {
            out.push(path);
        }
    }
}

/// 登记树中已有的 inode 号
fn reserve_inos<S: BlockStore>(store: &S, path: &str, inos: &InoPool) {
    inos.reserve(decode_u32(&read_slot(store, path, AttrKind::Ino)));
    let Ok(dir) = store.open_dir(path) else {
        return;
    };
    for entry in dir {
        reserve_inos(store, &join_path(path, &entry.name), inos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::{MockClock, RecordingLock};

    fn fs() -> (Filesystem<RamStore, RecordingLock>, Arc<MockClock>) {
        let clock = Arc::new(MockClock::new(100.0));
        (Filesystem::mount(1, RecordingLock::new(), clock.clone()), clock)
    }

    #[test]
    fn test_mount_initialises_root() {
        let (fs, _) = fs();
        let root = fs.query_attributes("/");
        assert_eq!(root.attrs.ino, ROOT_INO);
        assert!(root.attrs.file_mode().is_dir());
        assert_eq!(root.attrs.file_mode().perm(), 0o777);
        assert_eq!(root.attrs.birthtime, 100.0);
        assert_eq!(root.attrs.ctime, 100.0);
        assert_eq!(fs.block_size(), 4096);
        assert_eq!(fs.block_count(), 256);
    }

    #[test]
    fn test_create_assigns_inodes() {
        let (fs, _) = fs();
        fs.create_file("/a", 0o644).unwrap();
        fs.mkdir("/d", 0o755).unwrap();
        assert_eq!(fs.query_attributes("/a").attrs.ino, 1);
        assert_eq!(fs.query_attributes("/d").attrs.ino, 2);
        assert_eq!(fs.create_file("/a", 0o644), Err(StoreError::Exists));

        fs.remove("/a").unwrap();
        fs.create_file("/b", 0o644).unwrap();
        assert_eq!(fs.query_attributes("/b").attrs.ino, 1);
    }

    #[test]
    fn test_recreated_path_starts_clean() {
        let (fs, _) = fs();
        fs.create_file("/a", 0o600).unwrap();
        fs.chown("/a", 5, 6).unwrap();
        fs.remove("/a").unwrap();
        fs.create_file("/a", 0o600).unwrap();
        let attrs = fs.query_attributes("/a").attrs;
        assert_eq!((attrs.uid, attrs.gid), (0, 0));
    }

    #[test]
    fn test_with_store_reserves_existing_inodes() {
        let (fs, _) = fs();
        fs.create_file("/a", 0o644).unwrap();
        fs.create_file("/b", 0o644).unwrap();
        let store = fs.into_store();

        let fs = Filesystem::with_store(store, RecordingLock::new(), Arc::new(MockClock::new(0.0)));
        assert_eq!(fs.inodes_in_use(), 3);
        fs.create_file("/c", 0o644).unwrap();
        assert_eq!(fs.query_attributes("/c").attrs.ino, 3);
    }
}
