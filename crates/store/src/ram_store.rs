//! 写时复制的块存储实现
//!
//! 目录树索引保存在内存中，文件数据和超级块写在 [`BlockDriver`] 上：
//!
//! - 块 0/1 是根目录的元数据块对，同时承载超级块记录
//! - 每个子目录占用一个元数据块对（2 块）
//! - 非空文件占用 `ceil(len / block_size)` 个数据块；每次内容修改都先分配
//!   并编程新块，成功后才释放旧块

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::mem;
use core::sync::atomic::{AtomicUsize, Ordering};

use device::{BlockDriver, ERASE_VALUE};
use log::{debug, trace};

use crate::block_alloc::BlockAllocator;
use crate::path::{basename, normalize_path, path_names, split_path};
use crate::{BlockStore, EntryInfo, EntryType, Geometry, StoreError};

/// 超级块魔数
pub const SUPERBLOCK_MAGIC: &[u8; 8] = b"littlefs";
const SUPERBLOCK_VERSION: u32 = 0x0002_0000;
/// magic + version + block_size + block_count + name_max + file_max + attr_max
const SUPERBLOCK_LEN: usize = 8 + 4 * 6;
const ROOT_PAIR: [usize; 2] = [0, 1];

type NodeId = u64;
const ROOT: NodeId = 0;

enum NodeKind {
    File {
        len: usize,
        blocks: Vec<usize>,
    },
    Dir {
        pair: [usize; 2],
        children: BTreeMap<String, NodeId>,
    },
}

struct Node {
    kind: NodeKind,
    attrs: BTreeMap<u8, Vec<u8>>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: BTreeMap::new(),
        }
    }

    fn info(&self, name: &str) -> EntryInfo {
        match &self.kind {
            NodeKind::File { len, .. } => EntryInfo {
                name: name.to_string(),
                kind: EntryType::File,
                size: *len,
            },
            NodeKind::Dir { .. } => EntryInfo {
                name: name.to_string(),
                kind: EntryType::Dir,
                size: 0,
            },
        }
    }
}

/// 建立在闪存设备上的块存储
pub struct RamStore {
    disk: Arc<dyn BlockDriver>,
    geometry: Geometry,
    nodes: BTreeMap<NodeId, Node>,
    next_id: NodeId,
    blocks: BlockAllocator,
    mounted: bool,
    open_dirs: AtomicUsize,
}

/// 目录迭代句柄
///
/// 打开时对目录项做快照，离开作用域时自动关闭。
pub struct RamDir<'a> {
    entries: vec::IntoIter<EntryInfo>,
    open: &'a AtomicUsize,
}

impl Iterator for RamDir<'_> {
    type Item = EntryInfo;

    fn next(&mut self) -> Option<EntryInfo> {
        self.entries.next()
    }
}

impl Drop for RamDir<'_> {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::Release);
        trace!("ramstore: dir handle closed");
    }
}

impl RamStore {
    /// 在设备上创建未格式化、未挂载的存储
    pub fn new(disk: Arc<dyn BlockDriver>, geometry: Geometry) -> Self {
        Self {
            disk,
            geometry,
            nodes: BTreeMap::new(),
            next_id: ROOT + 1,
            blocks: BlockAllocator::new(geometry.block_count),
            mounted: false,
            open_dirs: AtomicUsize::new(0),
        }
    }

    /// 格式化：擦除根元数据块对，写入超级块并建立空的根目录
    pub fn format(&mut self) -> Result<(), StoreError> {
        self.geometry.validate()?;
        let g = self.geometry;
        if self.disk.block_size() != g.block_size || self.disk.total_blocks() < g.block_count {
            return Err(StoreError::Invalid);
        }
        self.mounted = false;

        let mut blocks = BlockAllocator::new(g.block_count);
        for block in ROOT_PAIR {
            blocks.reserve(block);
            self.erase(block)?;
        }
        let record = self.superblock_record();
        for block in ROOT_PAIR {
            self.write_block(block, &record)?;
        }

        self.nodes.clear();
        self.nodes.insert(
            ROOT,
            Node::new(NodeKind::Dir {
                pair: ROOT_PAIR,
                children: BTreeMap::new(),
            }),
        );
        self.next_id = ROOT + 1;
        self.blocks = blocks;
        debug!(
            "ramstore: formatted {} blocks of {} bytes",
            g.block_count, g.block_size
        );
        Ok(())
    }

    /// 挂载：校验超级块与几何参数
    pub fn mount(&mut self) -> Result<(), StoreError> {
        self.geometry.validate()?;
        let g = self.geometry;
        let mut buf = vec![0u8; SUPERBLOCK_LEN.div_ceil(g.read_size) * g.read_size];
        self.read_raw(ROOT_PAIR[0], 0, &mut buf)?;

        if &buf[..8] != SUPERBLOCK_MAGIC {
            return Err(StoreError::Corrupt);
        }
        let word = |i: usize| {
            let at = 8 + i * 4;
            u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]) as usize
        };
        if word(0) != SUPERBLOCK_VERSION as usize
            || word(1) != g.block_size
            || word(2) != g.block_count
        {
            return Err(StoreError::Corrupt);
        }
        // 索引只存在于内存中，换了实例就无法恢复目录树
        if !self.nodes.contains_key(&ROOT) {
            return Err(StoreError::Corrupt);
        }
        self.mounted = true;
        debug!("ramstore: mounted, {} blocks free", self.blocks.free_count());
        Ok(())
    }

    /// 卸载
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// 是否已挂载
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// 底层设备
    pub fn disk(&self) -> &Arc<dyn BlockDriver> {
        &self.disk
    }

    /// 当前未关闭的目录句柄数
    pub fn open_dirs(&self) -> usize {
        self.open_dirs.load(Ordering::Acquire)
    }

    /// 分配器视角的空闲块数
    pub fn free_blocks(&self) -> usize {
        self.blocks.free_count()
    }

    fn superblock_record(&self) -> Vec<u8> {
        let g = &self.geometry;
        let mut record = Vec::with_capacity(SUPERBLOCK_LEN);
        record.extend_from_slice(SUPERBLOCK_MAGIC);
        for word in [
            SUPERBLOCK_VERSION as usize,
            g.block_size,
            g.block_count,
            g.name_max,
            g.file_max,
            g.attr_max,
        ] {
            record.extend_from_slice(&(word as u32).to_le_bytes());
        }
        record
    }

    fn check_mounted(&self) -> Result<(), StoreError> {
        if self.mounted {
            Ok(())
        } else {
            Err(StoreError::Invalid)
        }
    }

    fn check_name(&self, name: &str) -> Result<(), StoreError> {
        if name.len() > self.geometry.name_max {
            return Err(StoreError::NameTooLong);
        }
        Ok(())
    }

    fn check_block(&self, block: usize) -> Result<(), StoreError> {
        if block >= self.geometry.block_count || !self.blocks.is_used(block) {
            return Err(StoreError::Corrupt);
        }
        Ok(())
    }

    // ========== 设备访问 ==========

    fn read_raw(&self, block: usize, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        if self.disk.read(block, offset, buf) {
            Ok(())
        } else {
            Err(StoreError::Io)
        }
    }

    fn erase(&self, block: usize) -> Result<(), StoreError> {
        if self.disk.erase(block) {
            Ok(())
        } else {
            Err(StoreError::Io)
        }
    }

    /// 擦除后按编程单元写入一块内容，最后一段不足时用擦除值补齐
    fn write_block(&self, block: usize, data: &[u8]) -> Result<(), StoreError> {
        let prog_size = self.geometry.prog_size;
        self.erase(block)?;
        for (i, piece) in data.chunks(prog_size).enumerate() {
            let ok = if piece.len() == prog_size {
                self.disk.prog(block, i * prog_size, piece)
            } else {
                let mut padded = vec![ERASE_VALUE; prog_size];
                padded[..piece.len()].copy_from_slice(piece);
                self.disk.prog(block, i * prog_size, &padded)
            };
            if !ok {
                return Err(StoreError::Io);
            }
        }
        Ok(())
    }

    // ========== 索引 ==========

    fn node(&self, id: NodeId) -> Result<&Node, StoreError> {
        self.nodes.get(&id).ok_or(StoreError::Corrupt)
    }

    fn children(&self, id: NodeId) -> Result<&BTreeMap<String, NodeId>, StoreError> {
        match &self.node(id)?.kind {
            NodeKind::Dir { children, .. } => Ok(children),
            NodeKind::File { .. } => Err(StoreError::NotDir),
        }
    }

    fn children_mut(&mut self, id: NodeId) -> Result<&mut BTreeMap<String, NodeId>, StoreError> {
        match &mut self.nodes.get_mut(&id).ok_or(StoreError::Corrupt)?.kind {
            NodeKind::Dir { children, .. } => Ok(children),
            NodeKind::File { .. } => Err(StoreError::NotDir),
        }
    }

    fn lookup(&self, path: &str) -> Result<NodeId, StoreError> {
        let mut id = ROOT;
        for name in path_names(path) {
            id = *self.children(id)?.get(name).ok_or(StoreError::NoEntry)?;
        }
        Ok(id)
    }

    /// 找到父目录并确认名称可用，返回 (父目录, 名称)
    fn vacant(&self, path: &str) -> Result<(NodeId, String), StoreError> {
        if path_names(path).is_empty() {
            return Err(StoreError::Exists);
        }
        let (parent, name) = split_path(path)?;
        let parent = self.lookup(&parent)?;
        if self.children(parent)?.contains_key(&name) {
            return Err(StoreError::Exists);
        }
        self.check_name(&name)?;
        Ok((parent, name))
    }

    fn insert(&mut self, parent: NodeId, name: String, kind: NodeKind) -> Result<(), StoreError> {
        let id = self.next_id;
        self.next_id += 1;
        self.children_mut(parent)?.insert(name, id);
        self.nodes.insert(id, Node::new(kind));
        Ok(())
    }

    /// 删除节点并释放其占用的块
    fn drop_node(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            match node.kind {
                NodeKind::File { blocks, .. } => self.release(&blocks),
                NodeKind::Dir { pair, .. } => self.release(&pair),
            }
        }
    }

    fn release(&mut self, blocks: &[usize]) {
        for &block in blocks {
            self.blocks.free(block);
        }
    }

    // ========== 文件内容 ==========

    fn file_content(&self, id: NodeId) -> Result<Vec<u8>, StoreError> {
        let (len, blocks) = match &self.node(id)?.kind {
            NodeKind::File { len, blocks } => (*len, blocks),
            NodeKind::Dir { .. } => return Err(StoreError::IsDir),
        };
        let g = &self.geometry;
        let mut out = Vec::with_capacity(len);
        let mut chunk = vec![0u8; g.read_size];
        for (i, &block) in blocks.iter().enumerate() {
            let block_len = (len - i * g.block_size).min(g.block_size);
            let mut off = 0;
            while off < block_len {
                self.read_raw(block, off, &mut chunk)?;
                let take = g.read_size.min(block_len - off);
                out.extend_from_slice(&chunk[..take]);
                off += g.read_size;
            }
        }
        Ok(out)
    }

    /// 为内容分配并编程新块；失败时归还已分配的块
    fn store_content(&mut self, data: &[u8]) -> Result<Vec<usize>, StoreError> {
        let mut fresh = Vec::with_capacity(data.len().div_ceil(self.geometry.block_size));
        for piece in data.chunks(self.geometry.block_size) {
            let block = match self.blocks.alloc() {
                Ok(block) => block,
                Err(err) => {
                    self.release(&fresh);
                    return Err(err);
                }
            };
            fresh.push(block);
            if let Err(err) = self.write_block(block, piece) {
                self.release(&fresh);
                return Err(err);
            }
        }
        Ok(fresh)
    }

    fn rewrite_file(&mut self, id: NodeId, content: &[u8]) -> Result<(), StoreError> {
        if content.len() > self.geometry.file_max {
            return Err(StoreError::FileTooBig);
        }
        if !matches!(self.node(id)?.kind, NodeKind::File { .. }) {
            return Err(StoreError::IsDir);
        }
        let fresh = self.store_content(content)?;
        let old = match self.nodes.get_mut(&id) {
            Some(Node {
                kind: NodeKind::File { len, blocks },
                ..
            }) => {
                *len = content.len();
                mem::replace(blocks, fresh)
            }
            _ => return Err(StoreError::Corrupt),
        };
        self.release(&old);
        trace!(
            "ramstore: file rewritten, {} bytes, {} blocks free",
            content.len(),
            self.blocks.free_count()
        );
        Ok(())
    }
}

impl BlockStore for RamStore {
    type Dir<'a> = RamDir<'a>;

    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn device_address(&self) -> usize {
        Arc::as_ptr(&self.disk) as *const () as usize
    }

    fn stat(&self, path: &str) -> Result<EntryInfo, StoreError> {
        self.check_mounted()?;
        let id = self.lookup(path)?;
        Ok(self.node(id)?.info(basename(path)))
    }

    fn get_attr(&self, path: &str, kind: u8, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.check_mounted()?;
        let id = self.lookup(path)?;
        let value = self.node(id)?.attrs.get(&kind).ok_or(StoreError::NoAttr)?;
        let n = value.len().min(buf.len());
        buf[..n].copy_from_slice(&value[..n]);
        Ok(value.len())
    }

    fn set_attr(&mut self, path: &str, kind: u8, data: &[u8]) -> Result<(), StoreError> {
        self.check_mounted()?;
        if data.len() > self.geometry.attr_max {
            return Err(StoreError::NoSpace);
        }
        let id = self.lookup(path)?;
        let node = self.nodes.get_mut(&id).ok_or(StoreError::Corrupt)?;
        node.attrs.insert(kind, data.to_vec());
        Ok(())
    }

    fn remove_attr(&mut self, path: &str, kind: u8) -> Result<(), StoreError> {
        self.check_mounted()?;
        let id = self.lookup(path)?;
        let node = self.nodes.get_mut(&id).ok_or(StoreError::Corrupt)?;
        node.attrs.remove(&kind);
        Ok(())
    }

    fn open_dir(&self, path: &str) -> Result<RamDir<'_>, StoreError> {
        self.check_mounted()?;
        let id = self.lookup(path)?;
        let entries = self
            .children(id)?
            .iter()
            .map(|(name, child)| Ok(self.node(*child)?.info(name)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        self.open_dirs.fetch_add(1, Ordering::AcqRel);
        Ok(RamDir {
            entries: entries.into_iter(),
            open: &self.open_dirs,
        })
    }

    fn traverse(
        &self,
        visit: &mut dyn FnMut(usize) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        self.check_mounted()?;
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            match &self.node(id)?.kind {
                NodeKind::Dir { pair, children } => {
                    for &block in pair {
                        self.check_block(block)?;
                        visit(block)?;
                    }
                    stack.extend(children.values().copied());
                }
                NodeKind::File { blocks, .. } => {
                    for &block in blocks {
                        self.check_block(block)?;
                        visit(block)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> Result<(), StoreError> {
        self.check_mounted()?;
        let (parent, name) = self.vacant(path)?;
        let first = self.blocks.alloc()?;
        let second = match self.blocks.alloc() {
            Ok(block) => block,
            Err(err) => {
                self.release(&[first]);
                return Err(err);
            }
        };
        let pair = [first, second];
        if let Err(err) = self.erase(first).and_then(|_| self.erase(second)) {
            self.release(&pair);
            return Err(err);
        }
        self.insert(
            parent,
            name,
            NodeKind::Dir {
                pair,
                children: BTreeMap::new(),
            },
        )
    }

    fn create(&mut self, path: &str) -> Result<(), StoreError> {
        self.check_mounted()?;
        let (parent, name) = self.vacant(path)?;
        self.insert(
            parent,
            name,
            NodeKind::File {
                len: 0,
                blocks: Vec::new(),
            },
        )
    }

    fn write(&mut self, path: &str, offset: usize, data: &[u8]) -> Result<usize, StoreError> {
        self.check_mounted()?;
        let id = self.lookup(path)?;
        let mut content = self.file_content(id)?;
        if data.is_empty() {
            return Ok(0);
        }
        let end = offset.checked_add(data.len()).ok_or(StoreError::FileTooBig)?;
        if end > self.geometry.file_max {
            return Err(StoreError::FileTooBig);
        }
        if content.len() < end {
            content.resize(end, 0);
        }
        content[offset..end].copy_from_slice(data);
        self.rewrite_file(id, &content)?;
        Ok(data.len())
    }

    fn read(&self, path: &str, offset: usize, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.check_mounted()?;
        let id = self.lookup(path)?;
        let content = self.file_content(id)?;
        if offset >= content.len() {
            return Ok(0);
        }
        let n = buf.len().min(content.len() - offset);
        buf[..n].copy_from_slice(&content[offset..offset + n]);
        Ok(n)
    }

    fn truncate(&mut self, path: &str, len: usize) -> Result<(), StoreError> {
        self.check_mounted()?;
        let id = self.lookup(path)?;
        let mut content = self.file_content(id)?;
        if len > self.geometry.file_max {
            return Err(StoreError::FileTooBig);
        }
        content.resize(len, 0);
        self.rewrite_file(id, &content)
    }

    fn remove(&mut self, path: &str) -> Result<(), StoreError> {
        self.check_mounted()?;
        let (parent, name) = split_path(path)?;
        let parent = self.lookup(&parent)?;
        let id = *self.children(parent)?.get(&name).ok_or(StoreError::NoEntry)?;
        if let NodeKind::Dir { children, .. } = &self.node(id)?.kind {
            if !children.is_empty() {
                return Err(StoreError::NotEmpty);
            }
        }
        self.children_mut(parent)?.remove(&name);
        self.drop_node(id);
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError> {
        self.check_mounted()?;
        let (from_parent, from_name) = split_path(from)?;
        let (to_parent, to_name) = split_path(to)?;
        let src_parent = self.lookup(&from_parent)?;
        let src = *self
            .children(src_parent)?
            .get(&from_name)
            .ok_or(StoreError::NoEntry)?;

        let (from_norm, to_norm) = (normalize_path(from), normalize_path(to));
        if from_norm == to_norm {
            return Ok(());
        }
        // 不能把目录移动到自己的子树中
        if to_norm.starts_with(&from_norm) && to_norm.as_bytes().get(from_norm.len()) == Some(&b'/')
        {
            return Err(StoreError::Invalid);
        }
        self.check_name(&to_name)?;
        let dst_parent = self.lookup(&to_parent)?;

        let existing = self.children(dst_parent)?.get(&to_name).copied();
        if let Some(existing) = existing {
            let src_is_dir = matches!(self.node(src)?.kind, NodeKind::Dir { .. });
            match &self.node(existing)?.kind {
                NodeKind::Dir { .. } if !src_is_dir => return Err(StoreError::IsDir),
                NodeKind::File { .. } if src_is_dir => return Err(StoreError::NotDir),
                NodeKind::Dir { children, .. } if !children.is_empty() => {
                    return Err(StoreError::NotEmpty);
                }
                _ => {}
            }
            self.children_mut(dst_parent)?.remove(&to_name);
            self.drop_node(existing);
        }

        self.children_mut(src_parent)?.remove(&from_name);
        self.children_mut(dst_parent)?.insert(to_name, src);
        Ok(())
    }
}
