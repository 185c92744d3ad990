//! 统计属性写入次数的块存储包装
//!
//! 还可以在指定次数之后让属性写入失败，用于检查错误传播。

use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};
use store::{BlockStore, EntryInfo, Geometry, StoreError};

/// 包装任意 [`BlockStore`]，统计 `set_attr` 调用
pub struct CountingStore<S> {
    inner: S,
    set_attr_calls: Arc<AtomicUsize>,
    fail_after: Arc<AtomicUsize>,
}

impl<S> CountingStore<S> {
    /// 包装 `inner`，计数从 0 开始且不注入失败
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            set_attr_calls: Arc::new(AtomicUsize::new(0)),
            fail_after: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    /// 共享的计数器，存储被移入文件系统后仍可读取
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.set_attr_calls.clone()
    }

    /// 到目前为止的 `set_attr` 调用次数
    pub fn set_attr_calls(&self) -> usize {
        self.set_attr_calls.load(Ordering::SeqCst)
    }

    /// 从第 `n` 次调用之后，`set_attr` 返回 [`StoreError::Io`]
    pub fn fail_set_attr_after(&self, n: usize) {
        self.fail_after.store(n, Ordering::SeqCst);
    }

    /// 被包装的存储
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// 取回被包装的存储
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: BlockStore> BlockStore for CountingStore<S> {
    type Dir<'a>
        = S::Dir<'a>
    where
        Self: 'a;

    fn geometry(&self) -> &Geometry {
        self.inner.geometry()
    }

    fn device_address(&self) -> usize {
        self.inner.device_address()
    }

    fn stat(&self, path: &str) -> Result<EntryInfo, StoreError> {
        self.inner.stat(path)
    }

    fn get_attr(&self, path: &str, kind: u8, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.inner.get_attr(path, kind, buf)
    }

    fn set_attr(&mut self, path: &str, kind: u8, data: &[u8]) -> Result<(), StoreError> {
        let calls = self.set_attr_calls.fetch_add(1, Ordering::SeqCst);
        if calls >= self.fail_after.load(Ordering::SeqCst) {
            return Err(StoreError::Io);
        }
        self.inner.set_attr(path, kind, data)
    }

    fn remove_attr(&mut self, path: &str, kind: u8) -> Result<(), StoreError> {
        self.inner.remove_attr(path, kind)
    }

    fn open_dir(&self, path: &str) -> Result<Self::Dir<'_>, StoreError> {
        self.inner.open_dir(path)
    }

    fn traverse(
        &self,
        visit: &mut dyn FnMut(usize) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        self.inner.traverse(visit)
    }

    fn mkdir(&mut self, path: &str) -> Result<(), StoreError> {
        self.inner.mkdir(path)
    }

    fn create(&mut self, path: &str) -> Result<(), StoreError> {
        self.inner.create(path)
    }

    fn write(&mut self, path: &str, offset: usize, data: &[u8]) -> Result<usize, StoreError> {
        self.inner.write(path, offset, data)
    }

    fn read(&self, path: &str, offset: usize, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.inner.read(path, offset, buf)
    }

    fn truncate(&mut self, path: &str, len: usize) -> Result<(), StoreError> {
        self.inner.truncate(path, len)
    }

    fn remove(&mut self, path: &str) -> Result<(), StoreError> {
        self.inner.remove(path)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError> {
        self.inner.rename(from, to)
    }
}
