//! 元数据叠加层
//!
//! 在块存储的属性槽之上读写 [`Attributes`]：
//!
//! - [`query`] 读出全部槽并重新计算大小
//! - [`patch`] 只写入与当前值不同的槽，减少闪存编程次数
//! - [`reset`] 新建路径时清零全部槽，避免继承被删除条目留下的旧属性
//!
//! 这里的函数都不加锁，调用者负责串行化。

use store::{BlockStore, StoreError};

use crate::codec::{AttrKind, ZERO_SLOT, read_slot, write_slot};
use crate::record::{Attributes, Metadata};
use crate::usage::size_of_path;

/// 只读取属性槽，不计算大小
pub fn read_attributes<S: BlockStore>(store: &S, path: &str) -> Attributes {
    let mut attrs = Attributes::default();
    for kind in AttrKind::ALL {
        attrs.decode(kind, &read_slot(store, path, kind));
    }
    attrs
}

/// 查询路径的完整元数据
///
/// 不会失败：路径不存在时得到全零记录，大小为 0。
pub fn query<S: BlockStore>(store: &S, path: &str) -> Metadata {
    Metadata {
        attrs: read_attributes(store, path),
        size: size_of_path(store, path, None),
    }
}

/// 将 `desired` 写入路径，只写与当前值不同的槽
///
/// 时间戳按位比较。返回实际写入的槽数；第一个失败的写入直接返回，不重试。
pub fn patch<S: BlockStore>(
    store: &mut S,
    path: &str,
    desired: &Attributes,
) -> Result<usize, StoreError> {
    let current = read_attributes(store, path);
    let mut written = 0;
    for kind in AttrKind::ALL {
        let slot = desired.encode(kind);
        if slot != current.encode(kind) {
            write_slot(store, path, kind, &slot)?;
            written += 1;
        }
    }
    Ok(written)
}

/// 无条件清零全部属性槽
pub fn reset<S: BlockStore>(store: &mut S, path: &str) -> Result<(), StoreError> {
    for kind in AttrKind::ALL {
        write_slot(store, path, kind, &ZERO_SLOT)?;
    }
    Ok(())
}
