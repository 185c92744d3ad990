//! 目录用量统计
//!
//! 递归地求出路径的总字节数，并可选地累计文件数和目录数。
//! 每个普通文件计 1 个文件，每个目录（包括起点目录）计 1 个目录。

use store::{BlockStore, join_path};

/// 文件数与目录数计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    /// 普通文件数
    pub files: usize,
    /// 目录数
    pub dirs: usize,
}

/// 统计目录下所有内容的总字节数
///
/// 目录无法打开时返回 0。起点目录本身不在这里计数，由 [`size_of_path`] 负责。
pub fn size_of_directory<S: BlockStore>(
    store: &S,
    path: &str,
    mut usage: Option<&mut Usage>,
) -> usize {
    let Ok(dir) = store.open_dir(path) else {
        return 0;
    };

    let mut total = 0;
    for entry in dir {
        if entry.name == "." || entry.name == ".." {
            continue;
        }
        if entry.is_file() {
            total += entry.size;
            if let Some(usage) = usage.as_deref_mut() {
                usage.files += 1;
            }
        } else {
            if let Some(usage) = usage.as_deref_mut() {
                usage.dirs += 1;
            }
            total += size_of_directory(store, &join_path(path, &entry.name), usage.as_deref_mut());
        }
    }
    total
}

/// 统计路径的大小：文件返回其长度，目录返回递归总和，不存在返回 0
pub fn size_of_path<S: BlockStore>(store: &S, path: &str, mut usage: Option<&mut Usage>) -> usize {
    let Ok(info) = store.stat(path) else {
        return 0;
    };

    if info.is_file() {
        if let Some(usage) = usage.as_deref_mut() {
            usage.files += 1;
        }
        info.size
    } else {
        if let Some(usage) = usage.as_deref_mut() {
            usage.dirs += 1;
        }
        size_of_directory(store, path, usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device::RamDisk;
    use store::{Geometry, RamStore};

    fn store() -> RamStore {
        let disk = RamDisk::new(512 * 32, 512, 0);
        let mut store = RamStore::new(disk, Geometry::new(512, 32));
        store.format().unwrap();
        store.mount().unwrap();
        store
    }

    #[test]
    fn test_missing_path_counts_nothing() {
        let store = store();
        let mut usage = Usage::default();
        assert_eq!(size_of_path(&store, "/nope", Some(&mut usage)), 0);
        assert_eq!(usage, Usage::default());
    }

    #[test]
    fn test_nested_tree() {
        let mut s = store();
        s.mkdir("/d").unwrap();
        s.create("/d/f").unwrap();
        s.write("/d/f", 0, &[1u8; 100]).unwrap();
        s.mkdir("/d/e").unwrap();
        s.create("/d/e/g").unwrap();
        s.write("/d/e/g", 0, &[2u8; 30]).unwrap();

        let mut usage = Usage::default();
        assert_eq!(size_of_path(&s, "/d", Some(&mut usage)), 130);
        assert_eq!(usage, Usage { files: 2, dirs: 2 });

        let mut usage = Usage::default();
        assert_eq!(size_of_path(&s, "/", Some(&mut usage)), 130);
        assert_eq!(usage, Usage { files: 2, dirs: 3 });
        assert_eq!(s.open_dirs(), 0);
    }

    #[test]
    fn test_file_path() {
        let mut s = store();
        s.create("/f").unwrap();
        s.write("/f", 0, b"abc").unwrap();
        let mut usage = Usage::default();
        assert_eq!(size_of_path(&s, "/f", Some(&mut usage)), 3);
        assert_eq!(usage, Usage { files: 1, dirs: 0 });
        assert_eq!(size_of_directory(&s, "/f", None), 0);
    }
}
