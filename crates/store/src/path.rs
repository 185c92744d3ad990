//! 路径处理
//!
//! 块存储中的路径一律相对于根目录解析，开头的 `/` 可有可无：
//!
//! - `.` 表示当前目录，解析时跳过
//! - `..` 表示父目录，不能越过根目录
//! - 连续的 `/` 视为一个

use alloc::string::String;
use alloc::vec::Vec;

use crate::StoreError;

/// 路径组件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathComponent<'a> {
    /// 当前目录 "."
    Current,
    /// 父目录 ".."
    Parent,
    /// 正常的文件名
    Normal(&'a str),
}

/// 将路径字符串解析为组件列表
pub fn parse_path(path: &str) -> Vec<PathComponent<'_>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|part| match part {
            "." => PathComponent::Current,
            ".." => PathComponent::Parent,
            name => PathComponent::Normal(name),
        })
        .collect()
}

/// 解析出从根目录开始的名称序列（已处理 "." 和 ".."）
pub fn path_names(path: &str) -> Vec<&str> {
    let mut stack: Vec<&str> = Vec::new();
    for component in parse_path(path) {
        match component {
            PathComponent::Current => {}
            PathComponent::Parent => {
                // 不能越过根目录
                stack.pop();
            }
            PathComponent::Normal(name) => stack.push(name),
        }
    }
    stack
}

/// 规范化路径，结果总是以 `/` 开头
pub fn normalize_path(path: &str) -> String {
    let names = path_names(path);
    if names.is_empty() {
        return String::from("/");
    }
    let mut out = String::new();
    for name in names {
        out.push('/');
        out.push_str(name);
    }
    out
}

/// 将路径分割为父目录部分和文件名部分
///
/// 根目录没有父目录，返回 [`StoreError::Invalid`]。
pub fn split_path(path: &str) -> Result<(String, String), StoreError> {
    let mut names = path_names(path);
    let name = names.pop().ok_or(StoreError::Invalid)?;
    let parent = if names.is_empty() {
        String::from("/")
    } else {
        let mut parent = String::new();
        for n in names {
            parent.push('/');
            parent.push_str(n);
        }
        parent
    };
    Ok((parent, String::from(name)))
}

/// 拼接两段路径，只有在前一段不以 `/` 结尾时才插入分隔符
pub fn join_path(base: &str, name: &str) -> String {
    let mut joined = String::with_capacity(base.len() + name.len() + 1);
    joined.push_str(base);
    if !base.ends_with('/') {
        joined.push('/');
    }
    joined.push_str(name);
    joined
}

/// 返回路径的最后一个名称，根目录为 "/"
pub fn basename(path: &str) -> &str {
    path_names(path).pop().unwrap_or("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/foo/bar"), "/foo/bar");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("///foo///bar///"), "/foo/bar");
        assert_eq!(normalize_path("foo/./bar"), "/foo/bar");
        assert_eq!(normalize_path("/foo/../bar"), "/bar");
        assert_eq!(normalize_path("/../.."), "/");
    }

    #[test]
    fn test_split_path() {
        assert_eq!(
            split_path("/foo/bar.txt").unwrap(),
            (String::from("/foo"), String::from("bar.txt"))
        );
        assert_eq!(
            split_path("/hello").unwrap(),
            (String::from("/"), String::from("hello"))
        );
        assert_eq!(split_path("/"), Err(StoreError::Invalid));
        assert_eq!(split_path("/a/.."), Err(StoreError::Invalid));
    }

    #[test]
    fn test_join_path_separator_rule() {
        assert_eq!(join_path("/", "a"), "/a");
        assert_eq!(join_path("/d", "a"), "/d/a");
        assert_eq!(join_path("/d/", "a"), "/d/a");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/a/b"), "b");
        assert_eq!(basename("/"), "/");
    }
}
