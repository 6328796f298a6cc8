use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 文件快照：扫描时刻的不可变记录，刷新只能靠重新扫描
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    /// Unix 时间戳（秒），最近修改时间
    #[serde(default)]
    pub modified: Option<u64>,
}

impl FileRecord {
    /// 文件名（路径末段）；路径异常时返回空串
    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|n| n.to_str()).unwrap_or("")
    }
}

/// 目录树节点，父节点独占子节点
///
/// size 为所有后代文件大小之和，后序聚合；整棵树按扫描重建，从不增量修补。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    /// 后代文件中最近的修改时间（Unix 秒）
    #[serde(default)]
    pub newest_modified: Option<u64>,
    #[serde(default)]
    pub dirs: Vec<DirectoryNode>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

impl DirectoryNode {
    pub fn new(path: PathBuf, name: String) -> Self {
        Self {
            path,
            name,
            size: 0,
            newest_modified: None,
            dirs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// 深度优先遍历所有后代文件（惰性、单趟）
    pub fn iter_files(&self) -> FileIter<'_> {
        FileIter {
            stack: vec![self],
            files: &[],
        }
    }

    /// 后代文件总数（含自身直属文件）
    pub fn file_count(&self) -> u64 {
        self.files.len() as u64 + self.dirs.iter().map(|d| d.file_count()).sum::<u64>()
    }
}

/// [`DirectoryNode::iter_files`] 的迭代器
pub struct FileIter<'a> {
    stack: Vec<&'a DirectoryNode>,
    files: &'a [FileRecord],
}

impl<'a> Iterator for FileIter<'a> {
    type Item = &'a FileRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((first, rest)) = self.files.split_first() {
                self.files = rest;
                return Some(first);
            }
            let dir = self.stack.pop()?;
            self.files = &dir.files;
            self.stack.extend(dir.dirs.iter());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, size: u64) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size,
            modified: None,
        }
    }

    #[test]
    fn test_iter_files_visits_all_descendants() {
        let mut root = DirectoryNode::new(PathBuf::from("/data"), "data".to_string());
        root.files.push(file("/data/a.txt", 1));
        let mut sub = DirectoryNode::new(PathBuf::from("/data/sub"), "sub".to_string());
        sub.files.push(file("/data/sub/b.txt", 2));
        sub.files.push(file("/data/sub/c.txt", 3));
        let mut deep = DirectoryNode::new(PathBuf::from("/data/sub/deep"), "deep".to_string());
        deep.files.push(file("/data/sub/deep/d.txt", 4));
        sub.dirs.push(deep);
        root.dirs.push(sub);

        let sizes: u64 = root.iter_files().map(|f| f.size).sum();
        assert_eq!(sizes, 10);
        assert_eq!(root.iter_files().count(), 4);
        assert_eq!(root.file_count(), 4);
    }

    #[test]
    fn test_iter_files_empty_tree() {
        let root = DirectoryNode::new(PathBuf::from("/empty"), "empty".to_string());
        assert_eq!(root.iter_files().count(), 0);
        assert_eq!(root.file_count(), 0);
    }
}
