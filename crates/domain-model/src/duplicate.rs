use serde::{Deserialize, Serialize};

use crate::FileRecord;

/// 重复文件组：成员大小相同、全文指纹一致且已逐字节确认
///
/// 成员按保留优先级排序，首位为 keeper：最早修改时间优先，
/// 平局时路径更短者优先，再平局按路径字典序。组内至少两个成员。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// 单个成员的大小（字节）
    pub size: u64,
    /// blake3 全文指纹（十六进制）
    pub fingerprint: String,
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// 保留成员（组内首位）
    pub fn keeper(&self) -> &FileRecord {
        &self.members[0]
    }

    /// keeper 之外的冗余成员
    pub fn redundant(&self) -> &[FileRecord] {
        &self.members[1..]
    }

    /// 删除全部冗余成员可回收的空间
    pub fn wasted_bytes(&self) -> u64 {
        self.size * (self.members.len() as u64).saturating_sub(1)
    }

    /// 按保留优先级排序成员：修改时间最早、路径最短、字典序
    ///
    /// 排序是确定性的，同一组输入任意顺序都得到同一个 keeper。
    pub fn sort_members(members: &mut [FileRecord]) {
        members.sort_by(|a, b| {
            let ka = (a.modified.unwrap_or(u64::MAX), a.path.as_os_str().len());
            let kb = (b.modified.unwrap_or(u64::MAX), b.path.as_os_str().len());
            ka.cmp(&kb).then_with(|| a.path.cmp(&b.path))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(path: &str, modified: Option<u64>) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size: 100,
            modified,
        }
    }

    #[test]
    fn test_keeper_is_oldest_member() {
        let mut members = vec![
            record("/d/b.txt", Some(2000)),
            record("/d/a.txt", Some(1000)),
        ];
        DuplicateGroup::sort_members(&mut members);
        assert_eq!(members[0].path, PathBuf::from("/d/a.txt"));
    }

    #[test]
    fn test_tie_breaks_on_path_length_then_lexicographic() {
        let mut members = vec![
            record("/d/longer-name.txt", Some(1000)),
            record("/d/z.txt", Some(1000)),
            record("/d/a.txt", Some(1000)),
        ];
        DuplicateGroup::sort_members(&mut members);
        assert_eq!(members[0].path, PathBuf::from("/d/a.txt"));
        assert_eq!(members[1].path, PathBuf::from("/d/z.txt"));
        assert_eq!(members[2].path, PathBuf::from("/d/longer-name.txt"));
    }

    #[test]
    fn test_unknown_mtime_sorts_last() {
        let mut members = vec![
            record("/d/unknown.txt", None),
            record("/d/known.txt", Some(5000)),
        ];
        DuplicateGroup::sort_members(&mut members);
        assert_eq!(members[0].path, PathBuf::from("/d/known.txt"));
    }

    #[test]
    fn test_wasted_bytes_excludes_keeper() {
        let group = DuplicateGroup {
            size: 100,
            fingerprint: "ff".to_string(),
            members: vec![
                record("/d/a.txt", Some(1)),
                record("/d/b.txt", Some(2)),
                record("/d/c.txt", Some(3)),
            ],
        };
        assert_eq!(group.wasted_bytes(), 200);
        assert_eq!(group.redundant().len(), 2);
        assert_eq!(group.keeper().path, PathBuf::from("/d/a.txt"));
    }
}
