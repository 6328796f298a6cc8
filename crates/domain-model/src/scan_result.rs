use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::DirectoryNode;
use crate::{OldFileEntry, TopFileEntry};

/// 条目被跳过的原因
///
/// 扫描按条目恢复，单个条目失败从不中断整次扫描。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    PermissionDenied,
    /// 符号链接一律不跟随
    SymlinkSkipped,
    /// 符号链接目标不存在
    BrokenSymlink,
    /// (device, inode) 已访问过，疑似循环或绑定挂载
    CycleDetected,
    /// 扫描期间条目消失（竞态）
    NotFound,
    Io(String),
}

/// 被跳过的条目及原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// 扫描结果，包含树结构与各项指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub root: DirectoryNode,
    pub scan_time_ms: u64,
    pub file_count: u64,
    /// 本次扫描到的文件总大小（非卷容量）
    pub total_size: u64,
    /// 被跳过的条目（权限不足、符号链接、循环等）
    #[serde(default)]
    pub skipped: Vec<SkippedEntry>,
    /// 按大小排序的前 N 个文件，供摘要与后续分析使用，避免重复遍历整棵树
    #[serde(default)]
    pub top_files: Vec<TopFileEntry>,
    /// 超过阈值天数未修改的文件
    #[serde(default)]
    pub old_files: Vec<OldFileEntry>,
}
