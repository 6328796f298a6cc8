use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 按大小排序的前 N 大文件条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopFileEntry {
    pub path: PathBuf,
    pub size: u64,
    /// Unix 时间戳（秒），最近修改时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<u64>,
}

/// 超过阈值天数未修改的文件条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OldFileEntry {
    pub path: PathBuf,
    pub size: u64,
    /// 距最近一次修改的天数
    pub age_days: u64,
}
