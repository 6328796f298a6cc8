use ai_storage_common::StoragePilotError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 大文件判定阈值默认值（字节）
pub const DEFAULT_LARGE_FILE_BYTES: u64 = 100 * 1024 * 1024;
/// 旧文件判定阈值默认值（天）
pub const DEFAULT_OLD_FILE_DAYS: u64 = 90;
/// 摘要保留的 Top N 文件数
pub const DEFAULT_TOP_FILES: usize = 20;
/// 参与重复检测的最小文件大小（字节）
pub const DEFAULT_MIN_DUPLICATE_BYTES: u64 = 1024;

/// 扫描过滤器与阈值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanFilters {
    /// 排除的 glob 模式，匹配完整路径或裸文件名
    pub exclude: Vec<String>,
    /// 最大递归深度；None 为不限
    pub max_depth: Option<usize>,
    /// 跳过以 . 开头的条目（会同时隐藏 .venv 这类工件目录）
    pub skip_hidden: bool,
    pub large_file_bytes: u64,
    pub old_file_days: u64,
    pub top_files: usize,
    pub min_duplicate_bytes: u64,
}

impl Default for ScanFilters {
    fn default() -> Self {
        Self {
            exclude: vec![],
            max_depth: None,
            skip_hidden: false,
            large_file_bytes: DEFAULT_LARGE_FILE_BYTES,
            old_file_days: DEFAULT_OLD_FILE_DAYS,
            top_files: DEFAULT_TOP_FILES,
            min_duplicate_bytes: DEFAULT_MIN_DUPLICATE_BYTES,
        }
    }
}

impl ScanFilters {
    /// 编译排除模式；非法模式报配置错误
    pub fn compile(&self) -> Result<CompiledFilters, StoragePilotError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| {
                StoragePilotError::Config(format!("invalid exclude pattern '{}': {}", pattern, e))
            })?;
            builder.add(glob);
        }
        let exclude = builder
            .build()
            .map_err(|e| StoragePilotError::Config(e.to_string()))?;
        Ok(CompiledFilters {
            exclude,
            max_depth: self.max_depth,
            skip_hidden: self.skip_hidden,
        })
    }
}

/// 编译后的过滤器
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    exclude: GlobSet,
    pub max_depth: Option<usize>,
    pub skip_hidden: bool,
}

impl CompiledFilters {
    /// 条目是否应被排除：隐藏名、完整路径或裸文件名命中任一模式
    pub fn is_excluded(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str());
        if self.skip_hidden {
            if let Some(name) = name {
                if name.starts_with('.') {
                    return true;
                }
            }
        }
        if self.exclude.is_match(path) {
            return true;
        }
        // 裸名模式（如 "node_modules"）对任意层级的同名条目生效
        name.map_or(false, |n| self.exclude.is_match(Path::new(n)))
    }
}
