//! 删除执行：备份先行，备份失败则放弃删除

use ai_storage_common::StoragePilotError;
use std::fs;
use std::path::{Path, PathBuf};

/// 备份文件名：UTC 时间戳 + 动作号 + 原名，避免同名互相覆盖
fn backup_file_name(id: u64, original: &Path) -> String {
    let name = original
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unnamed".to_string());
    format!("{}_{}_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"), id, name)
}

/// 删除单个文件
///
/// 给定 backup_dir 时先把文件复制进备份目录，复制失败则删除不发生，
/// 原文件保持原样。返回备份落点（如有）。
pub fn delete_file(
    path: &Path,
    id: u64,
    backup_dir: Option<&Path>,
) -> Result<Option<PathBuf>, StoragePilotError> {
    let backup_path = match backup_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let target = dir.join(backup_file_name(id, path));
            fs::copy(path, &target)?;
            Some(target)
        }
        None => None,
    };
    fs::remove_file(path)?;
    Ok(backup_path)
}

/// 删除整棵工件子树；工件可再生成，不做备份
pub fn clean_artifact(path: &Path) -> Result<(), StoragePilotError> {
    fs::remove_dir_all(path)?;
    Ok(())
}
