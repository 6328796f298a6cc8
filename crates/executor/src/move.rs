//! 移动执行：目标目录须已由计划建好，移动自身从不隐式建目录

use ai_storage_common::StoragePilotError;
use std::fs;
use std::io;
use std::path::Path;

/// rename 不能跨文件系统（EXDEV / ERROR_NOT_SAME_DEVICE）
fn is_cross_device(err: &io::Error) -> bool {
    let code = if cfg!(windows) { 17 } else { 18 };
    err.raw_os_error() == Some(code)
}

/// 严格移动：父目录必须已存在，目标已存在即失败、从不覆盖
pub fn move_file_strict(from: &Path, to: &Path) -> Result<(), StoragePilotError> {
    let parent = to
        .parent()
        .ok_or_else(|| StoragePilotError::InvalidPath(format!("无法解析路径: {}", to.display())))?;
    if !parent.is_dir() {
        return Err(StoragePilotError::InvalidPath(format!(
            "目标目录不存在: {}",
            parent.display()
        )));
    }
    if to.exists() {
        return Err(StoragePilotError::InvalidPath(format!(
            "目标已存在: {}",
            to.display()
        )));
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            // 跨设备回退：复制后删源；删源失败则回滚目标副本
            fs::copy(from, to)?;
            if let Err(remove_err) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(remove_err.into());
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// 幂等建目录
pub fn create_directory(path: &Path) -> Result<(), StoragePilotError> {
    fs::create_dir_all(path)?;
    Ok(())
}
