//! 审计日志：JSON Lines 只追加，每个到达终态的动作一条

use ai_storage_common::StoragePilotError;
use ai_storage_domain::ActionLogEntry;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// 追加写入器；每条记录立即 flush，中途崩溃也不丢已写记录
pub struct ActionLogWriter {
    path: PathBuf,
    file: File,
    entries: Vec<ActionLogEntry>,
}

impl ActionLogWriter {
    /// 追加模式打开，文件与父目录不存在则创建
    pub fn open(path: &Path) -> Result<Self, StoragePilotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            entries: Vec::new(),
        })
    }

    pub fn append(&mut self, entry: ActionLogEntry) -> Result<(), StoragePilotError> {
        let line = serde_json::to_string(&entry).map_err(std::io::Error::from)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        self.entries.push(entry);
        Ok(())
    }

    /// 本次会话写入的记录
    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 读回整个日志；坏行告警跳过，单行损坏不毁掉历史
pub fn read_entries(path: &Path) -> Result<Vec<ActionLogEntry>, StoragePilotError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ActionLogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => log::warn!("skipping malformed log line {}: {}", lineno + 1, e),
        }
    }
    Ok(entries)
}
