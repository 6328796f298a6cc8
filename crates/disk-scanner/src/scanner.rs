use std::cmp::Ordering as CmpOrdering;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ai_storage_common::{CancelFlag, StoragePilotError};
use ai_storage_domain::{
    DirectoryNode, FileRecord, OldFileEntry, ScanResult, SkipReason, SkippedEntry, TopFileEntry,
};
use dashmap::DashSet;
use rayon::prelude::*;

use crate::filters::{CompiledFilters, ScanFilters};

const SECS_PER_DAY: u64 = 86_400;

pub type ProgressCb = Box<dyn Fn(u64, &str) + Send + Sync>;

struct WalkContext<'a> {
    filters: &'a CompiledFilters,
    /// 已访问目录的 (device, inode)，用于拦截循环与绑定挂载
    visited: DashSet<(u64, u64)>,
    counter: AtomicU64,
    progress: Option<&'a ProgressCb>,
    cancel: &'a CancelFlag,
}

#[cfg(unix)]
fn dir_identity(metadata: &std::fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn dir_identity(_metadata: &std::fs::Metadata) -> Option<(u64, u64)> {
    None
}

fn modified_secs(metadata: &std::fs::Metadata) -> Option<u64> {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
}

fn unix_now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn max_modified(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn skip_for_io(path: &Path, err: &std::io::Error) -> SkippedEntry {
    let reason = match err.kind() {
        std::io::ErrorKind::PermissionDenied => SkipReason::PermissionDenied,
        std::io::ErrorKind::NotFound => SkipReason::NotFound,
        _ => SkipReason::Io(err.to_string()),
    };
    SkippedEntry {
        path: path.to_path_buf(),
        reason,
    }
}

fn map_io(path: &Path, err: std::io::Error) -> StoragePilotError {
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        StoragePilotError::PermissionDenied(path.display().to_string())
    } else {
        StoragePilotError::Io(err)
    }
}

fn build_tree(
    path: &Path,
    name: &str,
    depth: usize,
    ctx: &WalkContext<'_>,
) -> Result<(DirectoryNode, u64, Vec<SkippedEntry>), StoragePilotError> {
    if ctx.cancel.is_cancelled() {
        return Err(StoragePilotError::Cancelled);
    }

    let mut node = DirectoryNode::new(path.to_path_buf(), name.to_string());
    let mut skipped = Vec::new();

    if ctx.filters.max_depth.map_or(false, |limit| depth >= limit) {
        return Ok((node, 0, skipped));
    }

    let read = std::fs::read_dir(path).map_err(|e| map_io(path, e))?;
    let mut entries: Vec<(std::fs::DirEntry, std::fs::FileType)> = Vec::new();
    for entry in read {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                skipped.push(skip_for_io(path, &e));
                continue;
            }
        };
        let entry_path = entry.path();
        // 排除是用户意图，不记入 skipped
        if ctx.filters.is_excluded(&entry_path) {
            continue;
        }
        match entry.file_type() {
            Ok(t) => entries.push((entry, t)),
            Err(e) => skipped.push(skip_for_io(&entry_path, &e)),
        }
    }

    // 目录在前、名字字典序，两次扫描产出同一棵树
    entries.sort_by(|a, b| match (a.1.is_dir(), b.1.is_dir()) {
        (true, false) => CmpOrdering::Less,
        (false, true) => CmpOrdering::Greater,
        _ => a.0.file_name().cmp(&b.0.file_name()),
    });

    let mut subdirs: Vec<(PathBuf, String)> = Vec::new();
    for (entry, file_type) in entries {
        let entry_path = entry.path();
        if file_type.is_symlink() {
            // 符号链接一律不跟随，区分目标是否还存在
            let reason = if std::fs::metadata(&entry_path).is_err() {
                SkipReason::BrokenSymlink
            } else {
                SkipReason::SymlinkSkipped
            };
            skipped.push(SkippedEntry {
                path: entry_path,
                reason,
            });
            continue;
        }
        if file_type.is_dir() {
            match entry.metadata() {
                Ok(md) => {
                    if let Some(id) = dir_identity(&md) {
                        if !ctx.visited.insert(id) {
                            skipped.push(SkippedEntry {
                                path: entry_path,
                                reason: SkipReason::CycleDetected,
                            });
                            continue;
                        }
                    }
                    let child_name = entry.file_name().to_string_lossy().to_string();
                    subdirs.push((entry_path, child_name));
                }
                Err(e) => skipped.push(skip_for_io(&entry_path, &e)),
            }
            continue;
        }
        match entry.metadata() {
            Ok(md) => {
                let record = FileRecord {
                    path: entry_path,
                    size: md.len(),
                    modified: modified_secs(&md),
                };
                node.size += record.size;
                node.newest_modified = max_modified(node.newest_modified, record.modified);
                node.files.push(record);
            }
            Err(e) => skipped.push(skip_for_io(&entry_path, &e)),
        }
    }

    let mut file_count = node.files.len() as u64;
    ctx.counter.fetch_add(file_count, Ordering::Relaxed);

    // 并行处理子目录
    let results: Vec<_> = subdirs
        .par_iter()
        .map(|(child_path, child_name)| {
            match build_tree(child_path, child_name, depth + 1, ctx) {
                Ok((child, cnt, child_skipped)) => Ok((Some((child, cnt)), child_skipped)),
                Err(StoragePilotError::Cancelled) => Err(StoragePilotError::Cancelled),
                Err(StoragePilotError::PermissionDenied(_)) => Ok((
                    None,
                    vec![SkippedEntry {
                        path: child_path.clone(),
                        reason: SkipReason::PermissionDenied,
                    }],
                )),
                Err(e) => Ok((
                    None,
                    vec![SkippedEntry {
                        path: child_path.clone(),
                        reason: SkipReason::Io(e.to_string()),
                    }],
                )),
            }
        })
        .collect();

    for result in results {
        let (child, child_skipped) = result?;
        skipped.extend(child_skipped);
        if let Some((child, cnt)) = child {
            node.size += child.size;
            node.newest_modified = max_modified(node.newest_modified, child.newest_modified);
            file_count += cnt;
            node.dirs.push(child);
        }
    }

    if let Some(cb) = ctx.progress {
        let total_so_far = ctx.counter.load(Ordering::Relaxed);
        cb(total_so_far, path.display().to_string().as_str());
    }

    Ok((node, file_count, skipped))
}

fn collect_top_files(root: &DirectoryNode, n: usize) -> Vec<TopFileEntry> {
    let mut all: Vec<&FileRecord> = root.iter_files().collect();
    all.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    all.into_iter()
        .take(n)
        .map(|f| TopFileEntry {
            path: f.path.clone(),
            size: f.size,
            modified: f.modified,
        })
        .collect()
}

fn collect_old_files(
    root: &DirectoryNode,
    old_file_days: u64,
    now_secs: u64,
    cap: usize,
) -> Vec<OldFileEntry> {
    let threshold_secs = old_file_days * SECS_PER_DAY;
    let mut old: Vec<OldFileEntry> = root
        .iter_files()
        .filter_map(|f| {
            let modified = f.modified?;
            let age_secs = now_secs.saturating_sub(modified);
            if age_secs > threshold_secs {
                Some(OldFileEntry {
                    path: f.path.clone(),
                    size: f.size,
                    age_days: age_secs / SECS_PER_DAY,
                })
            } else {
                None
            }
        })
        .collect();
    old.sort_by(|a, b| {
        b.age_days
            .cmp(&a.age_days)
            .then_with(|| b.size.cmp(&a.size))
            .then_with(|| a.path.cmp(&b.path))
    });
    old.truncate(cap);
    old
}

/// 执行目录扫描（支持进度回调与取消）
pub fn scan_path_with_progress(
    path: &Path,
    filters: &ScanFilters,
    progress: Option<ProgressCb>,
    cancel: &CancelFlag,
) -> Result<ScanResult, StoragePilotError> {
    let start = Instant::now();

    if !path.exists() {
        return Err(StoragePilotError::InvalidPath(format!(
            "路径不存在: {}",
            path.display()
        )));
    }

    let path_buf = std::fs::canonicalize(path)
        .map_err(|e| StoragePilotError::InvalidPath(format!("无法解析路径: {}", e)))?;

    let root_metadata = std::fs::metadata(&path_buf).map_err(|e| map_io(&path_buf, e))?;
    if !root_metadata.is_dir() {
        return Err(StoragePilotError::InvalidPath(format!(
            "不是目录: {}",
            path_buf.display()
        )));
    }

    let name = path_buf
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();

    let compiled = filters.compile()?;
    let ctx = WalkContext {
        filters: &compiled,
        visited: DashSet::new(),
        counter: AtomicU64::new(0),
        progress: progress.as_ref(),
        cancel,
    };
    if let Some(id) = dir_identity(&root_metadata) {
        ctx.visited.insert(id);
    }

    let (root, file_count, skipped) = build_tree(&path_buf, &name, 0, &ctx)?;
    let scan_time_ms = start.elapsed().as_millis() as u64;
    let total_size = root.size;
    let now = unix_now_secs();
    let top_files = collect_top_files(&root, filters.top_files);
    let old_files = collect_old_files(&root, filters.old_file_days, now, filters.top_files);

    if !skipped.is_empty() {
        log::warn!(
            "scan of {} skipped {} entries",
            path_buf.display(),
            skipped.len()
        );
    }

    Ok(ScanResult {
        root,
        scan_time_ms,
        file_count,
        total_size,
        skipped,
        top_files,
        old_files,
    })
}

/// 执行目录扫描（无进度、不可取消）
pub fn scan_path(path: &Path, filters: &ScanFilters) -> Result<ScanResult, StoragePilotError> {
    scan_path_with_progress(path, filters, None, &CancelFlag::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;

    fn create_test_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().to_path_buf();
        let sub = path.join("subdir");
        fs::create_dir_all(&sub).unwrap();
        File::create(sub.join("a.txt"))
            .unwrap()
            .write_all(b"hello")
            .unwrap();
        File::create(path.join("b.txt"))
            .unwrap()
            .write_all(b"world")
            .unwrap();
        (dir, path)
    }

    #[test]
    fn test_scan_nonexistent_path() {
        let err = scan_path(
            Path::new("/nonexistent_xyz_12345_folder"),
            &ScanFilters::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StoragePilotError::InvalidPath(_)));
    }

    #[test]
    fn test_scan_temp_dir_aggregates_sizes() {
        let (_guard, path) = create_test_dir();
        let result = scan_path(&path, &ScanFilters::default()).unwrap();
        assert_eq!(result.file_count, 2);
        assert_eq!(result.total_size, 10);
        assert_eq!(result.root.size, 10);
        assert_eq!(result.root.files.len(), 1);
        assert_eq!(result.root.dirs.len(), 1);
        assert_eq!(result.root.dirs[0].name, "subdir");
        assert_eq!(result.root.dirs[0].size, 5);
        assert!(result.root.newest_modified.is_some());
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_scan_respects_exclude_pattern() {
        let (_guard, path) = create_test_dir();
        let filters = ScanFilters {
            exclude: vec!["subdir".to_string()],
            ..Default::default()
        };
        let result = scan_path(&path, &filters).unwrap();
        assert_eq!(result.file_count, 1);
        assert_eq!(result.total_size, 5);
        assert!(result.root.dirs.is_empty());
    }

    #[test]
    fn test_scan_respects_max_depth() {
        let (_guard, path) = create_test_dir();
        let filters = ScanFilters {
            max_depth: Some(1),
            ..Default::default()
        };
        let result = scan_path(&path, &filters).unwrap();
        // 深度 1：根的直属文件可见，subdir 内部不再展开
        assert_eq!(result.file_count, 1);
        assert_eq!(result.root.dirs.len(), 1);
        assert!(result.root.dirs[0].files.is_empty());
    }

    #[test]
    fn test_top_files_sorted_by_size() {
        let dir = tempfile::tempdir().expect("create temp dir");
        for (name, len) in [("small.bin", 10usize), ("big.bin", 300), ("mid.bin", 100)] {
            File::create(dir.path().join(name))
                .unwrap()
                .write_all(&vec![0u8; len])
                .unwrap();
        }
        let result = scan_path(dir.path(), &ScanFilters::default()).unwrap();
        let names: Vec<_> = result
            .top_files
            .iter()
            .map(|t| t.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["big.bin", "mid.bin", "small.bin"]);
        assert_eq!(result.top_files[0].size, 300);
    }

    #[test]
    fn test_cancelled_before_start() {
        let (_guard, path) = create_test_dir();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = scan_path_with_progress(&path, &ScanFilters::default(), None, &cancel)
            .unwrap_err();
        assert!(matches!(err, StoragePilotError::Cancelled));
    }

    #[test]
    fn test_progress_callback_reports_counts() {
        use std::sync::atomic::AtomicU64;
        use std::sync::Arc;

        let (_guard, path) = create_test_dir();
        let seen = Arc::new(AtomicU64::new(0));
        let seen_cb = Arc::clone(&seen);
        let progress: ProgressCb = Box::new(move |count, _path| {
            seen_cb.fetch_max(count, Ordering::Relaxed);
        });
        let result =
            scan_path_with_progress(&path, &ScanFilters::default(), Some(progress), &CancelFlag::new())
                .unwrap();
        assert_eq!(result.file_count, 2);
        assert_eq!(seen.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_collect_old_files_uses_threshold() {
        let mut root = DirectoryNode::new(PathBuf::from("/r"), "r".to_string());
        let now = 1_000 * SECS_PER_DAY;
        root.files.push(FileRecord {
            path: PathBuf::from("/r/old.txt"),
            size: 1,
            modified: Some(now - 400 * SECS_PER_DAY),
        });
        root.files.push(FileRecord {
            path: PathBuf::from("/r/new.txt"),
            size: 1,
            modified: Some(now - 10 * SECS_PER_DAY),
        });
        root.files.push(FileRecord {
            path: PathBuf::from("/r/unknown.txt"),
            size: 1,
            modified: None,
        });
        let old = collect_old_files(&root, 90, now, 20);
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].path, PathBuf::from("/r/old.txt"));
        assert_eq!(old[0].age_days, 400);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_recorded_not_followed() {
        let (_guard, path) = create_test_dir();
        std::os::unix::fs::symlink(path.join("b.txt"), path.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(path.join("missing.txt"), path.join("dangling.txt")).unwrap();

        let result = scan_path(&path, &ScanFilters::default()).unwrap();
        // 链接不计入文件数和大小
        assert_eq!(result.file_count, 2);
        assert_eq!(result.total_size, 10);
        let reasons: Vec<_> = result.skipped.iter().map(|s| s.reason.clone()).collect();
        assert!(reasons.contains(&SkipReason::SymlinkSkipped));
        assert!(reasons.contains(&SkipReason::BrokenSymlink));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_does_not_hang() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let inner = dir.path().join("inner");
        fs::create_dir_all(&inner).unwrap();
        std::os::unix::fs::symlink(dir.path(), inner.join("loop")).unwrap();
        let result = scan_path(dir.path(), &ScanFilters::default()).unwrap();
        assert_eq!(result.file_count, 0);
        assert!(result
            .skipped
            .iter()
            .any(|s| s.reason == SkipReason::SymlinkSkipped));
    }
}
