pub mod apply;
pub mod log;
pub mod plan;
pub mod scan;

use crate::config::AppConfig;
use ai_storage_common::CancelFlag;
use ai_storage_domain::ScanResult;
use ai_storage_scanner::{scan_path_with_progress, ProgressCb};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn stderr_flush() {
    let _ = std::io::stderr().flush();
}

/// Ctrl-C 置位取消标志；扫描与执行都在边界检查该标志
pub(crate) fn cancel_on_ctrl_c() -> CancelFlag {
    let flag = CancelFlag::default();
    let handle = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ::log::warn!("interrupt received, cancelling");
            handle.cancel();
        }
    });
    flag
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// 在阻塞线程池里扫描一个目录，进度打到 stderr
pub(crate) async fn scan_one(
    config: &AppConfig,
    path: &Path,
    cancel: &CancelFlag,
) -> anyhow::Result<ScanResult> {
    let _ = writeln!(
        std::io::stderr(),
        "[StoragePilot] scan start, path: {}",
        path.display()
    );
    stderr_flush();

    let filters = config.scan.clone();
    let path_buf = path.to_path_buf();
    let cancel = cancel.clone();
    let progress: ProgressCb = Box::new(|count, current| {
        let _ = write!(std::io::stderr(), "\r[StoragePilot] {} files, at {}", count, current);
        stderr_flush();
    });
    let result = tokio::task::spawn_blocking(move || {
        scan_path_with_progress(&path_buf, &filters, Some(progress), &cancel)
    })
    .await??;
    let _ = writeln!(
        std::io::stderr(),
        "\n[StoragePilot] scan done, path: {}, file_count: {}, total_size: {}",
        path.display(),
        result.file_count,
        result.total_size
    );
    stderr_flush();
    Ok(result)
}
