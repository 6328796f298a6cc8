//! 终端输出的小工具

use ai_storage_domain::{ActionItem, ActionKind};

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

pub fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

pub fn describe_action(item: &ActionItem) -> String {
    match &item.kind {
        ActionKind::Move { from, to } => format!("move {} -> {}", from.display(), to.display()),
        ActionKind::Delete { path, backup: true } => {
            format!("delete {} (backup first)", path.display())
        }
        ActionKind::Delete {
            path,
            backup: false,
        } => format!("delete {}", path.display()),
        ActionKind::CreateDirectory { path } => format!("mkdir {}", path.display()),
        ActionKind::CleanArtifact { path, kind, .. } => {
            format!("clean {} ({})", path.display(), kind)
        }
    }
}
