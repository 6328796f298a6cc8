//! log 子命令：回看审计日志

use crate::config::AppConfig;
use crate::output::describe_action;
use ai_storage_executor::read_entries;

pub fn run(config: &AppConfig, tail: usize) -> anyhow::Result<()> {
    let entries = read_entries(&config.log_file)?;
    if entries.is_empty() {
        println!("no log entries at {}", config.log_file.display());
        return Ok(());
    }
    let start = entries.len().saturating_sub(tail);
    for entry in &entries[start..] {
        let mode = if entry.dry_run { "dry-run" } else { "real" };
        println!(
            "{}  [{:^14}] ({})  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.outcome,
            mode,
            describe_action(&entry.item)
        );
        if let Some(error) = &entry.error {
            println!("    error: {}", error);
        }
        if let Some(undo) = &entry.undo {
            println!("    undo: {}", undo);
        }
    }
    println!(
        "{} entries total, showing last {}",
        entries.len(),
        entries.len().min(tail)
    );
    Ok(())
}
