//! apply 子命令：缺省演练；--execute 才落盘，--yes 跳过交互批准

use crate::commands::cancel_on_ctrl_c;
use crate::config::AppConfig;
use crate::output::{describe_action, human_size};
use ai_storage_domain::ActionItem;
use ai_storage_executor::{ActionLogWriter, ApprovalGate, AutoApprove, Executor};
use std::path::PathBuf;

/// 终端逐项确认；不可交互环境下一律拒绝
struct ConsoleGate;

impl ApprovalGate for ConsoleGate {
    fn approve(&self, item: &ActionItem) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(format!("approve: {}?", describe_action(item)))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

pub async fn run(
    config: &AppConfig,
    cli_paths: &[PathBuf],
    execute: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let cancel = cancel_on_ctrl_c();
    let plan = super::plan::build_plan(config, cli_paths, &cancel).await?;
    if plan.actions.is_empty() {
        println!("nothing to do");
        return Ok(());
    }

    let mut policy = config.safety.clone();
    policy.dry_run = !execute;

    println!();
    println!(
        "{} actions, estimated reclaim {}{}",
        plan.actions.len(),
        human_size(plan.estimated_space),
        if policy.dry_run { " (dry-run)" } else { "" }
    );
    for item in &plan.actions {
        println!("  #{:<4} {}", item.id, describe_action(item));
    }
    println!();

    let log = ActionLogWriter::open(&config.log_file)?;
    let mut executor = Executor::new(&policy, log);
    let console = ConsoleGate;
    let gate: &dyn ApprovalGate = if yes { &AutoApprove } else { &console };
    let report = executor.run(&plan, gate, &cancel)?;

    println!();
    if policy.dry_run {
        println!(
            "dry-run: {} actions logged, nothing touched",
            report.skipped_logged
        );
        println!("re-run with --execute to apply");
    } else {
        println!(
            "executed: {}  failed: {}  rejected: {}  reclaimed: {}",
            report.executed,
            report.failed,
            report.rejected,
            human_size(report.reclaimed_bytes)
        );
    }
    if !report.pending.is_empty() {
        println!(
            "pending (not approved or cancelled): {}",
            report.pending.len()
        );
    }
    println!("audit log: {}", config.log_file.display());
    Ok(())
}
