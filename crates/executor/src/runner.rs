//! 执行器：顺序消费计划动作，缺省 dry-run，一切终态落审计日志

use ai_storage_common::{CancelFlag, SafetyPolicy, StoragePilotError};
use ai_storage_domain::{ActionItem, ActionKind, ActionLogEntry, ActionState, CleanupPlan};
use chrono::Utc;
use std::path::PathBuf;

use crate::action_log::ActionLogWriter;
use crate::approval::ApprovalGate;
use crate::delete;
use crate::r#move;

/// 一次执行的汇总
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub executed: u64,
    pub failed: u64,
    pub rejected: u64,
    pub skipped_logged: u64,
    /// 未获批准或被取消的动作，保持非终态、未入日志
    pub pending: Vec<ActionItem>,
    /// 本次运行写入日志的记录
    pub entries: Vec<ActionLogEntry>,
    pub reclaimed_bytes: u64,
}

pub struct Executor<'a> {
    policy: &'a SafetyPolicy,
    log: ActionLogWriter,
}

impl<'a> Executor<'a> {
    pub fn new(policy: &'a SafetyPolicy, log: ActionLogWriter) -> Self {
        Self { policy, log }
    }

    /// 执行整份计划
    ///
    /// require_approval 时先过批准门；dry-run 只记录不落盘；
    /// 单个动作失败不中断其余动作；取消后剩余动作全部转入 pending。
    pub fn run(
        &mut self,
        plan: &CleanupPlan,
        gate: &dyn ApprovalGate,
        cancel: &CancelFlag,
    ) -> Result<ExecutionReport, StoragePilotError> {
        let verdicts: Vec<bool> = if self.policy.require_approval {
            gate.approve_batch(&plan.actions)
        } else {
            vec![true; plan.actions.len()]
        };

        let mut report = ExecutionReport::default();
        let log_start = self.log.entries().len();

        for (index, item) in plan.actions.iter().enumerate() {
            if cancel.is_cancelled() {
                log::warn!("execution cancelled, {} actions left", plan.actions.len() - index);
                report
                    .pending
                    .extend(plan.actions[index..].iter().cloned());
                break;
            }
            if !verdicts.get(index).copied().unwrap_or(false) {
                report.pending.push(item.clone());
                continue;
            }
            // 执行期复查保护前缀，拦住规划后才改动配置的情况
            if let Some(path) = self.protected_target(&item.kind) {
                report.rejected += 1;
                self.log_outcome(
                    item,
                    ActionState::Rejected,
                    Some(format!("protected path: {}", path.display())),
                    None,
                )?;
                continue;
            }
            if self.policy.dry_run {
                report.skipped_logged += 1;
                self.log_outcome(
                    item,
                    ActionState::SkippedLogged,
                    None,
                    self.dry_run_hint(&item.kind),
                )?;
                continue;
            }
            match self.perform(item) {
                Ok(undo) => {
                    report.executed += 1;
                    if item.kind.reclaims() {
                        report.reclaimed_bytes += item.size_bytes;
                    }
                    self.log_outcome(item, ActionState::Executed, None, undo)?;
                }
                Err(e) => {
                    log::warn!("action #{} failed: {}", item.id, e);
                    report.failed += 1;
                    self.log_outcome(item, ActionState::Failed, Some(e.to_string()), None)?;
                }
            }
        }

        report.entries = self.log.entries()[log_start..].to_vec();
        Ok(report)
    }

    fn protected_target(&self, kind: &ActionKind) -> Option<PathBuf> {
        if self.policy.is_protected(kind.source()) {
            return Some(kind.source().to_path_buf());
        }
        kind.destination()
            .filter(|d| self.policy.is_protected(d))
            .map(|d| d.to_path_buf())
    }

    /// 落盘动作本体，返回逆操作提示
    fn perform(&self, item: &ActionItem) -> Result<Option<String>, StoragePilotError> {
        match &item.kind {
            ActionKind::Move { from, to } => {
                r#move::move_file_strict(from, to)?;
                Ok(Some(format!("mv '{}' '{}'", to.display(), from.display())))
            }
            ActionKind::Delete { path, backup } => {
                let backup_dir = backup.then(|| self.policy.backup_dir.as_path());
                let backup_path = delete::delete_file(path, item.id, backup_dir)?;
                Ok(backup_path.map(|b| format!("mv '{}' '{}'", b.display(), path.display())))
            }
            ActionKind::CreateDirectory { path } => {
                r#move::create_directory(path)?;
                Ok(Some(format!("rmdir '{}'", path.display())))
            }
            ActionKind::CleanArtifact { path, regenerate, .. } => {
                delete::clean_artifact(path)?;
                Ok(regenerate.clone())
            }
        }
    }

    /// dry-run 下预告的逆操作
    fn dry_run_hint(&self, kind: &ActionKind) -> Option<String> {
        match kind {
            ActionKind::Move { from, to } => {
                Some(format!("mv '{}' '{}'", to.display(), from.display()))
            }
            ActionKind::Delete { backup: true, .. } => Some(format!(
                "backup would land in {}",
                self.policy.backup_dir.display()
            )),
            ActionKind::Delete { backup: false, .. } => None,
            ActionKind::CreateDirectory { path } => Some(format!("rmdir '{}'", path.display())),
            ActionKind::CleanArtifact { regenerate, .. } => regenerate.clone(),
        }
    }

    fn log_outcome(
        &mut self,
        item: &ActionItem,
        outcome: ActionState,
        error: Option<String>,
        undo: Option<String>,
    ) -> Result<(), StoragePilotError> {
        let mut item = item.clone();
        item.state = outcome;
        self.log.append(ActionLogEntry {
            timestamp: Utc::now(),
            item,
            outcome,
            error,
            dry_run: self.policy.dry_run,
            undo,
        })
    }
}
