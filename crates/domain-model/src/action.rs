use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ArtifactKind, RiskLevel};

/// 执行动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Move {
        from: PathBuf,
        to: PathBuf,
    },
    Delete {
        path: PathBuf,
        /// 删除前是否先备份
        backup: bool,
    },
    /// 为后续 Move 准备目标目录；移动自身从不隐式建目录
    CreateDirectory {
        path: PathBuf,
    },
    /// 删除整棵工件子树
    CleanArtifact {
        path: PathBuf,
        kind: ArtifactKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regenerate: Option<String>,
    },
}

impl ActionKind {
    /// 动作作用的源路径
    pub fn source(&self) -> &Path {
        match self {
            ActionKind::Move { from, .. } => from,
            ActionKind::Delete { path, .. } => path,
            ActionKind::CreateDirectory { path } => path,
            ActionKind::CleanArtifact { path, .. } => path,
        }
    }

    /// 动作写入的目标路径（如有）
    pub fn destination(&self) -> Option<&Path> {
        match self {
            ActionKind::Move { to, .. } => Some(to),
            ActionKind::CreateDirectory { path } => Some(path),
            _ => None,
        }
    }

    /// 是否为回收空间的动作
    pub fn reclaims(&self) -> bool {
        matches!(
            self,
            ActionKind::Delete { .. } | ActionKind::CleanArtifact { .. }
        )
    }
}

/// 动作状态机
///
/// Proposed → Approved | Rejected；Approved → Executed | Failed | SkippedLogged。
/// 任何终态都必须在审计日志中追加一条记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    Proposed,
    Approved,
    Rejected,
    /// dry-run 下的终态：只记录、不落盘
    SkippedLogged,
    Executed,
    Failed,
}

impl ActionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionState::Proposed | ActionState::Approved)
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionState::Proposed => "proposed",
            ActionState::Approved => "approved",
            ActionState::Rejected => "rejected",
            ActionState::SkippedLogged => "skipped-logged",
            ActionState::Executed => "executed",
            ActionState::Failed => "failed",
        };
        f.pad(label)
    }
}

/// 计划动作：由规划器创建，执行器恰好消费一次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: u64,
    pub kind: ActionKind,
    /// 人类可读的动作理由
    pub reason: String,
    /// 预计涉及的空间（字节）
    pub size_bytes: u64,
    pub risk: RiskLevel,
    pub state: ActionState,
}

/// 审计日志条目：不可变、只追加；重放即可还原发生过哪些变更
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub item: ActionItem,
    /// 动作到达的终态
    pub outcome: ActionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dry_run: bool,
    /// 人类可读的逆操作提示
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo: Option<String>,
}
