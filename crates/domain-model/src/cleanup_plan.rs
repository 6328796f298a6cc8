use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::action::{ActionItem, ActionKind};

/// 规划期冲突：候选动作被拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "conflict", rename_all = "snake_case")]
pub enum PlanningConflict {
    /// 目标路径已被更早的动作占用，后来者被拒绝
    DestinationCollision { destination: PathBuf, winner_id: u64 },
    /// 源或目标落在受保护前缀之下
    ProtectedPath { prefix: PathBuf },
}

/// 规划期被拒绝的动作，从不进入执行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedAction {
    pub kind: ActionKind,
    pub conflict: PlanningConflict,
}

/// 需要人工决定的条目（低置信度或版本嫌疑）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItem {
    pub path: PathBuf,
    pub reason: String,
    pub confidence: f32,
}

/// 清理计划
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupPlan {
    pub actions: Vec<ActionItem>,
    /// 规划期拒绝的候选（保护前缀、目标冲突）
    #[serde(default)]
    pub rejected: Vec<RejectedAction>,
    /// 审阅队列，不生成动作
    #[serde(default)]
    pub review: Vec<ReviewItem>,
    /// 预计可回收空间（字节）
    pub estimated_space: u64,
}
