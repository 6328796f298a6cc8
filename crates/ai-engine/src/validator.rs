//! 动作准入校验：受保护路径与目标冲突在规划期拦截

use ai_storage_common::SafetyPolicy;
use ai_storage_domain::{ActionKind, PlanningConflict};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 规划期校验器
///
/// 记录已接纳动作占用的目标路径；同一目标第二次出现判为冲突，
/// 先到者胜。受保护前缀下的源或目标一律拒绝。
pub struct PlanValidator<'a> {
    policy: &'a SafetyPolicy,
    claimed: HashMap<PathBuf, u64>,
}

impl<'a> PlanValidator<'a> {
    pub fn new(policy: &'a SafetyPolicy) -> Self {
        Self {
            policy,
            claimed: HashMap::new(),
        }
    }

    fn protected_prefix(&self, path: &Path) -> Option<PathBuf> {
        self.policy
            .protected_paths
            .iter()
            .find(|prefix| path.starts_with(prefix))
            .cloned()
    }

    /// 接纳或拒绝一个候选动作；接纳即登记其目标占用
    pub fn admit(&mut self, kind: &ActionKind, id: u64) -> Result<(), PlanningConflict> {
        if let Some(prefix) = self.protected_prefix(kind.source()) {
            return Err(PlanningConflict::ProtectedPath { prefix });
        }
        if let Some(dest) = kind.destination() {
            if let Some(prefix) = self.protected_prefix(dest) {
                return Err(PlanningConflict::ProtectedPath { prefix });
            }
            if let Some(&winner_id) = self.claimed.get(dest) {
                return Err(PlanningConflict::DestinationCollision {
                    destination: dest.to_path_buf(),
                    winner_id,
                });
            }
            self.claimed.insert(dest.to_path_buf(), id);
        }
        Ok(())
    }
}
