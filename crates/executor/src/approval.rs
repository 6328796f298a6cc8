//! 批准门：require_approval 策略下动作必须先过这道门

use ai_storage_domain::ActionItem;

/// 动作批准接口
pub trait ApprovalGate: Send + Sync {
    fn approve(&self, item: &ActionItem) -> bool;

    /// 整批裁决，与输入等长；默认逐个询问
    fn approve_batch(&self, items: &[ActionItem]) -> Vec<bool> {
        items.iter().map(|item| self.approve(item)).collect()
    }
}

/// 全部放行（--yes）
pub struct AutoApprove;

impl ApprovalGate for AutoApprove {
    fn approve(&self, _item: &ActionItem) -> bool {
        true
    }
}

/// 全部扣住：不可交互环境下的安全缺省
pub struct HoldAll;

impl ApprovalGate for HoldAll {
    fn approve(&self, _item: &ActionItem) -> bool {
        false
    }
}
