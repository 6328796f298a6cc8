//! 清理规划器：分类、重复与工件三路输入 → 有序动作计划
//!
//! 规划是纯函数：同一输入永远产出同一计划，不触碰文件系统。

use ai_storage_common::SafetyPolicy;
use ai_storage_domain::{
    ActionHint, ActionItem, ActionKind, ActionState, ArtifactMatch, Category, Classification,
    CleanupPlan, DuplicateGroup, RejectedAction, ReviewItem, RiskLevel,
};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::validator::PlanValidator;

/// 把三路分析结果编排为一份清理计划
///
/// 动作顺序固定：建目录 → 移动 → 删除 → 清理工件；执行器按序消费。
/// 重复组先于分类求值：冗余副本计划为删除，不再参与移动。
/// 受保护路径与目标冲突在这里拦截，进入 `rejected` 而非执行。
pub fn plan_cleanup(
    classifications: &[Classification],
    duplicates: &[DuplicateGroup],
    artifacts: &[ArtifactMatch],
    policy: &SafetyPolicy,
) -> CleanupPlan {
    let mut plan = CleanupPlan::default();
    let mut validator = PlanValidator::new(policy);
    let mut next_id = 1u64;

    let mut dirs: Vec<ActionItem> = Vec::new();
    let mut moves: Vec<ActionItem> = Vec::new();
    let mut deletes: Vec<ActionItem> = Vec::new();
    let mut cleans: Vec<ActionItem> = Vec::new();

    // 冗余副本：先占位，后续分类不再移动这些路径
    let mut redundant_paths: HashSet<PathBuf> = HashSet::new();
    let duplicate_risk = if policy.backup_before_delete {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };
    for group in duplicates {
        for member in group.redundant() {
            redundant_paths.insert(member.path.clone());
            let kind = ActionKind::Delete {
                path: member.path.clone(),
                backup: policy.backup_before_delete,
            };
            let id = next_id;
            next_id += 1;
            match validator.admit(&kind, id) {
                Ok(()) => deletes.push(ActionItem {
                    id,
                    kind,
                    reason: format!("Duplicate of {}", group.keeper().path.display()),
                    size_bytes: group.size,
                    risk: duplicate_risk,
                    state: ActionState::Proposed,
                }),
                Err(conflict) => plan.rejected.push(RejectedAction { kind, conflict }),
            }
        }
    }

    for classification in classifications {
        if redundant_paths.contains(&classification.path) {
            continue;
        }
        match classification.action {
            ActionHint::Keep => {}
            ActionHint::Review => plan.review.push(ReviewItem {
                path: classification.path.clone(),
                reason: classification.reason.clone(),
                confidence: classification.confidence,
            }),
            ActionHint::Delete => {
                let kind = ActionKind::Delete {
                    path: classification.path.clone(),
                    backup: policy.backup_before_delete,
                };
                // 安装包可重新下载，风险中等；系统垃圾文件低风险
                let risk = if classification.category == Category::Installer {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                };
                let id = next_id;
                next_id += 1;
                match validator.admit(&kind, id) {
                    Ok(()) => deletes.push(ActionItem {
                        id,
                        kind,
                        reason: classification.reason.clone(),
                        size_bytes: classification.size,
                        risk,
                        state: ActionState::Proposed,
                    }),
                    Err(conflict) => plan.rejected.push(RejectedAction { kind, conflict }),
                }
            }
            ActionHint::Move => {
                let Some(to) = classification.destination.clone() else {
                    // 规则保证 Move 必有去向；缺失时降级为人工审阅
                    plan.review.push(ReviewItem {
                        path: classification.path.clone(),
                        reason: "No destination configured for category".to_string(),
                        confidence: classification.confidence,
                    });
                    continue;
                };
                let kind = ActionKind::Move {
                    from: classification.path.clone(),
                    to,
                };
                let id = next_id;
                next_id += 1;
                match validator.admit(&kind, id) {
                    Ok(()) => moves.push(ActionItem {
                        id,
                        kind,
                        reason: classification.reason.clone(),
                        size_bytes: classification.size,
                        risk: RiskLevel::Low,
                        state: ActionState::Proposed,
                    }),
                    Err(conflict) => plan.rejected.push(RejectedAction { kind, conflict }),
                }
            }
        }
    }

    for artifact in artifacts {
        if !artifact.abandoned {
            continue;
        }
        let kind = ActionKind::CleanArtifact {
            path: artifact.path.clone(),
            kind: artifact.kind,
            regenerate: artifact.regenerate.clone(),
        };
        let id = next_id;
        next_id += 1;
        match validator.admit(&kind, id) {
            Ok(()) => cleans.push(ActionItem {
                id,
                kind,
                reason: match &artifact.regenerate {
                    Some(cmd) => format!("Abandoned {} (regenerate: {})", artifact.kind, cmd),
                    None => format!("Abandoned {}", artifact.kind),
                },
                size_bytes: artifact.size_bytes,
                risk: RiskLevel::Low,
                state: ActionState::Proposed,
            }),
            Err(conflict) => plan.rejected.push(RejectedAction { kind, conflict }),
        }
    }

    // 已接纳移动涉及的目标目录，去重排序后前置
    let mut parents: Vec<PathBuf> = moves
        .iter()
        .filter_map(|m| m.kind.destination())
        .filter_map(|d| d.parent().map(|p| p.to_path_buf()))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    parents.sort();
    for parent in parents {
        let id = next_id;
        next_id += 1;
        dirs.push(ActionItem {
            id,
            kind: ActionKind::CreateDirectory { path: parent },
            reason: "Destination directory for planned moves".to_string(),
            size_bytes: 0,
            risk: RiskLevel::Low,
            state: ActionState::Proposed,
        });
    }

    plan.actions = dirs;
    plan.actions.append(&mut moves);
    plan.actions.append(&mut deletes);
    plan.actions.append(&mut cleans);
    plan.estimated_space = plan
        .actions
        .iter()
        .filter(|a| a.kind.reclaims())
        .map(|a| a.size_bytes)
        .sum();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_storage_domain::{Category, ClassificationSource, FileRecord};
    use std::path::Path;

    fn record(path: &str, modified: u64) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size: 100,
            modified: Some(modified),
        }
    }

    fn move_classification(path: &str, dest: &str) -> Classification {
        Classification {
            path: PathBuf::from(path),
            size: 2048,
            category: Category::Document,
            subcategory: Some("general".to_string()),
            confidence: 0.9,
            destination: Some(PathBuf::from(dest)),
            action: ActionHint::Move,
            reason: "Classified as document/general".to_string(),
            source: ClassificationSource::Rule,
        }
    }

    fn delete_classification(path: &str) -> Classification {
        Classification {
            path: PathBuf::from(path),
            size: 4096,
            category: Category::Installer,
            subcategory: Some("macos".to_string()),
            confidence: 0.9,
            destination: None,
            action: ActionHint::Delete,
            reason: "Installers can be re-downloaded when needed".to_string(),
            source: ClassificationSource::Rule,
        }
    }

    fn review_classification(path: &str) -> Classification {
        Classification {
            path: PathBuf::from(path),
            size: 10,
            category: Category::Other,
            subcategory: None,
            confidence: 0.3,
            destination: None,
            action: ActionHint::Review,
            reason: "Classified as other/general".to_string(),
            source: ClassificationSource::Rule,
        }
    }

    fn duplicate_group(keeper: &str, copies: &[&str]) -> DuplicateGroup {
        let mut members = vec![record(keeper, 1000)];
        for (i, copy) in copies.iter().enumerate() {
            members.push(record(copy, 2000 + i as u64));
        }
        DuplicateGroup {
            size: 100,
            fingerprint: "abcd".to_string(),
            members,
        }
    }

    #[test]
    fn test_duplicate_group_deletes_only_redundant_members() {
        let plan = plan_cleanup(
            &[],
            &[duplicate_group("/d/a.txt", &["/d/b.txt"])],
            &[],
            &SafetyPolicy::default(),
        );
        assert_eq!(plan.actions.len(), 1);
        assert_eq!(
            plan.actions[0].kind,
            ActionKind::Delete {
                path: PathBuf::from("/d/b.txt"),
                backup: true,
            }
        );
        assert!(plan.actions[0].reason.contains("/d/a.txt"));
        assert_eq!(plan.estimated_space, 100);
    }

    #[test]
    fn test_directories_created_before_moves() {
        let plan = plan_cleanup(
            &[
                move_classification("/dl/a.pdf", "/sorted/docs/a.pdf"),
                move_classification("/dl/b.pdf", "/sorted/docs/b.pdf"),
                move_classification("/dl/c.jpg", "/sorted/pics/c.jpg"),
            ],
            &[],
            &[],
            &SafetyPolicy::default(),
        );
        // 两个去重后的目录在最前，随后三个移动
        assert_eq!(plan.actions.len(), 5);
        assert_eq!(
            plan.actions[0].kind,
            ActionKind::CreateDirectory {
                path: PathBuf::from("/sorted/docs")
            }
        );
        assert_eq!(
            plan.actions[1].kind,
            ActionKind::CreateDirectory {
                path: PathBuf::from("/sorted/pics")
            }
        );
        assert!(plan.actions[2..]
            .iter()
            .all(|a| matches!(a.kind, ActionKind::Move { .. })));
        // 移动不回收空间
        assert_eq!(plan.estimated_space, 0);
    }

    #[test]
    fn test_destination_collision_keeps_first_candidate() {
        let plan = plan_cleanup(
            &[
                move_classification("/dl/a/report.pdf", "/sorted/report.pdf"),
                move_classification("/dl/b/report.pdf", "/sorted/report.pdf"),
            ],
            &[],
            &[],
            &SafetyPolicy::default(),
        );
        let moves: Vec<_> = plan
            .actions
            .iter()
            .filter(|a| matches!(a.kind, ActionKind::Move { .. }))
            .collect();
        assert_eq!(moves.len(), 1);
        assert_eq!(
            moves[0].kind.source(),
            Path::new("/dl/a/report.pdf")
        );
        assert_eq!(plan.rejected.len(), 1);
        match &plan.rejected[0].conflict {
            ai_storage_domain::PlanningConflict::DestinationCollision {
                destination,
                winner_id,
            } => {
                assert_eq!(destination, Path::new("/sorted/report.pdf"));
                assert_eq!(*winner_id, moves[0].id);
            }
            other => panic!("unexpected conflict: {:?}", other),
        }
    }

    #[test]
    fn test_protected_path_rejected_at_planning() {
        let policy = SafetyPolicy {
            protected_paths: vec![PathBuf::from("/home/u/.ssh")],
            ..Default::default()
        };
        let plan = plan_cleanup(
            &[delete_classification("/home/u/.ssh/id_rsa.dmg")],
            &[],
            &[],
            &policy,
        );
        assert!(plan.actions.is_empty());
        assert_eq!(plan.rejected.len(), 1);
        assert!(matches!(
            plan.rejected[0].conflict,
            ai_storage_domain::PlanningConflict::ProtectedPath { .. }
        ));
        assert_eq!(plan.estimated_space, 0);
    }

    #[test]
    fn test_review_hint_enters_review_queue_not_actions() {
        let plan = plan_cleanup(
            &[review_classification("/dl/mystery.xyz")],
            &[],
            &[],
            &SafetyPolicy::default(),
        );
        assert!(plan.actions.is_empty());
        assert_eq!(plan.review.len(), 1);
        assert_eq!(plan.review[0].path, PathBuf::from("/dl/mystery.xyz"));
        assert!((plan.review[0].confidence - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_redundant_copy_not_moved() {
        // b.txt 既是冗余副本又有移动分类：删除胜出
        let plan = plan_cleanup(
            &[move_classification("/d/b.txt", "/sorted/b.txt")],
            &[duplicate_group("/d/a.txt", &["/d/b.txt"])],
            &[],
            &SafetyPolicy::default(),
        );
        assert_eq!(plan.actions.len(), 1);
        assert!(matches!(plan.actions[0].kind, ActionKind::Delete { .. }));
    }

    #[test]
    fn test_only_abandoned_artifacts_cleaned() {
        let artifacts = vec![
            ArtifactMatch {
                path: PathBuf::from("/proj/old/node_modules"),
                kind: ai_storage_domain::ArtifactKind::DependencyCache,
                size_bytes: 500_000,
                file_count: 1200,
                newest_modified: Some(1),
                abandoned: true,
                regenerate: Some("npm install".to_string()),
            },
            ArtifactMatch {
                path: PathBuf::from("/proj/active/target"),
                kind: ai_storage_domain::ArtifactKind::BuildOutput,
                size_bytes: 900_000,
                file_count: 300,
                newest_modified: Some(2),
                abandoned: false,
                regenerate: Some("cargo build".to_string()),
            },
        ];
        let plan = plan_cleanup(&[], &[], &artifacts, &SafetyPolicy::default());
        assert_eq!(plan.actions.len(), 1);
        assert!(matches!(
            plan.actions[0].kind,
            ActionKind::CleanArtifact { .. }
        ));
        assert!(plan.actions[0].reason.contains("npm install"));
        assert_eq!(plan.estimated_space, 500_000);
    }

    #[test]
    fn test_classification_delete_risk_by_category() {
        let installer = delete_classification("/dl/setup.dmg");
        let mut system = delete_classification("/dl/.DS_Store");
        system.category = Category::System;
        system.reason = "System junk file".to_string();
        let plan = plan_cleanup(&[installer, system], &[], &[], &SafetyPolicy::default());
        assert_eq!(plan.actions.len(), 2);
        assert_eq!(plan.actions[0].risk, RiskLevel::Medium);
        assert_eq!(plan.actions[1].risk, RiskLevel::Low);
    }

    #[test]
    fn test_duplicate_delete_risk_follows_backup_policy() {
        let group = duplicate_group("/d/a.txt", &["/d/b.txt"]);
        let with_backup = plan_cleanup(&[], &[group.clone()], &[], &SafetyPolicy::default());
        assert_eq!(with_backup.actions[0].risk, RiskLevel::Medium);

        let policy = SafetyPolicy {
            backup_before_delete: false,
            ..Default::default()
        };
        let without_backup = plan_cleanup(&[], &[group], &[], &policy);
        assert_eq!(without_backup.actions[0].risk, RiskLevel::High);
        match &without_backup.actions[0].kind {
            ActionKind::Delete { backup, .. } => assert!(!backup),
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_action_ids_unique_and_space_summed() {
        let plan = plan_cleanup(
            &[
                move_classification("/dl/a.pdf", "/sorted/a.pdf"),
                delete_classification("/dl/setup.dmg"),
            ],
            &[duplicate_group("/d/a.txt", &["/d/b.txt", "/d/c.txt"])],
            &[],
            &SafetyPolicy::default(),
        );
        let mut ids: Vec<u64> = plan.actions.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), plan.actions.len());
        // 两个副本 100B + 安装包 4096B；移动与建目录不计
        assert_eq!(plan.estimated_space, 200 + 4096);
        assert!(plan
            .actions
            .iter()
            .all(|a| a.state == ActionState::Proposed));
    }
}
