//! plan 子命令：分类 + 重复 + 工件 → 清理计划（只读）

use crate::commands::{cancel_on_ctrl_c, now_secs, scan_one};
use crate::config::{expand_tilde, AppConfig};
use crate::output::{describe_action, human_size};
use ai_storage_common::CancelFlag;
use ai_storage_domain::{Classification, CleanupPlan, PlanningConflict};
use ai_storage_engine::{classify_with_advisor, plan_cleanup, Advisor, HttpAdvisor, RuleTable};
use ai_storage_scanner::{detect_artifacts, find_duplicates};
use std::path::PathBuf;

pub async fn run(config: &AppConfig, cli_paths: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let plan = build_plan(config, cli_paths, &cancel_on_ctrl_c()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    print_plan(&plan);
    Ok(())
}

/// 扫描、分类并编排计划；plan 与 apply 共用
///
/// 只分类扫描根的直接文件，子目录视为用户已组织好的内容；
/// 重复与工件检测仍覆盖整棵树。
pub(crate) async fn build_plan(
    config: &AppConfig,
    cli_paths: &[PathBuf],
    cancel: &CancelFlag,
) -> anyhow::Result<CleanupPlan> {
    let paths = config.resolve_paths(cli_paths);
    anyhow::ensure!(!paths.is_empty(), "no scan paths given (cli or config)");

    let rules = RuleTable::compile(&config.classify)?;
    let advisor: Option<HttpAdvisor> = match &config.advisor {
        Some(cfg) => Some(HttpAdvisor::new(cfg.clone())?),
        None => None,
    };

    let mut classifications: Vec<Classification> = Vec::new();
    let mut all_duplicates = Vec::new();
    let mut all_artifacts = Vec::new();

    for path in &paths {
        let scan = scan_one(config, path, cancel).await?;
        all_artifacts.extend(detect_artifacts(&scan.root, &config.artifacts, now_secs()));
        all_duplicates.extend(find_duplicates(
            scan.root.iter_files(),
            config.scan.min_duplicate_bytes,
        ));

        for record in &scan.root.files {
            let advisor_ref = advisor.as_ref().map(|a| a as &dyn Advisor);
            let mut classification = classify_with_advisor(record, &rules, advisor_ref).await;
            // 规则表里的去向可能带 ~，落成动作前展开
            if let Some(dest) = &classification.destination {
                classification.destination = Some(expand_tilde(dest));
            }
            classifications.push(classification);
        }
    }

    Ok(plan_cleanup(
        &classifications,
        &all_duplicates,
        &all_artifacts,
        &config.safety,
    ))
}

fn print_plan(plan: &CleanupPlan) {
    if plan.actions.is_empty() && plan.review.is_empty() && plan.rejected.is_empty() {
        println!("nothing to do");
        return;
    }
    println!();
    println!("planned actions ({}):", plan.actions.len());
    for item in &plan.actions {
        println!(
            "  #{:<4} [{:>6}] {:>10}  {}",
            item.id,
            item.risk,
            human_size(item.size_bytes),
            describe_action(item)
        );
        println!("        {}", item.reason);
    }
    if !plan.review.is_empty() {
        println!();
        println!("needs review ({}):", plan.review.len());
        for item in &plan.review {
            println!(
                "  {:>3.0}%  {}  ({})",
                item.confidence * 100.0,
                item.path.display(),
                item.reason
            );
        }
    }
    if !plan.rejected.is_empty() {
        println!();
        println!("rejected at planning ({}):", plan.rejected.len());
        for rejected in &plan.rejected {
            let why = match &rejected.conflict {
                PlanningConflict::DestinationCollision {
                    destination,
                    winner_id,
                } => format!(
                    "destination {} already claimed by #{}",
                    destination.display(),
                    winner_id
                ),
                PlanningConflict::ProtectedPath { prefix } => {
                    format!("under protected prefix {}", prefix.display())
                }
            };
            println!("  {}: {}", rejected.kind.source().display(), why);
        }
    }
    println!();
    println!(
        "estimated reclaimable space: {}",
        human_size(plan.estimated_space)
    );
}
