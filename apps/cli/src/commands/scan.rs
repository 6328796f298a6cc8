//! scan 子命令：统计、大文件、旧文件、重复与开发工件

use crate::commands::{cancel_on_ctrl_c, now_secs, scan_one};
use crate::config::AppConfig;
use crate::output::human_size;
use ai_storage_domain::{ArtifactMatch, DuplicateGroup, ScanResult};
use ai_storage_scanner::{detect_artifacts, find_duplicates};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ScanReport {
    scan: ScanResult,
    artifacts: Vec<ArtifactMatch>,
    duplicates: Vec<DuplicateGroup>,
}

pub async fn run(config: &AppConfig, cli_paths: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let paths = config.resolve_paths(cli_paths);
    anyhow::ensure!(!paths.is_empty(), "no scan paths given (cli or config)");
    let cancel = cancel_on_ctrl_c();

    let mut reports = Vec::new();
    for path in &paths {
        let scan = scan_one(config, path, &cancel).await?;
        let artifacts = detect_artifacts(&scan.root, &config.artifacts, now_secs());
        let duplicates =
            find_duplicates(scan.root.iter_files(), config.scan.min_duplicate_bytes);
        reports.push(ScanReport {
            scan,
            artifacts,
            duplicates,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    for report in &reports {
        print_summary(report);
    }
    Ok(())
}

fn print_summary(report: &ScanReport) {
    let scan = &report.scan;
    println!();
    println!("== {} ==", scan.root.path.display());
    println!(
        "  files: {}  size: {}  scan: {} ms  skipped: {}",
        scan.file_count,
        human_size(scan.total_size),
        scan.scan_time_ms,
        scan.skipped.len()
    );

    if !scan.top_files.is_empty() {
        println!("  largest files:");
        for f in scan.top_files.iter().take(10) {
            println!("    {:>10}  {}", human_size(f.size), f.path.display());
        }
    }
    if !scan.old_files.is_empty() {
        println!("  stale files:");
        for f in scan.old_files.iter().take(10) {
            println!(
                "    {:>5}d  {:>10}  {}",
                f.age_days,
                human_size(f.size),
                f.path.display()
            );
        }
    }
    if !report.artifacts.is_empty() {
        println!("  developer artifacts:");
        for a in &report.artifacts {
            println!(
                "    {:>10}  {}  [{}{}]",
                human_size(a.size_bytes),
                a.path.display(),
                a.kind,
                if a.abandoned { ", abandoned" } else { "" }
            );
        }
    }
    if !report.duplicates.is_empty() {
        let wasted: u64 = report.duplicates.iter().map(|g| g.wasted_bytes()).sum();
        println!(
            "  duplicate groups: {} ({} reclaimable)",
            report.duplicates.len(),
            human_size(wasted)
        );
        for group in report.duplicates.iter().take(5) {
            println!(
                "    {} x {}  keeper: {}",
                group.members.len(),
                human_size(group.size),
                group.keeper().path.display()
            );
        }
    }
}
