//! 扫描流水线集成测试：在临时目录里搭一个「下载目录 + 项目目录」的典型现场，
//! 依次跑 扫描 → 工件识别 → 重复检测，验证三者在同一棵树上协同工作。
//!
//! 运行：
//!   cargo test -p ai-storage-scanner --test scan_pipeline

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use ai_storage_scanner::{
    detect_artifacts, find_duplicates, scan_path, ArtifactConfig, ScanFilters,
};

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

/// 典型现场：下载目录带一对重复照片，项目目录带 node_modules
fn build_fixture(root: &Path) {
    let downloads = root.join("Downloads");
    write_file(&downloads.join("report.pdf"), b"%PDF-1.4 fake report body");
    // 先写原件再写副本，保证 keeper 永远是 photo.jpg（更旧或路径更短）
    write_file(&downloads.join("photo.jpg"), b"\xff\xd8\xff jpeg body jpeg body");
    write_file(
        &downloads.join("photo_copy.jpg"),
        b"\xff\xd8\xff jpeg body jpeg body",
    );
    write_file(&downloads.join("setup.exe"), b"MZ fake installer payload");

    let proj = root.join("proj");
    write_file(&proj.join("package.json"), b"{\"name\":\"demo\"}");
    write_file(&proj.join("src").join("main.js"), b"console.log('hi')");
    write_file(
        &proj.join("node_modules").join("lodash").join("lodash.js"),
        b"module.exports = {}",
    );
}

fn unix_now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[test]
fn scan_then_detect_artifacts_and_duplicates() {
    let dir = tempfile::tempdir().expect("create temp dir");
    build_fixture(dir.path());

    let result = scan_path(dir.path(), &ScanFilters::default()).unwrap();
    assert_eq!(result.file_count, 7);
    assert!(result.total_size > 0);
    assert!(result.skipped.is_empty());
    assert!(!result.top_files.is_empty());

    // 工件识别：package.json 门控下发现 node_modules；刚写入，不算废弃
    let artifacts = detect_artifacts(&result.root, &ArtifactConfig::default(), unix_now_secs());
    assert_eq!(artifacts.len(), 1);
    let nm = &artifacts[0];
    assert!(nm.path.ends_with("proj/node_modules"));
    assert_eq!(nm.file_count, 1);
    assert!(!nm.abandoned);

    // 重复检测：照片对成组，keeper 是 photo.jpg
    let files: Vec<_> = result.root.iter_files().cloned().collect();
    let groups = find_duplicates(&files, 1);
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.members.len(), 2);
    assert_eq!(
        group.keeper().path.file_name().unwrap().to_string_lossy(),
        "photo.jpg"
    );
}

#[test]
fn exclude_pattern_removes_subtree_from_pipeline() {
    let dir = tempfile::tempdir().expect("create temp dir");
    build_fixture(dir.path());

    let filters = ScanFilters {
        exclude: vec!["node_modules".to_string(), "**/*.exe".to_string()],
        ..Default::default()
    };
    let result = scan_path(dir.path(), &filters).unwrap();
    assert_eq!(result.file_count, 5);

    let paths: Vec<PathBuf> = result.root.iter_files().map(|f| f.path.clone()).collect();
    assert!(paths.iter().all(|p| !p.to_string_lossy().contains("node_modules")));
    assert!(paths.iter().all(|p| p.extension().map_or(true, |e| e != "exe")));

    // 被排除的子树对工件识别也不可见
    let artifacts = detect_artifacts(&result.root, &ArtifactConfig::default(), unix_now_secs());
    assert!(artifacts.is_empty());
}
