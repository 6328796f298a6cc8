//! 开发工件识别：依赖缓存、虚拟环境、构建产物等可再生目录

use ai_storage_domain::{ArtifactKind, ArtifactMatch, DirectoryNode};
use serde::{Deserialize, Serialize};

const SECS_PER_DAY: u64 = 86_400;

/// 工件「废弃」判定阈值默认值（天）
pub const DEFAULT_STALE_AFTER_DAYS: u64 = 365;

/// 工件目录模式：目录名精确匹配，可选项目标记文件门控
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPattern {
    /// 目录名（精确匹配）
    pub dir_name: String,
    pub kind: ArtifactKind,
    /// 所属项目根目录下需存在其中之一的标记文件（如 package.json）；
    /// 空表示目录名本身已足够明确，不做门控
    #[serde(default)]
    pub markers: Vec<String>,
    /// 清理后的再生成命令
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regenerate: Option<String>,
}

impl ArtifactPattern {
    fn new(dir_name: &str, kind: ArtifactKind, markers: &[&str], regenerate: Option<&str>) -> Self {
        Self {
            dir_name: dir_name.to_string(),
            kind,
            markers: markers.iter().map(|m| m.to_string()).collect(),
            regenerate: regenerate.map(|r| r.to_string()),
        }
    }
}

/// 工件识别配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// 子树与项目根均超过该天数无修改才判定废弃
    pub stale_after_days: u64,
    pub patterns: Vec<ArtifactPattern>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
            patterns: default_patterns(),
        }
    }
}

/// 内置模式表，覆盖常见工具链的约定目录名
pub fn default_patterns() -> Vec<ArtifactPattern> {
    vec![
        ArtifactPattern::new(
            "node_modules",
            ArtifactKind::DependencyCache,
            &["package.json"],
            Some("npm install"),
        ),
        ArtifactPattern::new(".venv", ArtifactKind::VirtualEnv, &[], Some("python -m venv .venv")),
        ArtifactPattern::new("venv", ArtifactKind::VirtualEnv, &[], Some("python -m venv venv")),
        ArtifactPattern::new("__pycache__", ArtifactKind::BuildOutput, &[], None),
        ArtifactPattern::new(
            "target",
            ArtifactKind::BuildOutput,
            &["Cargo.toml"],
            Some("cargo build"),
        ),
        ArtifactPattern::new(
            "build",
            ArtifactKind::BuildOutput,
            &["CMakeLists.txt", "package.json", "setup.py", "gradlew", "Makefile"],
            None,
        ),
        ArtifactPattern::new(
            "dist",
            ArtifactKind::BuildOutput,
            &["package.json", "setup.py", "pyproject.toml"],
            None,
        ),
        ArtifactPattern::new(".docker", ArtifactKind::ContainerCache, &[], None),
    ]
}

fn match_by_name<'a>(patterns: &'a [ArtifactPattern], name: &str) -> Option<&'a ArtifactPattern> {
    patterns.iter().find(|p| p.dir_name == name)
}

/// 项目根目录下是否存在任一标记文件；空标记表不做门控
fn markers_present(project_root: &DirectoryNode, markers: &[String]) -> bool {
    markers.is_empty()
        || markers
            .iter()
            .any(|m| project_root.files.iter().any(|f| f.file_name() == m))
}

fn is_stale(newest_modified: Option<u64>, now_secs: u64, stale_secs: u64) -> bool {
    match newest_modified {
        Some(t) => now_secs.saturating_sub(t) > stale_secs,
        None => true,
    }
}

/// 项目根在工件子树之外是否有近期活动
fn project_recently_active(
    project_root: &DirectoryNode,
    artifact: &DirectoryNode,
    now_secs: u64,
    stale_secs: u64,
) -> bool {
    let own_files = project_root.files.iter().filter_map(|f| f.modified).max();
    let siblings = project_root
        .dirs
        .iter()
        .filter(|d| d.path != artifact.path)
        .filter_map(|d| d.newest_modified)
        .max();
    let newest_outside = match (own_files, siblings) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    };
    !is_stale(newest_outside, now_secs, stale_secs)
}

fn build_match(
    dir: &DirectoryNode,
    pattern: &ArtifactPattern,
    project_root: Option<&DirectoryNode>,
    config: &ArtifactConfig,
    now_secs: u64,
) -> ArtifactMatch {
    let stale_secs = config.stale_after_days * SECS_PER_DAY;
    let subtree_stale = is_stale(dir.newest_modified, now_secs, stale_secs);
    let project_active = project_root
        .map_or(false, |p| project_recently_active(p, dir, now_secs, stale_secs));
    ArtifactMatch {
        path: dir.path.clone(),
        kind: pattern.kind,
        size_bytes: dir.size,
        file_count: dir.file_count(),
        newest_modified: dir.newest_modified,
        abandoned: subtree_stale && !project_active,
        regenerate: pattern.regenerate.clone(),
    }
}

fn walk(
    node: &DirectoryNode,
    config: &ArtifactConfig,
    now_secs: u64,
    out: &mut Vec<ArtifactMatch>,
) {
    for dir in &node.dirs {
        if let Some(pattern) = match_by_name(&config.patterns, &dir.name) {
            if markers_present(node, &pattern.markers) {
                // 嵌套工件只报最外层，可回收空间不重复计入
                out.push(build_match(dir, pattern, Some(node), config, now_secs));
                continue;
            }
        }
        walk(dir, config, now_secs, out);
    }
}

/// 在完整目录树上识别工件，按估算大小降序返回
pub fn detect_artifacts(
    root: &DirectoryNode,
    config: &ArtifactConfig,
    now_secs: u64,
) -> Vec<ArtifactMatch> {
    let mut matches = Vec::new();
    // 根目录本身就是工件的情形（直接扫描 node_modules）；没有项目上下文，不做门控
    if let Some(pattern) = match_by_name(&config.patterns, &root.name) {
        matches.push(build_match(root, pattern, None, config, now_secs));
        return matches;
    }
    walk(root, config, now_secs, &mut matches);
    matches.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then_with(|| a.path.cmp(&b.path)));
    matches
}
