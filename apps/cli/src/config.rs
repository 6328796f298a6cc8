//! 应用配置：TOML 文件叠加内置缺省，路径里的 ~ 展开为家目录

use ai_storage_common::{AdvisorConfig, SafetyPolicy};
use ai_storage_engine::ClassifyConfig;
use ai_storage_scanner::{ArtifactConfig, ScanFilters};
use anyhow::Context;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 未显式给路径时扫描的目录
    pub scan_paths: Vec<PathBuf>,
    pub scan: ScanFilters,
    pub artifacts: ArtifactConfig,
    pub classify: ClassifyConfig,
    pub safety: SafetyPolicy,
    /// 不配置就纯走规则，不发任何网络请求
    pub advisor: Option<AdvisorConfig>,
    /// 审计日志位置
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_paths: vec![PathBuf::from("~/Downloads"), PathBuf::from("~/Desktop")],
            scan: ScanFilters::default(),
            artifacts: ArtifactConfig::default(),
            classify: ClassifyConfig::default(),
            safety: SafetyPolicy::default(),
            advisor: None,
            log_file: default_data_file("actions.log"),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "ai-storage-pilot")
}

fn default_data_file(name: &str) -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(name),
        None => PathBuf::from(name),
    }
}

pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// ~ 与 ~/ 前缀展开为家目录；其余原样返回
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if s == "~" {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().to_path_buf();
        }
    } else if let Some(rest) = s.strip_prefix("~/") {
        if let Some(base) = BaseDirs::new() {
            return base.home_dir().join(rest);
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// 读取配置：显式路径 > 默认位置 > 内置缺省
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::parse_file(path)?,
            None => match default_config_file().filter(|p| p.exists()) {
                Some(path) => Self::parse_file(&path)?,
                None => Self::default(),
            },
        };
        config.normalize();
        Ok(config)
    }

    fn parse_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// 展开家目录；相对的备份目录钉在数据目录下
    fn normalize(&mut self) {
        for path in &mut self.scan_paths {
            *path = expand_tilde(path);
        }
        for path in &mut self.safety.protected_paths {
            *path = expand_tilde(path);
        }
        self.safety.backup_dir = expand_tilde(&self.safety.backup_dir);
        if self.safety.backup_dir.is_relative() {
            self.safety.backup_dir =
                default_data_file(&self.safety.backup_dir.to_string_lossy());
        }
        self.log_file = expand_tilde(&self.log_file);
        if self.log_file.is_relative() {
            self.log_file = default_data_file(&self.log_file.to_string_lossy());
        }
    }

    /// 命令行给了路径就用命令行的
    pub fn resolve_paths(&self, cli_paths: &[PathBuf]) -> Vec<PathBuf> {
        if cli_paths.is_empty() {
            self.scan_paths.clone()
        } else {
            cli_paths.iter().map(|p| expand_tilde(p)).collect()
        }
    }
}
