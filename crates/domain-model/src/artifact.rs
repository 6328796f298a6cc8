use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 开发工件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// 依赖缓存（node_modules 等）
    DependencyCache,
    /// Python 虚拟环境（.venv、venv）
    VirtualEnv,
    /// 构建产物（target、build、dist、__pycache__）
    BuildOutput,
    /// 容器镜像与层缓存
    ContainerCache,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArtifactKind::DependencyCache => "dependency-cache",
            ArtifactKind::VirtualEnv => "virtual-env",
            ArtifactKind::BuildOutput => "build-output",
            ArtifactKind::ContainerCache => "container-cache",
        };
        write!(f, "{}", label)
    }
}

/// 工件匹配结果：在完整目录树上判定，之后只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMatch {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    /// 估算可回收大小（整棵子树）
    pub size_bytes: u64,
    pub file_count: u64,
    /// 子树内最近修改时间（Unix 秒）
    #[serde(default)]
    pub newest_modified: Option<u64>,
    /// 是否废弃：子树与所属项目根目录均超过阈值无修改
    pub abandoned: bool,
    /// 清理后的再生成命令（如 npm install）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regenerate: Option<String>,
}
