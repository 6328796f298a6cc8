use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 推理服务请求超时默认值（秒）
pub const DEFAULT_ADVISOR_TIMEOUT_SECS: u64 = 10;

/// 安全策略：进程启动时构造一次，执行期间只读
///
/// dry-run 与备份默认开启，真实落盘必须显式关闭 dry_run。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyPolicy {
    /// 只记录、不变更文件系统
    pub dry_run: bool,
    /// 动作需外部确认后才能执行
    pub require_approval: bool,
    /// 删除前先复制到备份目录，备份失败则删除不执行
    pub backup_before_delete: bool,
    /// 受保护路径前缀，命中的动作在规划期被拒绝
    pub protected_paths: Vec<PathBuf>,
    /// 备份目录（相对路径由外层装载器解析为绝对路径）
    pub backup_dir: PathBuf,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            dry_run: true,
            require_approval: true,
            backup_before_delete: true,
            protected_paths: Vec::new(),
            backup_dir: PathBuf::from(".storage-pilot-backup"),
        }
    }
}

impl SafetyPolicy {
    /// 路径是否落在某个受保护前缀之下（按路径组件比较，非字符串前缀）
    pub fn is_protected(&self, path: &Path) -> bool {
        self.protected_paths.iter().any(|p| path.starts_with(p))
    }
}

/// 外部推理服务配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// 服务地址，含 /v1 前缀
    pub base_url: String,
    pub model: String,
    /// 可选鉴权密钥；本地服务通常不需要
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "qwen2.5:0.5b".to_string(),
            api_key: None,
            timeout_secs: DEFAULT_ADVISOR_TIMEOUT_SECS,
        }
    }
}
