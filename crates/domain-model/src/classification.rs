use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 文件语义类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Document,
    Image,
    Video,
    Audio,
    Code,
    Data,
    Model,
    Archive,
    Installer,
    System,
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Document,
        Category::Image,
        Category::Video,
        Category::Audio,
        Category::Code,
        Category::Data,
        Category::Model,
        Category::Archive,
        Category::Installer,
        Category::System,
        Category::Other,
    ];

    /// 解析外部标签（容忍大小写与复数形式）；未知标签返回 None
    pub fn parse_label(label: &str) -> Option<Category> {
        let normalized = label.trim().to_lowercase();
        let normalized = normalized.strip_suffix('s').unwrap_or(&normalized);
        match normalized {
            "document" => Some(Category::Document),
            "image" => Some(Category::Image),
            "video" => Some(Category::Video),
            "audio" => Some(Category::Audio),
            "code" => Some(Category::Code),
            "data" => Some(Category::Data),
            "model" => Some(Category::Model),
            "archive" => Some(Category::Archive),
            "installer" => Some(Category::Installer),
            "system" => Some(Category::System),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Document => "document",
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Code => "code",
            Category::Data => "data",
            Category::Model => "model",
            Category::Archive => "archive",
            Category::Installer => "installer",
            Category::System => "system",
            Category::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// 分类给出的建议动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionHint {
    Move,
    Delete,
    Review,
    Keep,
}

/// 分类结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// 规则表命中
    Rule,
    /// 外部推理服务给出
    Advisor,
    /// 推理服务失败或响应不合法，回退到规则结果
    AdvisorFallback,
}

/// 分类结果：绑定文件与类别、置信度与建议去向，不修改文件快照本身
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub path: PathBuf,
    pub size: u64,
    pub category: Category,
    /// 细分类别（如 screenshots、invoices）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// 有界标量 [0, 1]，只用于排序与阈值判断，不是概率
    pub confidence: f32,
    /// 建议移动到的完整目标路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    pub action: ActionHint,
    /// 人类可读的分类依据
    pub reason: String,
    pub source: ClassificationSource,
}
