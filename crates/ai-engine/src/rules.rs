//! 分类规则表：扩展名表、文件名模式与文档关键词，按固定顺序求值

use ai_storage_common::StoragePilotError;
use ai_storage_domain::Category;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 文件名模式命中（截图、相机照片）
pub const CONFIDENCE_NAME_PATTERN: f32 = 0.95;
/// 已知扩展名命中
pub const CONFIDENCE_KNOWN_EXT: f32 = 0.9;
/// 文档关键词细分
pub const CONFIDENCE_KEYWORD: f32 = 0.85;
/// 未识别
pub const CONFIDENCE_UNKNOWN: f32 = 0.3;
/// 低于该置信度才咨询外部推理服务
pub const DEFAULT_ADVISOR_THRESHOLD: f32 = 0.5;

/// 扩展名 → (类别, 细分)；含点、小写
const EXT_TABLE: &[(&str, Category, &str)] = &[
    (".pdf", Category::Document, "general"),
    (".doc", Category::Document, "word"),
    (".docx", Category::Document, "word"),
    (".txt", Category::Document, "text"),
    (".md", Category::Document, "markdown"),
    (".rtf", Category::Document, "text"),
    (".odt", Category::Document, "text"),
    (".xls", Category::Document, "spreadsheet"),
    (".xlsx", Category::Document, "spreadsheet"),
    (".ppt", Category::Document, "presentation"),
    (".pptx", Category::Document, "presentation"),
    (".jpg", Category::Image, "photo"),
    (".jpeg", Category::Image, "photo"),
    (".png", Category::Image, "graphic"),
    (".gif", Category::Image, "animated"),
    (".webp", Category::Image, "web"),
    (".svg", Category::Image, "vector"),
    (".bmp", Category::Image, "bitmap"),
    (".ico", Category::Image, "icon"),
    (".heic", Category::Image, "photo"),
    (".mp4", Category::Video, "general"),
    (".mov", Category::Video, "general"),
    (".avi", Category::Video, "general"),
    (".mkv", Category::Video, "general"),
    (".wmv", Category::Video, "general"),
    (".webm", Category::Video, "web"),
    (".mp3", Category::Audio, "music"),
    (".wav", Category::Audio, "raw"),
    (".flac", Category::Audio, "lossless"),
    (".aac", Category::Audio, "music"),
    (".ogg", Category::Audio, "music"),
    (".m4a", Category::Audio, "music"),
    (".py", Category::Code, "python"),
    (".js", Category::Code, "javascript"),
    (".ts", Category::Code, "typescript"),
    (".java", Category::Code, "java"),
    (".go", Category::Code, "golang"),
    (".rs", Category::Code, "rust"),
    (".cpp", Category::Code, "cpp"),
    (".c", Category::Code, "c"),
    (".h", Category::Code, "header"),
    (".rb", Category::Code, "ruby"),
    (".php", Category::Code, "php"),
    (".swift", Category::Code, "swift"),
    (".kt", Category::Code, "kotlin"),
    (".sh", Category::Code, "shell"),
    (".sql", Category::Code, "sql"),
    (".html", Category::Code, "web"),
    (".css", Category::Code, "web"),
    (".csv", Category::Data, "tabular"),
    (".json", Category::Data, "json"),
    (".xml", Category::Data, "xml"),
    (".yaml", Category::Data, "yaml"),
    (".yml", Category::Data, "yaml"),
    (".toml", Category::Data, "config"),
    (".ini", Category::Data, "config"),
    (".db", Category::Data, "database"),
    (".sqlite", Category::Data, "database"),
    (".h5", Category::Model, "keras"),
    (".pt", Category::Model, "pytorch"),
    (".pth", Category::Model, "pytorch"),
    (".onnx", Category::Model, "onnx"),
    (".pkl", Category::Model, "pickle"),
    (".safetensors", Category::Model, "safetensors"),
    (".ckpt", Category::Model, "checkpoint"),
    (".zip", Category::Archive, "zip"),
    (".tar", Category::Archive, "tar"),
    (".gz", Category::Archive, "gzip"),
    (".tar.gz", Category::Archive, "targz"),
    (".tgz", Category::Archive, "targz"),
    (".tar.bz2", Category::Archive, "bzip2"),
    (".rar", Category::Archive, "rar"),
    (".7z", Category::Archive, "7zip"),
    (".bz2", Category::Archive, "bzip2"),
    (".dmg", Category::Installer, "macos"),
    (".pkg", Category::Installer, "macos"),
    (".exe", Category::Installer, "windows"),
    (".msi", Category::Installer, "windows"),
    (".deb", Category::Installer, "linux"),
    (".rpm", Category::Installer, "linux"),
    (".appimage", Category::Installer, "linux"),
    (".log", Category::System, "logs"),
    (".tmp", Category::System, "temp"),
    (".bak", Category::System, "backup"),
    (".swp", Category::System, "swap"),
];

/// 无扩展名但含义明确的系统文件名
const SYSTEM_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// 截图类文件名模式（多语言）
const SCREENSHOT_PATTERNS: &[&str] = &[
    "^Screenshot",
    "^Screen Shot",
    "^Capture",
    "^Schermata",
    "^Captura",
    "^Bildschirmfoto",
];

/// 相机照片文件名模式
const PHOTO_PATTERNS: &[&str] = &[
    r"^IMG_\d+",
    r"^DSC_\d+",
    r"^DCIM",
    r"^Photo_\d+",
    r"^PXL_\d+",
    r"^\d{8}_\d{6}",
];

/// 版本副本嫌疑的文件名主干模式
const VERSION_PATTERNS: &[&str] = &[
    r"^(.+)_v\d+$",
    r"^(.+)_version\d+$",
    r"^(.+)_final$",
    r"^(.+)_copy$",
    r"^(.+)\s*\(\d+\)$",
    r"^(.+)_\d{8}$",
];

/// 文档文件名关键词 → 细分类别；按表序求值，先命中先生效
const DOCUMENT_KEYWORDS: &[(&str, &str)] = &[
    ("invoice", "invoices"),
    ("receipt", "receipts"),
    ("bill", "bills"),
    ("payment", "payments"),
    ("tax", "tax"),
    ("w2", "tax"),
    ("1099", "tax"),
    ("contract", "contracts"),
    ("agreement", "agreements"),
    ("nda", "nda"),
    ("resume", "resumes"),
    ("cv", "resumes"),
    ("cover_letter", "cover_letters"),
    ("meeting", "meetings"),
    ("notes", "notes"),
    ("presentation", "presentations"),
    ("report", "reports"),
    ("proposal", "proposals"),
];

const DEFAULT_DESTINATIONS: &[(Category, &str)] = &[
    (Category::Document, "~/Documents/Sorted"),
    (Category::Image, "~/Pictures/Sorted"),
    (Category::Video, "~/Videos/Sorted"),
    (Category::Audio, "~/Music/Sorted"),
    (Category::Code, "~/workspace/code_downloads"),
    (Category::Data, "~/workspace/data"),
    (Category::Model, "~/workspace/models"),
    (Category::Archive, "~/Downloads/Archives"),
];

/// 外部装载的分类配置（核心不解析配置文件语法）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// 覆盖类别目标根目录，键为类别标签（document、image……）
    pub destinations: HashMap<String, PathBuf>,
    /// 追加扩展名规则，优先于内置表求值
    pub extra_extensions: Vec<ExtRule>,
    /// 低于该置信度才咨询外部推理服务
    pub advisor_threshold: f32,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            destinations: HashMap::new(),
            extra_extensions: Vec::new(),
            advisor_threshold: DEFAULT_ADVISOR_THRESHOLD,
        }
    }
}

/// 追加的扩展名规则
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtRule {
    /// 含点，如 ".parquet"
    pub ext: String,
    pub category: Category,
    #[serde(default)]
    pub subcategory: Option<String>,
}

/// 编译后的规则表：顺序即优先级，同一输入永远得到同一结果
pub struct RuleTable {
    screenshot_patterns: Vec<Regex>,
    photo_patterns: Vec<Regex>,
    version_patterns: Vec<Regex>,
    extra_extensions: Vec<ExtRule>,
    destinations: HashMap<Category, PathBuf>,
    pub advisor_threshold: f32,
}

fn compile_patterns(patterns: &[&str]) -> Result<Vec<Regex>, StoragePilotError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("(?i){}", p))
                .map_err(|e| StoragePilotError::Config(format!("invalid pattern '{}': {}", p, e)))
        })
        .collect()
}

impl RuleTable {
    /// 用内置表与外部配置编译规则；未知类别标签报配置错误
    pub fn compile(config: &ClassifyConfig) -> Result<Self, StoragePilotError> {
        let mut destinations: HashMap<Category, PathBuf> = DEFAULT_DESTINATIONS
            .iter()
            .map(|(c, p)| (*c, PathBuf::from(p)))
            .collect();
        for (label, path) in &config.destinations {
            let category = Category::parse_label(label).ok_or_else(|| {
                StoragePilotError::Config(format!("unknown category label '{}'", label))
            })?;
            destinations.insert(category, path.clone());
        }
        Ok(Self {
            screenshot_patterns: compile_patterns(SCREENSHOT_PATTERNS)?,
            photo_patterns: compile_patterns(PHOTO_PATTERNS)?,
            version_patterns: compile_patterns(VERSION_PATTERNS)?,
            extra_extensions: config.extra_extensions.clone(),
            destinations,
            advisor_threshold: config.advisor_threshold,
        })
    }

    /// 查内置默认规则表
    pub fn default_rules() -> Result<Self, StoragePilotError> {
        Self::compile(&ClassifyConfig::default())
    }

    /// 扩展名查表；外部追加规则优先
    pub fn lookup_extension(&self, ext: &str) -> Option<(Category, Option<&str>)> {
        if let Some(rule) = self.extra_extensions.iter().find(|r| r.ext == ext) {
            return Some((rule.category, rule.subcategory.as_deref()));
        }
        EXT_TABLE
            .iter()
            .find(|(e, _, _)| *e == ext)
            .map(|(_, c, s)| (*c, if s.is_empty() { None } else { Some(*s) }))
    }

    pub fn is_screenshot(&self, file_name: &str) -> bool {
        self.screenshot_patterns.iter().any(|p| p.is_match(file_name))
    }

    pub fn is_photo(&self, file_name: &str) -> bool {
        self.photo_patterns.iter().any(|p| p.is_match(file_name))
    }

    /// 文件名主干是否匹配版本副本模式（file_v2、report_final、doc (1) 等）
    pub fn is_version_suspect(&self, stem: &str) -> bool {
        self.version_patterns.iter().any(|p| p.is_match(stem))
    }

    pub fn is_system_name(file_name: &str) -> bool {
        SYSTEM_NAMES.iter().any(|s| s.eq_ignore_ascii_case(file_name))
    }

    /// 文件名里的文档关键词 → 细分类别
    pub fn keyword_subcategory(file_name: &str) -> Option<&'static str> {
        let lower = file_name.to_lowercase();
        DOCUMENT_KEYWORDS
            .iter()
            .find(|(kw, _)| lower.contains(kw))
            .map(|(_, sub)| *sub)
    }

    /// 类别的目标根目录；Installer/System/Other 没有去向
    pub fn destination_for(&self, category: Category) -> Option<&Path> {
        self.destinations.get(&category).map(|p| p.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_compiles() {
        let rules = RuleTable::default_rules().unwrap();
        assert_eq!(
            rules.lookup_extension(".pdf"),
            Some((Category::Document, Some("general")))
        );
        assert_eq!(
            rules.lookup_extension(".tar.gz"),
            Some((Category::Archive, Some("targz")))
        );
        assert_eq!(rules.lookup_extension(".nope"), None);
    }

    #[test]
    fn test_extra_extension_wins_over_builtin() {
        let config = ClassifyConfig {
            extra_extensions: vec![ExtRule {
                ext: ".pdf".to_string(),
                category: Category::Data,
                subcategory: Some("scanned".to_string()),
            }],
            ..Default::default()
        };
        let rules = RuleTable::compile(&config).unwrap();
        assert_eq!(
            rules.lookup_extension(".pdf"),
            Some((Category::Data, Some("scanned")))
        );
    }

    #[test]
    fn test_name_patterns_case_insensitive() {
        let rules = RuleTable::default_rules().unwrap();
        assert!(rules.is_screenshot("Screenshot 2024-01-15 at 10.30.00.png"));
        assert!(rules.is_screenshot("bildschirmfoto 2024.png"));
        assert!(rules.is_photo("IMG_1234.jpg"));
        assert!(rules.is_photo("20240115_093000.jpg"));
        assert!(!rules.is_photo("holiday.jpg"));
    }

    #[test]
    fn test_version_patterns_match_stems() {
        let rules = RuleTable::default_rules().unwrap();
        assert!(rules.is_version_suspect("report_v2"));
        assert!(rules.is_version_suspect("thesis_final"));
        assert!(rules.is_version_suspect("photo (3)"));
        assert!(rules.is_version_suspect("notes_20240115"));
        assert!(!rules.is_version_suspect("plain_report"));
    }

    #[test]
    fn test_keyword_subcategory() {
        assert_eq!(
            RuleTable::keyword_subcategory("Invoice-March.pdf"),
            Some("invoices")
        );
        assert_eq!(
            RuleTable::keyword_subcategory("Rental_Agreement_2023.pdf"),
            Some("agreements")
        );
        assert_eq!(RuleTable::keyword_subcategory("holiday-plan.pdf"), None);
    }

    #[test]
    fn test_destination_override_and_unknown_label() {
        let mut config = ClassifyConfig::default();
        config
            .destinations
            .insert("image".to_string(), PathBuf::from("/srv/pictures"));
        let rules = RuleTable::compile(&config).unwrap();
        assert_eq!(
            rules.destination_for(Category::Image),
            Some(Path::new("/srv/pictures"))
        );
        assert!(rules.destination_for(Category::Installer).is_none());

        config
            .destinations
            .insert("banana".to_string(), PathBuf::from("/x"));
        assert!(matches!(
            RuleTable::compile(&config),
            Err(StoragePilotError::Config(_))
        ));
    }
}
