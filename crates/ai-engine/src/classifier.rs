//! 规则分类：确定性求值，低置信度结果可选咨询外部推理服务

use ai_storage_domain::{
    ActionHint, Category, Classification, ClassificationSource, FileRecord,
};
use std::path::{Path, PathBuf};

use crate::llm::{AdviceRequest, Advisor};
use crate::rules::{
    RuleTable, CONFIDENCE_KEYWORD, CONFIDENCE_KNOWN_EXT, CONFIDENCE_NAME_PATTERN,
    CONFIDENCE_UNKNOWN,
};

/// 提取小写扩展名（含点）；.tar.gz / .tar.bz2 双后缀特判
pub fn extension_of(file_name: &str) -> Option<String> {
    let lower = file_name.to_lowercase();
    for multi in [".tar.gz", ".tar.bz2"] {
        if lower.ends_with(multi) {
            return Some(multi.to_string());
        }
    }
    Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Unix 秒 → (年, 月) 目录段
fn year_month(modified: Option<u64>) -> Option<(String, String)> {
    let secs = modified?;
    let dt = chrono::DateTime::from_timestamp(secs as i64, 0)?;
    Some((dt.format("%Y").to_string(), dt.format("%m").to_string()))
}

fn determine_action(category: Category, version_suspect: bool) -> ActionHint {
    if version_suspect {
        return ActionHint::Review;
    }
    match category {
        Category::Installer | Category::System => ActionHint::Delete,
        Category::Other => ActionHint::Review,
        _ => ActionHint::Move,
    }
}

/// 组装目标路径：类别根 / 细分（首字母大写） / [照片再按 年/月] / 文件名
///
/// 照片按文件自身修改时间归档，与扫描时刻无关，重跑结果一致。
fn build_destination(
    rules: &RuleTable,
    category: Category,
    subcategory: Option<&str>,
    file_name: &str,
    modified: Option<u64>,
    action: ActionHint,
) -> Option<PathBuf> {
    if action != ActionHint::Move {
        return None;
    }
    let base = rules.destination_for(category)?;
    let mut dest = base.to_path_buf();
    if let Some(sub) = subcategory {
        if sub != "general" {
            dest.push(capitalize(sub));
        }
    }
    if subcategory == Some("photos") {
        if let Some((year, month)) = year_month(modified) {
            dest.push(year);
            dest.push(month);
        }
    }
    dest.push(file_name);
    Some(dest)
}

/// 已经躺在目标位置的文件保持不动
fn keep_if_in_place(record: &FileRecord, destination: Option<&Path>, action: ActionHint) -> ActionHint {
    if destination == Some(record.path.as_path()) {
        ActionHint::Keep
    } else {
        action
    }
}

fn build_reason(category: Category, subcategory: Option<&str>, version_suspect: bool) -> String {
    let mut reasons = vec![format!(
        "Classified as {}/{}",
        category,
        subcategory.unwrap_or("general")
    )];
    if category == Category::Installer {
        reasons.push("Installers can be re-downloaded when needed".to_string());
    }
    if version_suspect {
        reasons.push("Looks like a version copy of another file".to_string());
    }
    reasons.join("; ")
}

/// 规则分类单个文件快照
pub fn classify(record: &FileRecord, rules: &RuleTable) -> Classification {
    let file_name = record.file_name();
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let mut category = Category::Other;
    let mut subcategory: Option<String> = None;
    let mut confidence = CONFIDENCE_UNKNOWN;

    if let Some((cat, sub)) = extension_of(file_name)
        .as_deref()
        .and_then(|e| rules.lookup_extension(e))
    {
        category = cat;
        subcategory = sub.map(|s| s.to_string());
        confidence = CONFIDENCE_KNOWN_EXT;
    }

    if RuleTable::is_system_name(file_name) {
        category = Category::System;
        subcategory = None;
        confidence = CONFIDENCE_KNOWN_EXT;
    } else if rules.is_screenshot(file_name) {
        category = Category::Image;
        subcategory = Some("screenshots".to_string());
        confidence = CONFIDENCE_NAME_PATTERN;
    } else if rules.is_photo(file_name) {
        category = Category::Image;
        subcategory = Some("photos".to_string());
        confidence = CONFIDENCE_NAME_PATTERN;
    } else if category == Category::Document {
        if let Some(sub) = RuleTable::keyword_subcategory(file_name) {
            subcategory = Some(sub.to_string());
            confidence = CONFIDENCE_KEYWORD;
        }
    }

    let version_suspect = rules.is_version_suspect(stem);
    let action = determine_action(category, version_suspect);
    let destination = build_destination(
        rules,
        category,
        subcategory.as_deref(),
        file_name,
        record.modified,
        action,
    );
    let action = keep_if_in_place(record, destination.as_deref(), action);
    let reason = build_reason(category, subcategory.as_deref(), version_suspect);

    Classification {
        path: record.path.clone(),
        size: record.size,
        category,
        subcategory,
        confidence,
        destination,
        action,
        reason,
        source: ClassificationSource::Rule,
    }
}

/// 分类入口：规则优先；置信度低于阈值且配置了推理服务时咨询一次
///
/// 咨询仅为建议，失败、超时或响应不合法一律回退规则结果并标记降级。
pub async fn classify_with_advisor(
    record: &FileRecord,
    rules: &RuleTable,
    advisor: Option<&dyn Advisor>,
) -> Classification {
    let mut base = classify(record, rules);
    let advisor = match advisor {
        Some(a) if base.confidence < rules.advisor_threshold => a,
        _ => return base,
    };

    let request = AdviceRequest::for_record(record);
    match advisor.advise(&request).await {
        Ok(advice) => match Category::parse_label(&advice.category) {
            Some(category) => {
                let action = determine_action(category, false);
                let subcategory = if category == base.category {
                    base.subcategory.clone()
                } else {
                    None
                };
                let destination = build_destination(
                    rules,
                    category,
                    subcategory.as_deref(),
                    record.file_name(),
                    record.modified,
                    action,
                );
                let action = keep_if_in_place(record, destination.as_deref(), action);
                base.category = category;
                base.subcategory = subcategory;
                base.confidence = advice.confidence.clamp(0.0, 1.0);
                base.destination = destination;
                base.action = action;
                base.reason = advice.rationale;
                base.source = ClassificationSource::Advisor;
                base
            }
            None => {
                log::warn!(
                    "advisor returned unknown category '{}' for {}",
                    advice.category,
                    record.path.display()
                );
                base.source = ClassificationSource::AdvisorFallback;
                base
            }
        },
        Err(e) => {
            log::warn!("advisor failed for {}: {}", record.path.display(), e);
            base.source = ClassificationSource::AdvisorFallback;
            base
        }
    }
}
