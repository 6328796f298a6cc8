//! 咨询提示词拼装

use ai_storage_domain::Category;

use crate::llm::AdviceRequest;

/// 组装 (system, user) 提示词对
///
/// system 固定枚举合法类别并要求只回严格 JSON，user 只带文件摘要。
pub fn build_classification_prompt(request: &AdviceRequest) -> (String, String) {
    let labels: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
    let system = format!(
        "You are a file classification assistant. Classify the file into exactly one \
         of these categories: {}. Respond with strict JSON only, no prose, no markdown, \
         in the form {{\"category\": \"<label>\", \"rationale\": \"<one short sentence>\", \
         \"confidence\": <0.0-1.0>}}.",
        labels.join(", ")
    );
    let user = format!(
        "File name: {}\nDirectory: {}\nExtension: {}\nSize: {} bytes",
        request.file_name,
        request.dir_context,
        request.extension.as_deref().unwrap_or("(none)"),
        request.size,
    );
    (system, user)
}
