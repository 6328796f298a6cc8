//! 外部推理服务客户端（OpenAI 兼容 /chat/completions 接口）
//!
//! 仅供低置信度分类咨询，失败从不影响规则结果的正确性。

use ai_storage_common::{AdvisorConfig, StoragePilotError};
use ai_storage_domain::FileRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::classifier::extension_of;
use crate::prompt;

/// 咨询请求：文件快照的脱敏摘要
#[derive(Debug, Clone, Serialize)]
pub struct AdviceRequest {
    pub path: String,
    pub file_name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// 所在目录名，给模型一点上下文
    pub dir_context: String,
}

impl AdviceRequest {
    pub fn for_record(record: &FileRecord) -> Self {
        let file_name = record.file_name().to_string();
        Self {
            path: record.path.display().to_string(),
            extension: extension_of(&file_name),
            file_name,
            size: record.size,
            dir_context: record
                .path
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        }
    }
}

fn default_advice_confidence() -> f32 {
    0.6
}

/// 推理服务给出的建议
#[derive(Debug, Clone, Deserialize)]
pub struct Advice {
    pub category: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default = "default_advice_confidence")]
    pub confidence: f32,
}

/// 分类咨询接口
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn advise(&self, request: &AdviceRequest) -> Result<Advice, StoragePilotError>;
}

/// OpenAI 兼容接口的 HTTP 客户端（Ollama、OpenAI 等）
pub struct HttpAdvisor {
    client: reqwest::Client,
    config: AdvisorConfig,
}

impl HttpAdvisor {
    pub fn new(config: AdvisorConfig) -> Result<Self, StoragePilotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoragePilotError::Advisor(e.to_string()))?;
        Ok(Self { client, config })
    }
}

/// 容忍 ```json 围栏与少量前后缀文本，取第一个 { 到最后一个 } 之间解析
pub(crate) fn parse_advice(content: &str) -> Result<Advice, StoragePilotError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &content[s..=e],
        _ => {
            return Err(StoragePilotError::Advisor(format!(
                "no JSON object in response: {}",
                content.chars().take(80).collect::<String>()
            )))
        }
    };
    serde_json::from_str(json)
        .map_err(|e| StoragePilotError::Advisor(format!("bad advice JSON: {}", e)))
}

#[async_trait]
impl Advisor for HttpAdvisor {
    async fn advise(&self, request: &AdviceRequest) -> Result<Advice, StoragePilotError> {
        let (system, user) = prompt::build_classification_prompt(request);
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": 0.1,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }
        let response = req
            .send()
            .await
            .map_err(|e| StoragePilotError::Advisor(e.to_string()))?;
        if !response.status().is_success() {
            return Err(StoragePilotError::Advisor(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StoragePilotError::Advisor(e.to_string()))?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                StoragePilotError::Advisor("missing choices[0].message.content".to_string())
            })?;
        parse_advice(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_request_summarizes_record() {
        let record = FileRecord {
            path: PathBuf::from("/home/u/Downloads/dataset_v2.parquet"),
            size: 4096,
            modified: Some(1_700_000_000),
        };
        let req = AdviceRequest::for_record(&record);
        assert_eq!(req.file_name, "dataset_v2.parquet");
        assert_eq!(req.extension.as_deref(), Some(".parquet"));
        assert_eq!(req.dir_context, "Downloads");
        assert_eq!(req.size, 4096);
    }

    #[test]
    fn test_parse_advice_plain_json() {
        let advice = parse_advice(
            r#"{"category": "data", "rationale": "parquet is columnar data", "confidence": 0.9}"#,
        )
        .unwrap();
        assert_eq!(advice.category, "data");
        assert!((advice.confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_advice_fenced_json() {
        let content = "Sure! Here is the classification:\n```json\n{\"category\": \"archive\"}\n```";
        let advice = parse_advice(content).unwrap();
        assert_eq!(advice.category, "archive");
        // 缺省字段取默认值
        assert!((advice.confidence - 0.6).abs() < f32::EPSILON);
        assert!(advice.rationale.is_empty());
    }

    #[test]
    fn test_parse_advice_rejects_prose() {
        assert!(matches!(
            parse_advice("I think this is probably an image."),
            Err(StoragePilotError::Advisor(_))
        ));
    }
}
