// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::AuditResult;
use crate::domain::models::scan_task::ScanTask;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// AI 生成的审计摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[async_trait]
pub trait LLMServiceTrait: Send + Sync {
    async fn summarize_audit(
        &self,
        task: &ScanTask,
        result: &AuditResult,
    ) -> Result<(AuditSummary, TokenUsage)>;
}

/// LLM服务 - 处理与LLM网关的交互
///
/// # 功能
///
/// 调用 OpenAI 兼容的 `chat/completions` 接口，为已完成的审计生成
/// 文字摘要和优化建议
///
/// # 配置
///
/// 通过 `llm` 配置节提供：
/// - `api_key` - API密钥，未配置时调用失败
/// - `model` - 模型名称
/// - `base_url` - API基础URL
pub struct LLMService {
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    client: reqwest::Client,
}

#[async_trait]
impl LLMServiceTrait for LLMService {
    async fn summarize_audit(
        &self,
        task: &ScanTask,
        result: &AuditResult,
    ) -> Result<(AuditSummary, TokenUsage)> {
        LLMService::summarize_audit(self, task, result).await
    }
}

impl LLMService {
    pub fn new_with_config(api_key: Option<String>, model: String, api_base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// 为审计结果生成摘要
    ///
    /// # 参数
    /// * `task` - 已完成的扫描任务
    /// * `result` - 对应的审计结果
    ///
    /// # 错误
    /// * 当LLM API密钥未配置时返回错误
    /// * 当LLM服务调用失败或响应无法解析时返回错误
    pub async fn summarize_audit(
        &self,
        task: &ScanTask,
        result: &AuditResult,
    ) -> Result<(AuditSummary, TokenUsage)> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("LLM API key not configured"))?;

        let prompt = format!(
            "Write a short summary (max 120 words) of this SEO audit and up to 5 concrete \
            recommendations. Respond ONLY with a JSON object of the form \
            {{\"summary\": string, \"recommendations\": [string]}}, no markdown formatting.\n\
            Website: {}\nScores: {}\nIssues: {}\nPages: {}",
            task.url,
            serde_json::to_string(&result.scores)?,
            serde_json::to_string(&result.issues)?,
            serde_json::to_string(&result.page_stats)?,
        );

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an SEO consultant. You output only valid JSON."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": 0.3
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to LLM API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "LLM API returned error: {} - {}",
                status,
                error_text
            ));
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse LLM API response")?;

        let usage = if let Some(usage_val) = body.get("usage") {
            TokenUsage {
                prompt_tokens: usage_val["prompt_tokens"].as_u64().unwrap_or(0) as u32,
                completion_tokens: usage_val["completion_tokens"].as_u64().unwrap_or(0) as u32,
                total_tokens: usage_val["total_tokens"].as_u64().unwrap_or(0) as u32,
            }
        } else {
            TokenUsage::default()
        };

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format from LLM API"))?;

        Ok((parse_summary(content), usage))
    }
}

/// 解析模型输出；非 JSON 输出整体作为摘要
fn parse_summary(content: &str) -> AuditSummary {
    // Clean up potential markdown code blocks
    let clean_content = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str::<AuditSummary>(clean_content).unwrap_or_else(|_| AuditSummary {
        summary: clean_content.to_string(),
        recommendations: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::audit_result::AuditFindings;
    use crate::domain::models::scan_task::ScanOptions;
    use uuid::Uuid;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture() -> (ScanTask, AuditResult) {
        let task = ScanTask::new(
            Uuid::new_v4(),
            "https://acme.test".to_string(),
            ScanOptions::default(),
        );
        let result = AuditResult::from_findings(task.id, AuditFindings::default());
        (task, result)
    }

    #[test]
    fn test_parse_summary_strips_code_fences() {
        let parsed = parse_summary(
            "```json\n{\"summary\": \"Solid site\", \"recommendations\": [\"Add alt text\"]}\n```",
        );
        assert_eq!(parsed.summary, "Solid site");
        assert_eq!(parsed.recommendations, vec!["Add alt text".to_string()]);
    }

    #[test]
    fn test_parse_summary_falls_back_to_plain_text() {
        let parsed = parse_summary("The site is fine.");
        assert_eq!(parsed.summary, "The site is fine.");
        assert!(parsed.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let service = LLMService::new_with_config(
            None,
            "gpt-4o-mini".to_string(),
            "http://127.0.0.1:1".to_string(),
        );
        let (task, result) = fixture();

        let err = service.summarize_audit(&task, &result).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn test_summarize_audit_calls_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "content": "{\"summary\": \"Good\", \"recommendations\": [\"Fix titles\", \"Compress images\"]}"
                    }
                }],
                "usage": {"prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = LLMService::new_with_config(
            Some("secret".to_string()),
            "gpt-4o-mini".to_string(),
            server.uri(),
        );
        let (task, result) = fixture();

        let (summary, usage) = service.summarize_audit(&task, &result).await.unwrap();
        assert_eq!(summary.summary, "Good");
        assert_eq!(summary.recommendations.len(), 2);
        assert_eq!(usage.total_tokens, 120);
    }

    #[tokio::test]
    async fn test_gateway_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let service = LLMService::new_with_config(
            Some("secret".to_string()),
            "gpt-4o-mini".to_string(),
            server.uri(),
        );
        let (task, result) = fixture();

        let err = service.summarize_audit(&task, &result).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
