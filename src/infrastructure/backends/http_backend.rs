// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::AuditApiSettings;
use crate::domain::models::audit_result::AuditFindings;
use crate::domain::models::scan_task::{ScanOptions, ScanSnapshot};
use crate::domain::services::scan_backend::{BackendError, ScanBackend};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// 外部审计任务API后端
///
/// 协议：
/// - `POST {base}/audits` 提交 `{url, options}`，返回 `{task_id}`
/// - `GET {base}/audits/{id}` 返回进度快照
/// - `GET {base}/audits/{id}/result` 返回审计发现
/// - `DELETE {base}/audits/{id}` 取消任务
pub struct HttpScanBackend {
    /// HTTP 客户端
    client: reqwest::Client,
    /// API基础URL，不含结尾斜杠
    base_url: String,
    /// API密钥
    api_key: Option<String>,
}

#[derive(Serialize)]
struct StartAuditRequest<'a> {
    url: &'a str,
    options: &'a ScanOptions,
}

#[derive(Deserialize)]
struct StartAuditResponse {
    #[serde(alias = "id")]
    task_id: String,
}

impl HttpScanBackend {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_settings(settings: &AuditApiSettings) -> Self {
        Self::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))
    }

    async fn api_error(response: Response) -> BackendError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        BackendError::Api { status, message }
    }

    async fn parse_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ScanBackend for HttpScanBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    fn default_poll_interval(&self) -> Duration {
        Duration::from_secs(2)
    }

    async fn start(&self, url: &str, options: &ScanOptions) -> Result<String, BackendError> {
        let response = self
            .send(
                self.client
                    .post(format!("{}/audits", self.base_url))
                    .json(&StartAuditRequest { url, options }),
            )
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected(if message.is_empty() {
                status.to_string()
            } else {
                message
            }));
        }
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        let body: StartAuditResponse = Self::parse_json(response).await?;
        debug!(backend_task_id = %body.task_id, "Audit API accepted scan for {}", url);
        Ok(body.task_id)
    }

    async fn status(&self, backend_task_id: &str) -> Result<ScanSnapshot, BackendError> {
        let response = self
            .send(
                self.client
                    .get(format!("{}/audits/{}", self.base_url, backend_task_id)),
            )
            .await?;

        match response.status() {
            s if s.is_success() => Self::parse_json(response).await,
            StatusCode::NOT_FOUND => Err(BackendError::TaskNotFound(backend_task_id.to_string())),
            _ => Err(Self::api_error(response).await),
        }
    }

    async fn result(&self, backend_task_id: &str) -> Result<AuditFindings, BackendError> {
        let response = self
            .send(self.client.get(format!(
                "{}/audits/{}/result",
                self.base_url, backend_task_id
            )))
            .await?;

        match response.status() {
            s if s.is_success() => Self::parse_json(response).await,
            StatusCode::NOT_FOUND => Err(BackendError::TaskNotFound(backend_task_id.to_string())),
            StatusCode::CONFLICT => {
                Err(BackendError::NotReady(backend_task_id.to_string()))
            }
            _ => Err(Self::api_error(response).await),
        }
    }

    async fn cancel(&self, backend_task_id: &str) -> Result<(), BackendError> {
        let response = self
            .send(
                self.client
                    .delete(format!("{}/audits/{}", self.base_url, backend_task_id)),
            )
            .await?;

        // An already finished or unknown task has nothing left to cancel.
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }
}
