// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::AuditFindings;
use crate::domain::models::scan_task::{ScanOptions, ScanSnapshot};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 扫描后端错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// 网络错误（连接失败、超时等）
    #[error("Network error: {0}")]
    Network(String),
    /// 远端 API 返回非成功状态码
    #[error("Audit API returned {status}: {message}")]
    Api { status: u16, message: String },
    /// 远端任务不存在
    #[error("Scan task {0} not found")]
    TaskNotFound(String),
    /// 远端响应无法解析
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// 后端拒绝了扫描请求
    #[error("Scan rejected: {0}")]
    Rejected(String),
    /// 扫描尚未完成，结果不可用
    #[error("Scan {0} has not finished yet")]
    NotReady(String),
}

/// 扫描后端特质
///
/// 所有扫描实现（外部审计 API、模拟爬虫、站点爬虫）都通过该接口接入扫描跟踪器。
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// 后端名称，用于日志
    fn name(&self) -> &'static str;

    /// 推荐的轮询间隔
    fn default_poll_interval(&self) -> Duration;

    /// 提交扫描，返回后端任务ID
    async fn start(&self, url: &str, options: &ScanOptions) -> Result<String, BackendError>;

    /// 查询扫描进度
    async fn status(&self, backend_task_id: &str) -> Result<ScanSnapshot, BackendError>;

    /// 获取已完成扫描的审计发现
    async fn result(&self, backend_task_id: &str) -> Result<AuditFindings, BackendError>;

    /// 取消扫描
    async fn cancel(&self, backend_task_id: &str) -> Result<(), BackendError>;
}
