// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 扫描任务实体
///
/// 表示一次针对目标站点的审计扫描。任务由扫描后端执行，
/// 由扫描跟踪器定期轮询并同步进度。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanTask {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 发起扫描的用户ID
    pub owner_id: Uuid,
    /// 规范化后的目标URL
    pub url: String,
    /// 扫描后端分配的任务ID
    pub backend_task_id: Option<String>,
    /// 任务状态
    pub status: ScanStatus,
    /// 进度百分比 (0-100)
    pub progress: u8,
    /// 已扫描页面数
    pub pages_scanned: u32,
    /// 预计总页面数
    pub estimated_total_pages: u32,
    /// 当前正在访问的URL
    pub current_url: Option<String>,
    /// 失败原因
    pub error_message: Option<String>,
    /// 扫描选项
    pub options: ScanOptions,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
    /// 开始执行时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 结束时间（完成、失败或取消）
    pub completed_at: Option<DateTime<FixedOffset>>,
}

/// 扫描选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// 最大扫描页面数
    pub max_pages: Option<u32>,
    /// 是否包含子域名
    pub include_subdomains: bool,
    /// 是否遵守 robots.txt
    pub respect_robots_txt: bool,
    /// 自定义 User-Agent
    pub user_agent: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_pages: None,
            include_subdomains: false,
            respect_robots_txt: true,
            user_agent: None,
        }
    }
}

/// 扫描状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → InProgress → Completed/Failed/Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// 已提交，尚未产生进度
    #[default]
    Pending,
    /// 扫描中
    InProgress,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
    /// 已取消
    Cancelled,
}

impl ScanStatus {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanStatus::Completed | ScanStatus::Failed | ScanStatus::Cancelled
        )
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanStatus::Pending => write!(f, "pending"),
            ScanStatus::InProgress => write!(f, "in_progress"),
            ScanStatus::Completed => write!(f, "completed"),
            ScanStatus::Failed => write!(f, "failed"),
            ScanStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for ScanStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScanStatus::Pending),
            "in_progress" => Ok(ScanStatus::InProgress),
            "completed" => Ok(ScanStatus::Completed),
            "failed" => Ok(ScanStatus::Failed),
            "cancelled" => Ok(ScanStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// 扫描后端报告的进度快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub status: ScanStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub pages_scanned: u32,
    #[serde(default)]
    pub estimated_total_pages: u32,
    #[serde(default)]
    pub current_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 应用快照后的状态变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTransition {
    /// 无变化
    Unchanged,
    /// 计数或进度更新
    Progressed,
    /// Pending → InProgress
    Started,
    /// 进入 Completed
    Completed,
    /// 进入 Failed
    Failed,
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition from {0}")]
    InvalidStateTransition(ScanStatus),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 扫描尚未完成，结果不可用
    #[error("Audit result for scan {0} is not ready")]
    ResultNotReady(Uuid),
}

impl ScanTask {
    /// 创建一个新的待处理扫描任务
    pub fn new(owner_id: Uuid, url: String, options: ScanOptions) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            url,
            backend_task_id: None,
            status: ScanStatus::Pending,
            progress: 0,
            pages_scanned: 0,
            estimated_total_pages: 0,
            current_url: None,
            error_message: None,
            options,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    /// 将后端快照应用到任务上
    ///
    /// 进度只增不减，超过100按100计；进度大于0时从 Pending 进入 InProgress；
    /// 已扫描页数达到预计总页数时进入 Completed，且只发生一次。
    /// 对已终止的任务应用快照不产生任何变化。
    pub fn apply_snapshot(&mut self, snapshot: &ScanSnapshot) -> ScanTransition {
        if self.status.is_terminal() {
            return ScanTransition::Unchanged;
        }

        if snapshot.status == ScanStatus::Failed {
            let message = snapshot
                .error
                .clone()
                .unwrap_or_else(|| "Scan failed".to_string());
            self.mark_failed(message);
            return ScanTransition::Failed;
        }

        let before = (
            self.progress,
            self.pages_scanned,
            self.estimated_total_pages,
            self.current_url.clone(),
        );

        self.progress = self.progress.max(snapshot.progress.min(100));
        self.pages_scanned = self.pages_scanned.max(snapshot.pages_scanned);
        if snapshot.estimated_total_pages > 0 {
            self.estimated_total_pages = snapshot.estimated_total_pages;
        }
        if snapshot.current_url.is_some() {
            self.current_url = snapshot.current_url.clone();
        }

        let mut transition = if before
            != (
                self.progress,
                self.pages_scanned,
                self.estimated_total_pages,
                self.current_url.clone(),
            ) {
            ScanTransition::Progressed
        } else {
            ScanTransition::Unchanged
        };

        if self.status == ScanStatus::Pending
            && (self.progress > 0 || snapshot.status != ScanStatus::Pending)
        {
            self.status = ScanStatus::InProgress;
            self.started_at = Some(Utc::now().into());
            transition = ScanTransition::Started;
        }

        let all_pages_scanned =
            self.estimated_total_pages > 0 && self.pages_scanned >= self.estimated_total_pages;
        if all_pages_scanned || snapshot.status == ScanStatus::Completed {
            if self.started_at.is_none() {
                self.started_at = Some(Utc::now().into());
            }
            self.status = ScanStatus::Completed;
            self.progress = 100;
            self.completed_at = Some(Utc::now().into());
            transition = ScanTransition::Completed;
        }

        if transition != ScanTransition::Unchanged {
            self.updated_at = Utc::now().into();
        }
        transition
    }

    /// 标记任务失败
    ///
    /// 已终止的任务保持原状态
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        let now: DateTime<FixedOffset> = Utc::now().into();
        self.status = ScanStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// 取消任务
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 任务已取消
    /// * `Err(DomainError)` - 任务已处于终止状态
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidStateTransition(self.status));
        }
        let now: DateTime<FixedOffset> = Utc::now().into();
        self.status = ScanStatus::Cancelled;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// 扫描耗时（秒），未结束时返回 None
    pub fn duration_secs(&self) -> Option<f64> {
        let end = self.completed_at?;
        let start = self.started_at.unwrap_or(self.created_at);
        Some((end - start).num_milliseconds().max(0) as f64 / 1000.0)
    }
}
