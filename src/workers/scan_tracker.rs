// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::AuditResult;
use crate::domain::models::estimate::format_cents;
use crate::domain::models::notification::{Notification, NotificationKind};
use crate::domain::models::scan_task::{ScanOptions, ScanTask, ScanTransition};
use crate::domain::repositories::audit_result_repository::AuditResultRepository;
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::domain::repositories::scan_task_repository::ScanTaskRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::cost_estimator::{estimate_cost, PricingTable};
use crate::domain::services::scan_backend::{BackendError, ScanBackend};
use crate::infrastructure::metrics;
use crate::utils::url_utils::{normalize_scan_url, UrlNormalizeError};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 启动扫描时的错误
#[derive(Error, Debug)]
pub enum StartError {
    /// URL 为空（不会调用扫描后端）
    #[error("URL must not be empty")]
    EmptyUrl,
    /// URL 无法解析或协议不受支持
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// 扫描后端拒绝或无法接受请求
    #[error("Scan could not be started: {0}")]
    Rejected(#[source] BackendError),
    /// 存储任务失败
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<UrlNormalizeError> for StartError {
    fn from(err: UrlNormalizeError) -> Self {
        match err {
            UrlNormalizeError::Empty => StartError::EmptyUrl,
            UrlNormalizeError::Invalid(reason) => StartError::InvalidUrl(reason),
        }
    }
}

/// 单个扫描的跟踪句柄
struct TrackerHandle {
    token: CancellationToken,
    sender: watch::Sender<ScanTask>,
    /// 轮询与取消互斥，取消之后不会再有更新被发布
    lock: Mutex<()>,
}

/// 扫描进度跟踪器
///
/// 每个进行中的扫描对应一个轮询任务：按固定间隔读取后端快照，
/// 应用到扫描任务的状态机上，持久化并通过 watch 通道发布。
/// 完成时保存审计结果并生成通知；失败（包括轮询时的网络错误）不重试。
#[derive(Clone)]
pub struct ScanTracker {
    backend: Arc<dyn ScanBackend>,
    tasks: Arc<dyn ScanTaskRepository>,
    results: Arc<dyn AuditResultRepository>,
    notifications: Arc<dyn NotificationRepository>,
    pricing: PricingTable,
    poll_interval: Duration,
    active: Arc<DashMap<Uuid, Arc<TrackerHandle>>>,
}

impl ScanTracker {
    /// 创建跟踪器
    ///
    /// `poll_interval` 为 None 时使用后端推荐的轮询间隔
    pub fn new(
        backend: Arc<dyn ScanBackend>,
        tasks: Arc<dyn ScanTaskRepository>,
        results: Arc<dyn AuditResultRepository>,
        notifications: Arc<dyn NotificationRepository>,
        pricing: PricingTable,
        poll_interval: Option<Duration>,
    ) -> Self {
        let poll_interval = poll_interval.unwrap_or_else(|| backend.default_poll_interval());
        Self {
            backend,
            tasks,
            results,
            notifications,
            pricing,
            poll_interval,
            active: Arc::new(DashMap::new()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// 当前正在跟踪的扫描数量
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// 启动扫描
    ///
    /// URL 先被规范化；为空或非法时直接返回错误，不调用后端。
    /// 后端拒绝时任务以 failed 状态保存并返回 `StartError::Rejected`。
    pub async fn start_scan(
        &self,
        owner_id: Uuid,
        url: &str,
        options: ScanOptions,
    ) -> Result<ScanTask, StartError> {
        let url = normalize_scan_url(url)?;
        let mut task = ScanTask::new(owner_id, url.to_string(), options);

        let backend_task_id = match self.backend.start(&task.url, &task.options).await {
            Ok(id) => id,
            Err(e) => {
                warn!(scan_id = %task.id, url = %task.url, "Scan backend refused scan: {}", e);
                task.mark_failed(e.to_string());
                self.tasks.create(&task).await?;
                metrics::record_scan_failed(self.backend.name());
                return Err(StartError::Rejected(e));
            }
        };

        task.backend_task_id = Some(backend_task_id.clone());
        let task = match self.tasks.create(&task).await {
            Ok(task) => task,
            Err(e) => {
                if let Err(cancel_err) = self.backend.cancel(&backend_task_id).await {
                    debug!("Could not cancel orphaned backend scan {}: {}", backend_task_id, cancel_err);
                }
                return Err(e.into());
            }
        };

        info!(
            scan_id = %task.id,
            url = %task.url,
            backend = self.backend.name(),
            backend_task_id = %backend_task_id,
            "Scan started"
        );
        metrics::record_scan_started(self.backend.name());
        self.track(task.clone());
        Ok(task)
    }

    /// 订阅扫描状态更新
    ///
    /// 扫描不在跟踪中（已结束或不存在）时返回 None
    pub fn subscribe(&self, task_id: Uuid) -> Option<watch::Receiver<ScanTask>> {
        self.active.get(&task_id).map(|handle| handle.sender.subscribe())
    }

    /// 取消扫描
    ///
    /// 立即停止轮询并将取消传递给扫描后端。任务已终止时返回
    /// `DomainError::InvalidStateTransition`，不存在时返回 `RepositoryError::NotFound`。
    pub async fn cancel_scan(&self, task_id: Uuid) -> anyhow::Result<ScanTask> {
        let handle = self.active.get(&task_id).map(|h| h.value().clone());
        let _guard = match &handle {
            Some(handle) => Some(handle.lock.lock().await),
            None => None,
        };

        let mut task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        task.cancel()?;

        if let Some(handle) = &handle {
            handle.token.cancel();
        }
        if let Some(backend_task_id) = &task.backend_task_id {
            if let Err(e) = self.backend.cancel(backend_task_id).await {
                warn!(scan_id = %task_id, "Failed to cancel backend scan {}: {}", backend_task_id, e);
            }
        }

        let task = self.tasks.update(&task).await?;
        if let Some(handle) = &handle {
            handle.sender.send_replace(task.clone());
        }
        self.active.remove(&task_id);

        info!(scan_id = %task_id, "Scan cancelled");
        metrics::record_scan_cancelled(self.backend.name());
        Ok(task)
    }

    /// 恢复服务重启前未结束的扫描
    ///
    /// 没有后端任务ID的扫描无法恢复，直接标记为失败。返回恢复跟踪的数量。
    pub async fn resume_unfinished(&self) -> Result<usize, RepositoryError> {
        let unfinished = self.tasks.find_unfinished().await?;
        let mut resumed = 0;

        for mut task in unfinished {
            if task.backend_task_id.is_none() {
                task.mark_failed("Scan was interrupted before reaching the scan backend");
                self.tasks.update(&task).await?;
                continue;
            }
            if self.active.contains_key(&task.id) {
                continue;
            }
            debug!(scan_id = %task.id, "Resuming scan tracking");
            self.track(task);
            resumed += 1;
        }

        if resumed > 0 {
            info!("Resumed tracking of {} unfinished scans", resumed);
        }
        Ok(resumed)
    }

    /// 停止所有轮询任务（不取消后端扫描，重启后可恢复）
    pub fn shutdown(&self) {
        for entry in self.active.iter() {
            entry.token.cancel();
        }
        self.active.clear();
    }

    fn track(&self, task: ScanTask) {
        let (sender, _) = watch::channel(task.clone());
        let handle = Arc::new(TrackerHandle {
            token: CancellationToken::new(),
            sender,
            lock: Mutex::new(()),
        });
        self.active.insert(task.id, handle.clone());

        let tracker = self.clone();
        tokio::spawn(async move {
            tracker.run(task, handle).await;
        });
    }

    async fn run(self, mut task: ScanTask, handle: Arc<TrackerHandle>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = handle.token.cancelled() => break,
                _ = interval.tick() => {
                    let _guard = handle.lock.lock().await;
                    if handle.token.is_cancelled() {
                        break;
                    }
                    if self.poll_once(&mut task, &handle).await {
                        self.active.remove(&task.id);
                        break;
                    }
                }
            }
        }
        debug!(scan_id = %task.id, status = %task.status, "Stopped tracking scan");
    }

    /// 执行一次轮询，扫描结束时返回 true
    async fn poll_once(&self, task: &mut ScanTask, handle: &TrackerHandle) -> bool {
        let Some(backend_task_id) = task.backend_task_id.clone() else {
            self.on_error(task, handle, "Scan has no backend task").await;
            return true;
        };

        let snapshot = match self.backend.status(&backend_task_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.on_error(task, handle, format!("Status check failed: {}", e))
                    .await;
                return true;
            }
        };

        let mut updated = task.clone();
        match updated.apply_snapshot(&snapshot) {
            ScanTransition::Unchanged => false,
            ScanTransition::Progressed | ScanTransition::Started => {
                *task = updated;
                self.persist_and_publish(task, handle).await;
                false
            }
            ScanTransition::Failed => {
                *task = updated;
                let message = task.error_message.clone().unwrap_or_default();
                self.on_error(task, handle, message).await;
                true
            }
            ScanTransition::Completed => match self.backend.result(&backend_task_id).await {
                Ok(findings) => {
                    let result = AuditResult::from_findings(task.id, findings);
                    match self.results.save(&result).await {
                        Ok(()) | Err(RepositoryError::AlreadyExists) => {
                            *task = updated;
                            self.on_complete(task, handle, &result).await;
                        }
                        Err(e) => {
                            self.on_error(task, handle, format!("Failed to store audit result: {}", e))
                                .await;
                        }
                    }
                    true
                }
                Err(BackendError::NotReady(_)) => {
                    debug!(scan_id = %task.id, "All pages scanned, waiting for audit result");
                    false
                }
                Err(e) => {
                    self.on_error(task, handle, format!("Failed to fetch audit result: {}", e))
                        .await;
                    true
                }
            },
        }
    }

    async fn on_complete(&self, task: &ScanTask, handle: &TrackerHandle, result: &AuditResult) {
        self.persist_and_publish(task, handle).await;

        let estimate = estimate_cost(result, &self.pricing);
        let total = format_cents(estimate.total_cents, &estimate.currency);
        info!(
            scan_id = %task.id,
            url = %task.url,
            score = result.scores.global,
            pages = result.page_stats.total_pages,
            estimate = %total,
            "Scan completed"
        );

        let notification = Notification::new(
            task.owner_id,
            Some(task.id),
            NotificationKind::ScanCompleted,
            "Audit completed",
            format!(
                "The audit of {} finished with a global score of {}/100. Estimated optimization cost: {}.",
                task.url, result.scores.global, total
            ),
        );
        if let Err(e) = self.notifications.create(&notification).await {
            warn!(scan_id = %task.id, "Failed to create notification: {}", e);
        }

        metrics::record_scan_completed(self.backend.name(), task.duration_secs());
    }

    async fn on_error(&self, task: &mut ScanTask, handle: &TrackerHandle, message: impl Into<String>) {
        let message = message.into();
        task.mark_failed(message.clone());
        warn!(scan_id = %task.id, url = %task.url, "Scan failed: {}", message);

        self.persist_and_publish(task, handle).await;

        let notification = Notification::new(
            task.owner_id,
            Some(task.id),
            NotificationKind::ScanFailed,
            "Audit failed",
            format!("The audit of {} failed: {}", task.url, message),
        );
        if let Err(e) = self.notifications.create(&notification).await {
            warn!(scan_id = %task.id, "Failed to create notification: {}", e);
        }

        metrics::record_scan_failed(self.backend.name());
    }

    async fn persist_and_publish(&self, task: &ScanTask, handle: &TrackerHandle) {
        if let Err(e) = self.tasks.update(task).await {
            error!(scan_id = %task.id, "Failed to persist scan progress: {}", e);
        }
        handle.sender.send_replace(task.clone());
    }
}

#[cfg(test)]
#[path = "scan_tracker_test.rs"]
mod tests;
