// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::pdf_report_repository::PdfReportRepository;
use crate::domain::repositories::shared_estimate_repository::SharedEstimateRepository;
use crate::domain::repositories::storage_repository::StorageRepository;
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 一次清理的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupStats {
    pub shared_estimates: u64,
    pub reports: u64,
}

/// 过期数据清理工作器
///
/// 定期删除过期的共享报价链接和过期的 PDF 报告（记录与文件）
pub struct ExpirationWorker {
    shared_estimates: Arc<dyn SharedEstimateRepository>,
    reports: Arc<dyn PdfReportRepository>,
    storage: Arc<dyn StorageRepository>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ExpirationWorker {
    pub fn new(
        shared_estimates: Arc<dyn SharedEstimateRepository>,
        reports: Arc<dyn PdfReportRepository>,
        storage: Arc<dyn StorageRepository>,
        interval: Duration,
    ) -> Self {
        Self {
            shared_estimates,
            reports,
            storage,
            interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// 用于停止工作器的令牌
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 运行工作器
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "Expiration worker started");

        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            let stats = self.cleanup_expired(Utc::now().into()).await;
            if stats.shared_estimates > 0 || stats.reports > 0 {
                info!(
                    shared_estimates = stats.shared_estimates,
                    reports = stats.reports,
                    "Cleaned up expired data"
                );
            }
        }

        info!("Expiration worker stopped");
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn cleanup_expired(&self, now: DateTime<FixedOffset>) -> CleanupStats {
        let mut stats = CleanupStats::default();

        match self.shared_estimates.delete_expired(now).await {
            Ok(count) => stats.shared_estimates = count,
            Err(e) => error!("Failed to cleanup expired shared estimates: {}", e),
        }

        let expired = match self.reports.find_expired(now).await {
            Ok(reports) => reports,
            Err(e) => {
                error!("Failed to list expired reports: {}", e);
                return stats;
            }
        };

        for report in expired {
            // The record stays when the file cannot be removed, so the next run retries.
            if let Err(e) = self.storage.delete(&report.storage_key).await {
                warn!(report_id = %report.id, "Failed to delete report file {}: {}", report.storage_key, e);
                continue;
            }
            match self.reports.delete(report.id).await {
                Ok(()) => stats.reports += 1,
                Err(e) => error!(report_id = %report.id, "Failed to delete report record: {}", e),
            }
        }

        stats
    }
}

#[cfg(test)]
#[path = "expiration_worker_test.rs"]
mod tests;
