// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{find_completed_scan, UseCaseError};
use crate::domain::models::notification::{Notification, NotificationKind};
use crate::domain::models::pdf_report::PdfReport;
use crate::domain::repositories::audit_result_repository::AuditResultRepository;
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::domain::repositories::pdf_report_repository::PdfReportRepository;
use crate::domain::repositories::scan_task_repository::ScanTaskRepository;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::services::cost_estimator::{estimate_cost, PricingTable};
use crate::domain::services::report_service::{build_report_lines, render_pdf};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// PDF 报告用例
pub struct ReportUseCase {
    tasks: Arc<dyn ScanTaskRepository>,
    results: Arc<dyn AuditResultRepository>,
    reports: Arc<dyn PdfReportRepository>,
    storage: Arc<dyn StorageRepository>,
    notifications: Arc<dyn NotificationRepository>,
    pricing: PricingTable,
    report_ttl: chrono::Duration,
}

impl ReportUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tasks: Arc<dyn ScanTaskRepository>,
        results: Arc<dyn AuditResultRepository>,
        reports: Arc<dyn PdfReportRepository>,
        storage: Arc<dyn StorageRepository>,
        notifications: Arc<dyn NotificationRepository>,
        pricing: PricingTable,
        report_ttl: chrono::Duration,
    ) -> Self {
        Self {
            tasks,
            results,
            reports,
            storage,
            notifications,
            pricing,
            report_ttl,
        }
    }

    /// 为已完成的扫描生成 PDF 报告
    ///
    /// 文件写入存储层，记录写入数据库，并通知扫描所有者
    pub async fn generate(&self, owner_id: Uuid, scan_id: Uuid) -> Result<PdfReport, UseCaseError> {
        let (task, result) =
            find_completed_scan(self.tasks.as_ref(), self.results.as_ref(), owner_id, scan_id)
                .await?;
        let estimate = estimate_cost(&result, &self.pricing);
        let lines = build_report_lines(&task, &result, &estimate);
        let title = format!("SEO Audit - {}", task.url);

        let bytes = tokio::task::spawn_blocking(move || render_pdf(&title, &lines))
            .await
            .context("PDF rendering task panicked")??;

        let report = PdfReport::new(scan_id, owner_id, bytes.len() as u64, self.report_ttl);
        self.storage.save(&report.storage_key, &bytes).await?;
        if let Err(e) = self.reports.create(&report).await {
            if let Err(cleanup) = self.storage.delete(&report.storage_key).await {
                warn!("Failed to remove orphaned report file {}: {}", report.storage_key, cleanup);
            }
            return Err(e.into());
        }

        info!(
            scan_id = %scan_id,
            report_id = %report.id,
            size_bytes = report.size_bytes,
            "PDF report generated"
        );

        let notification = Notification::new(
            owner_id,
            Some(scan_id),
            NotificationKind::ReportReady,
            "Report ready",
            format!("The PDF report for {} is ready to download.", task.url),
        );
        if let Err(e) = self.notifications.create(&notification).await {
            warn!(scan_id = %scan_id, "Failed to create notification: {}", e);
        }

        Ok(report)
    }

    /// 下载报告内容
    ///
    /// 报告不存在、不属于该用户或已过期时返回 `ReportNotFound`
    pub async fn download(
        &self,
        owner_id: Uuid,
        report_id: Uuid,
    ) -> Result<(PdfReport, Vec<u8>), UseCaseError> {
        let report = self
            .reports
            .find_by_id(report_id)
            .await?
            .filter(|r| r.owner_id == owner_id && r.expires_at > Utc::now())
            .ok_or(UseCaseError::ReportNotFound)?;

        let bytes = self
            .storage
            .get(&report.storage_key)
            .await?
            .ok_or(UseCaseError::ReportNotFound)?;
        Ok((report, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::audit_result::{AuditFindings, AuditResult};
    use crate::domain::models::scan_task::{ScanOptions, ScanSnapshot, ScanStatus, ScanTask};
    use crate::infrastructure::database::test_connection;
    use crate::infrastructure::repositories::audit_result_repo_impl::AuditResultRepositoryImpl;
    use crate::infrastructure::repositories::notification_repo_impl::NotificationRepositoryImpl;
    use crate::infrastructure::repositories::pdf_report_repo_impl::PdfReportRepositoryImpl;
    use crate::infrastructure::repositories::scan_task_repo_impl::ScanTaskRepositoryImpl;
    use crate::infrastructure::storage::InMemoryStorage;

    struct Fixture {
        use_case: ReportUseCase,
        tasks: Arc<ScanTaskRepositoryImpl>,
        results: Arc<AuditResultRepositoryImpl>,
        notifications: Arc<NotificationRepositoryImpl>,
        storage: Arc<InMemoryStorage>,
    }

    async fn fixture() -> Fixture {
        let db = test_connection().await;
        let tasks = Arc::new(ScanTaskRepositoryImpl::new(db.clone()));
        let results = Arc::new(AuditResultRepositoryImpl::new(db.clone()));
        let notifications = Arc::new(NotificationRepositoryImpl::new(db.clone()));
        let storage = Arc::new(InMemoryStorage::new());
        let use_case = ReportUseCase::new(
            tasks.clone(),
            results.clone(),
            Arc::new(PdfReportRepositoryImpl::new(db)),
            storage.clone(),
            notifications.clone(),
            PricingTable::default(),
            chrono::Duration::days(30),
        );
        Fixture {
            use_case,
            tasks,
            results,
            notifications,
            storage,
        }
    }

    async fn completed_scan(f: &Fixture, owner: Uuid) -> ScanTask {
        let mut task = ScanTask::new(owner, "https://acme.test/".to_string(), ScanOptions::default());
        f.tasks.create(&task).await.unwrap();
        task.apply_snapshot(&ScanSnapshot {
            status: ScanStatus::Completed,
            progress: 100,
            pages_scanned: 1,
            estimated_total_pages: 1,
            current_url: None,
            error: None,
        });
        f.tasks.update(&task).await.unwrap();
        f.results
            .save(&AuditResult::from_findings(task.id, AuditFindings::default()))
            .await
            .unwrap();
        task
    }

    #[tokio::test]
    async fn test_generate_and_download_report() {
        let f = fixture().await;
        let owner = Uuid::new_v4();
        let task = completed_scan(&f, owner).await;

        let report = f.use_case.generate(owner, task.id).await.unwrap();
        assert_eq!(report.storage_key, format!("reports/{}/{}.pdf", task.id, report.id));
        assert!(f.storage.exists(&report.storage_key).await.unwrap());

        let (downloaded, bytes) = f.use_case.download(owner, report.id).await.unwrap();
        assert_eq!(downloaded.id, report.id);
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(bytes.len() as u64, report.size_bytes);

        let notifications = f.notifications.list_by_owner(owner, true, 10).await.unwrap();
        assert_eq!(notifications[0].kind, NotificationKind::ReportReady);
    }

    #[tokio::test]
    async fn test_reports_are_private_to_owner() {
        let f = fixture().await;
        let owner = Uuid::new_v4();
        let task = completed_scan(&f, owner).await;
        let report = f.use_case.generate(owner, task.id).await.unwrap();

        let err = f.use_case.download(Uuid::new_v4(), report.id).await.unwrap_err();
        assert!(matches!(err, UseCaseError::ReportNotFound));
        let err = f.use_case.generate(Uuid::new_v4(), task.id).await.unwrap_err();
        assert!(matches!(err, UseCaseError::ScanNotFound));
    }
}
