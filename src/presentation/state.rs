// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::audit_use_case::AuditUseCase;
use crate::application::use_cases::report_use_case::ReportUseCase;
use crate::application::use_cases::share_use_case::ShareUseCase;
use crate::config::settings::Settings;
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::services::llm_service::LLMServiceTrait;
use crate::domain::services::scan_backend::ScanBackend;
use crate::infrastructure::repositories::audit_result_repo_impl::AuditResultRepositoryImpl;
use crate::infrastructure::repositories::notification_repo_impl::NotificationRepositoryImpl;
use crate::infrastructure::repositories::pdf_report_repo_impl::PdfReportRepositoryImpl;
use crate::infrastructure::repositories::scan_task_repo_impl::ScanTaskRepositoryImpl;
use crate::infrastructure::repositories::shared_estimate_repo_impl::SharedEstimateRepositoryImpl;
use crate::workers::scan_tracker::ScanTracker;
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// 请求处理器共享的应用状态
#[derive(Clone)]
pub struct AppState {
    pub tracker: ScanTracker,
    pub audits: Arc<AuditUseCase>,
    pub reports: Arc<ReportUseCase>,
    pub sharing: Arc<ShareUseCase>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// 由数据库连接和各外部组件装配应用状态
    pub fn new(
        settings: &Settings,
        db: Arc<DatabaseConnection>,
        backend: Arc<dyn ScanBackend>,
        storage: Arc<dyn StorageRepository>,
        llm: Arc<dyn LLMServiceTrait>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let tasks = Arc::new(ScanTaskRepositoryImpl::new(db.clone()));
        let results = Arc::new(AuditResultRepositoryImpl::new(db.clone()));
        let notifications = Arc::new(NotificationRepositoryImpl::new(db.clone()));
        let reports = Arc::new(PdfReportRepositoryImpl::new(db.clone()));
        let shared = Arc::new(SharedEstimateRepositoryImpl::new(db));

        let tracker = ScanTracker::new(
            backend,
            tasks.clone(),
            results.clone(),
            notifications.clone(),
            settings.pricing.clone(),
            settings.scan.poll_interval(),
        );
        let audits = AuditUseCase::new(
            tasks.clone(),
            results.clone(),
            llm,
            settings.pricing.clone(),
        );
        let report_use_case = ReportUseCase::new(
            tasks.clone(),
            results.clone(),
            reports,
            storage,
            notifications.clone(),
            settings.pricing.clone(),
            chrono::Duration::days(settings.sharing.report_ttl_days),
        );
        let sharing = ShareUseCase::new(
            tasks,
            results,
            shared,
            notifications.clone(),
            settings.pricing.clone(),
            chrono::Duration::hours(settings.sharing.estimate_ttl_hours),
        );

        Self {
            tracker,
            audits: Arc::new(audits),
            reports: Arc::new(report_use_case),
            sharing: Arc::new(sharing),
            notifications,
            metrics,
        }
    }
}
