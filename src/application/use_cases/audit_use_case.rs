// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{find_completed_scan, find_owned_scan, UseCaseError};
use crate::domain::models::audit_result::AuditResult;
use crate::domain::models::estimate::CostEstimate;
use crate::domain::models::scan_task::ScanTask;
use crate::domain::repositories::audit_result_repository::AuditResultRepository;
use crate::domain::repositories::scan_task_repository::ScanTaskRepository;
use crate::domain::services::cost_estimator::{estimate_cost, PricingTable};
use crate::domain::services::llm_service::{AuditSummary, LLMServiceTrait};
use crate::domain::services::sitemap_service::generate_sitemap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u64 = 20;

/// 扫描查询用例
///
/// 读取扫描任务、审计结果，以及由结果派生的报价、站点地图和AI摘要
pub struct AuditUseCase {
    tasks: Arc<dyn ScanTaskRepository>,
    results: Arc<dyn AuditResultRepository>,
    llm: Arc<dyn LLMServiceTrait>,
    pricing: PricingTable,
}

impl AuditUseCase {
    pub fn new(
        tasks: Arc<dyn ScanTaskRepository>,
        results: Arc<dyn AuditResultRepository>,
        llm: Arc<dyn LLMServiceTrait>,
        pricing: PricingTable,
    ) -> Self {
        Self {
            tasks,
            results,
            llm,
            pricing,
        }
    }

    pub async fn get_scan(&self, owner_id: Uuid, scan_id: Uuid) -> Result<ScanTask, UseCaseError> {
        find_owned_scan(self.tasks.as_ref(), owner_id, scan_id).await
    }

    pub async fn list_scans(
        &self,
        owner_id: Uuid,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<ScanTask>, UseCaseError> {
        Ok(self
            .tasks
            .list_by_owner(
                owner_id,
                limit.unwrap_or(DEFAULT_PAGE_SIZE),
                offset.unwrap_or(0),
            )
            .await?)
    }

    pub async fn get_result(
        &self,
        owner_id: Uuid,
        scan_id: Uuid,
    ) -> Result<AuditResult, UseCaseError> {
        let (_, result) =
            find_completed_scan(self.tasks.as_ref(), self.results.as_ref(), owner_id, scan_id)
                .await?;
        Ok(result)
    }

    /// 优化报价（每次请求重新计算）
    pub async fn get_estimate(
        &self,
        owner_id: Uuid,
        scan_id: Uuid,
    ) -> Result<CostEstimate, UseCaseError> {
        let result = self.get_result(owner_id, scan_id).await?;
        Ok(estimate_cost(&result, &self.pricing))
    }

    pub async fn get_sitemap(&self, owner_id: Uuid, scan_id: Uuid) -> Result<String, UseCaseError> {
        let result = self.get_result(owner_id, scan_id).await?;
        Ok(generate_sitemap(&result))
    }

    pub async fn summarize(
        &self,
        owner_id: Uuid,
        scan_id: Uuid,
    ) -> Result<AuditSummary, UseCaseError> {
        let (task, result) =
            find_completed_scan(self.tasks.as_ref(), self.results.as_ref(), owner_id, scan_id)
                .await?;
        let (summary, usage) = self.llm.summarize_audit(&task, &result).await?;
        info!(
            scan_id = %scan_id,
            total_tokens = usage.total_tokens,
            "Generated audit summary"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::audit_result::{AuditFindings, IssueCounts, PageSummary};
    use crate::domain::models::scan_task::{DomainError, ScanOptions, ScanSnapshot, ScanStatus};
    use crate::domain::services::llm_service::TokenUsage;
    use crate::infrastructure::database::test_connection;
    use crate::infrastructure::repositories::audit_result_repo_impl::AuditResultRepositoryImpl;
    use crate::infrastructure::repositories::scan_task_repo_impl::ScanTaskRepositoryImpl;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Llm {}
        #[async_trait]
        impl LLMServiceTrait for Llm {
            async fn summarize_audit(
                &self,
                task: &ScanTask,
                result: &AuditResult,
            ) -> anyhow::Result<(AuditSummary, TokenUsage)>;
        }
    }

    struct Fixture {
        use_case: AuditUseCase,
        tasks: Arc<ScanTaskRepositoryImpl>,
        results: Arc<AuditResultRepositoryImpl>,
    }

    async fn fixture(llm: MockLlm) -> Fixture {
        let db = test_connection().await;
        let tasks = Arc::new(ScanTaskRepositoryImpl::new(db.clone()));
        let results = Arc::new(AuditResultRepositoryImpl::new(db));
        let use_case = AuditUseCase::new(
            tasks.clone(),
            results.clone(),
            Arc::new(llm),
            PricingTable::default(),
        );
        Fixture {
            use_case,
            tasks,
            results,
        }
    }

    async fn completed_scan(f: &Fixture, owner: Uuid) -> ScanTask {
        let mut task = ScanTask::new(owner, "https://acme.test/".to_string(), ScanOptions::default());
        f.tasks.create(&task).await.unwrap();
        task.apply_snapshot(&ScanSnapshot {
            status: ScanStatus::Completed,
            progress: 100,
            pages_scanned: 2,
            estimated_total_pages: 2,
            current_url: None,
            error: None,
        });
        f.tasks.update(&task).await.unwrap();

        let findings = AuditFindings {
            issues: IssueCounts {
                critical: 1,
                high: 0,
                medium: 2,
                low: 0,
            },
            pages: vec![
                PageSummary {
                    url: "https://acme.test/".to_string(),
                    status_code: 200,
                    load_time_ms: 300,
                    issue_count: 2,
                    depth: 0,
                },
                PageSummary {
                    url: "https://acme.test/gone".to_string(),
                    status_code: 404,
                    load_time_ms: 90,
                    issue_count: 1,
                    depth: 1,
                },
            ],
            ..Default::default()
        };
        f.results
            .save(&AuditResult::from_findings(task.id, findings))
            .await
            .unwrap();
        task
    }

    #[tokio::test]
    async fn test_scans_of_other_owners_are_not_found() {
        let f = fixture(MockLlm::new()).await;
        let task = completed_scan(&f, Uuid::new_v4()).await;

        let err = f.use_case.get_scan(Uuid::new_v4(), task.id).await.unwrap_err();
        assert!(matches!(err, UseCaseError::ScanNotFound));
        assert_eq!(
            f.use_case.get_scan(task.owner_id, task.id).await.unwrap().id,
            task.id
        );
    }

    #[tokio::test]
    async fn test_result_of_running_scan_is_not_ready() {
        let f = fixture(MockLlm::new()).await;
        let owner = Uuid::new_v4();
        let task = ScanTask::new(owner, "https://acme.test/".to_string(), ScanOptions::default());
        f.tasks.create(&task).await.unwrap();

        let err = f.use_case.get_estimate(owner, task.id).await.unwrap_err();
        assert!(matches!(
            err,
            UseCaseError::Domain(DomainError::ResultNotReady(id)) if id == task.id
        ));
    }

    #[tokio::test]
    async fn test_estimate_and_sitemap_derive_from_result() {
        let f = fixture(MockLlm::new()).await;
        let owner = Uuid::new_v4();
        let task = completed_scan(&f, owner).await;

        let estimate = f.use_case.get_estimate(owner, task.id).await.unwrap();
        assert_eq!(estimate.items.len(), 2);
        assert_eq!(estimate.subtotal_cents, 5000 + 2 * 1500);
        assert_eq!(estimate.total_cents, 9900);

        let sitemap = f.use_case.get_sitemap(owner, task.id).await.unwrap();
        assert!(sitemap.contains("<loc>https://acme.test/</loc>"));
        assert!(!sitemap.contains("/gone"));
    }

    #[tokio::test]
    async fn test_summarize_uses_llm() {
        let mut llm = MockLlm::new();
        llm.expect_summarize_audit().times(1).returning(|task, _| {
            Ok((
                AuditSummary {
                    summary: format!("{} needs work", task.url),
                    recommendations: vec!["Fix broken links".to_string()],
                },
                TokenUsage::default(),
            ))
        });
        let f = fixture(llm).await;
        let owner = Uuid::new_v4();
        let task = completed_scan(&f, owner).await;

        let summary = f.use_case.summarize(owner, task.id).await.unwrap();
        assert_eq!(summary.summary, "https://acme.test/ needs work");
        assert_eq!(summary.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn test_list_scans_is_scoped_to_owner() {
        let f = fixture(MockLlm::new()).await;
        let owner = Uuid::new_v4();
        completed_scan(&f, owner).await;
        completed_scan(&f, Uuid::new_v4()).await;

        let scans = f.use_case.list_scans(owner, None, None).await.unwrap();
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].owner_id, owner);
    }
}
