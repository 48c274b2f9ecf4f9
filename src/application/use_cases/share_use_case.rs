// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{find_completed_scan, UseCaseError};
use crate::application::dto::share_request::{ShareRequestDto, SharedEstimateViewDto};
use crate::domain::models::notification::{Notification, NotificationKind};
use crate::domain::models::shared_estimate::{SharedEstimate, SharedEstimateError};
use crate::domain::repositories::audit_result_repository::AuditResultRepository;
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::domain::repositories::scan_task_repository::ScanTaskRepository;
use crate::domain::repositories::shared_estimate_repository::SharedEstimateRepository;
use crate::domain::services::cost_estimator::{estimate_cost, PricingTable};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// 报价分享用例
pub struct ShareUseCase {
    tasks: Arc<dyn ScanTaskRepository>,
    results: Arc<dyn AuditResultRepository>,
    shared: Arc<dyn SharedEstimateRepository>,
    notifications: Arc<dyn NotificationRepository>,
    pricing: PricingTable,
    link_ttl: chrono::Duration,
}

impl ShareUseCase {
    pub fn new(
        tasks: Arc<dyn ScanTaskRepository>,
        results: Arc<dyn AuditResultRepository>,
        shared: Arc<dyn SharedEstimateRepository>,
        notifications: Arc<dyn NotificationRepository>,
        pricing: PricingTable,
        link_ttl: chrono::Duration,
    ) -> Self {
        Self {
            tasks,
            results,
            shared,
            notifications,
            pricing,
            link_ttl,
        }
    }

    /// 为已完成扫描的报价创建分享链接
    ///
    /// 只记录收件人，不发送邮件
    pub async fn create_share(
        &self,
        owner_id: Uuid,
        scan_id: Uuid,
        request: ShareRequestDto,
    ) -> Result<SharedEstimate, UseCaseError> {
        request
            .validate()
            .map_err(|e| UseCaseError::Validation(e.to_string()))?;
        let (task, _) =
            find_completed_scan(self.tasks.as_ref(), self.results.as_ref(), owner_id, scan_id)
                .await?;

        let shared = SharedEstimate::new(
            scan_id,
            owner_id,
            request.recipient_email,
            request.message,
            self.link_ttl,
        );
        self.shared.create(&shared).await?;
        info!(scan_id = %scan_id, expires_at = %shared.expires_at, "Estimate shared");

        let recipient = shared
            .recipient_email
            .as_deref()
            .map(|email| format!(" with {}", email))
            .unwrap_or_default();
        let notification = Notification::new(
            owner_id,
            Some(scan_id),
            NotificationKind::EstimateShared,
            "Estimate shared",
            format!(
                "The estimate for {} was shared{}. The link expires on {}.",
                task.url,
                recipient,
                shared.expires_at.format("%Y-%m-%d %H:%M UTC")
            ),
        );
        if let Err(e) = self.notifications.create(&notification).await {
            warn!(scan_id = %scan_id, "Failed to create notification: {}", e);
        }

        Ok(shared)
    }

    /// 通过令牌查看分享的报价（无需身份）
    pub async fn view_shared(&self, token: &str) -> Result<SharedEstimateViewDto, UseCaseError> {
        let shared = self
            .shared
            .find_by_token(token)
            .await?
            .ok_or(SharedEstimateError::NotFound)?;
        if shared.is_expired_at(Utc::now().into()) {
            return Err(SharedEstimateError::Expired.into());
        }

        let task = self
            .tasks
            .find_by_id(shared.scan_id)
            .await?
            .ok_or(SharedEstimateError::NotFound)?;
        let result = self
            .results
            .find_by_scan_id(shared.scan_id)
            .await?
            .ok_or(SharedEstimateError::NotFound)?;

        Ok(SharedEstimateViewDto {
            url: task.url,
            scores: result.scores,
            issues: result.issues,
            estimate: estimate_cost(&result, &self.pricing),
            message: shared.message,
            expires_at: shared.expires_at,
        })
    }
}
