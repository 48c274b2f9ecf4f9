// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::{AuditResult, AuditScores, IssueCounts};
use crate::domain::repositories::audit_result_repository::AuditResultRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::audit_result as audit_result_entity;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, SqlErr};
use std::sync::Arc;
use uuid::Uuid;

/// 审计结果仓库实现
#[derive(Clone)]
pub struct AuditResultRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl AuditResultRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_score(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}

fn to_count(value: i32) -> u32 {
    value.max(0) as u32
}

impl TryFrom<audit_result_entity::Model> for AuditResult {
    type Error = RepositoryError;

    fn try_from(model: audit_result_entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            scan_id: model.scan_id,
            scores: AuditScores {
                global: to_score(model.global_score),
                seo: to_score(model.seo_score),
                technical: to_score(model.technical_score),
                content: to_score(model.content_score),
                performance: to_score(model.performance_score),
            },
            issues: IssueCounts {
                critical: to_count(model.critical_issues),
                high: to_count(model.high_issues),
                medium: to_count(model.medium_issues),
                low: to_count(model.low_issues),
            },
            page_stats: serde_json::from_value(model.page_stats)?,
            pages: serde_json::from_value(model.pages)?,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl AuditResultRepository for AuditResultRepositoryImpl {
    async fn save(&self, result: &AuditResult) -> Result<(), RepositoryError> {
        if self.find_by_scan_id(result.scan_id).await?.is_some() {
            return Err(RepositoryError::AlreadyExists);
        }

        let model = audit_result_entity::ActiveModel {
            scan_id: Set(result.scan_id),
            global_score: Set(result.scores.global as i32),
            seo_score: Set(result.scores.seo as i32),
            technical_score: Set(result.scores.technical as i32),
            content_score: Set(result.scores.content as i32),
            performance_score: Set(result.scores.performance as i32),
            critical_issues: Set(result.issues.critical as i32),
            high_issues: Set(result.issues.high as i32),
            medium_issues: Set(result.issues.medium as i32),
            low_issues: Set(result.issues.low as i32),
            page_stats: Set(serde_json::to_value(&result.page_stats)?),
            pages: Set(serde_json::to_value(&result.pages)?),
            created_at: Set(result.created_at),
        };

        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(RepositoryError::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_scan_id(&self, scan_id: Uuid) -> Result<Option<AuditResult>, RepositoryError> {
        audit_result_entity::Entity::find_by_id(scan_id)
            .one(self.db.as_ref())
            .await?
            .map(AuditResult::try_from)
            .transpose()
    }
}
