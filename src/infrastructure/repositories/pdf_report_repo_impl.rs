// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::pdf_report::PdfReport;
use crate::domain::repositories::pdf_report_repository::PdfReportRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::pdf_report as pdf_report_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// PDF报告仓库实现
#[derive(Clone)]
pub struct PdfReportRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl PdfReportRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<pdf_report_entity::Model> for PdfReport {
    fn from(model: pdf_report_entity::Model) -> Self {
        Self {
            id: model.id,
            scan_id: model.scan_id,
            owner_id: model.owner_id,
            storage_key: model.storage_key,
            size_bytes: model.size_bytes.max(0) as u64,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

#[async_trait]
impl PdfReportRepository for PdfReportRepositoryImpl {
    async fn create(&self, report: &PdfReport) -> Result<(), RepositoryError> {
        let model = pdf_report_entity::ActiveModel {
            id: Set(report.id),
            scan_id: Set(report.scan_id),
            owner_id: Set(report.owner_id),
            storage_key: Set(report.storage_key.clone()),
            size_bytes: Set(report.size_bytes as i64),
            created_at: Set(report.created_at),
            expires_at: Set(report.expires_at),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PdfReport>, RepositoryError> {
        let model = pdf_report_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_expired(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<PdfReport>, RepositoryError> {
        let models = pdf_report_entity::Entity::find()
            .filter(pdf_report_entity::Column::ExpiresAt.lte(now))
            .order_by_asc(pdf_report_entity::Column::ExpiresAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        pdf_report_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }
}
