// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::pdf_report::PdfReport;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// 报告仓库特质
#[async_trait]
pub trait PdfReportRepository: Send + Sync {
    async fn create(&self, report: &PdfReport) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PdfReport>, RepositoryError>;
    /// 查找在给定时间之前过期的报告
    async fn find_expired(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<PdfReport>, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
