// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::AuditResult;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 审计结果仓库特质
#[async_trait]
pub trait AuditResultRepository: Send + Sync {
    /// 保存审计结果，同一扫描已存在结果时返回 `AlreadyExists`
    async fn save(&self, result: &AuditResult) -> Result<(), RepositoryError>;
    /// 根据扫描ID查找结果
    async fn find_by_scan_id(&self, scan_id: Uuid) -> Result<Option<AuditResult>, RepositoryError>;
}
