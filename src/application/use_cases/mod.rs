// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 包含应用程序的业务用例实现
/// 每个用例代表一个完整的业务流程，遵循单一职责原则
pub mod audit_use_case;
pub mod report_use_case;
pub mod share_use_case;

use crate::domain::models::audit_result::AuditResult;
use crate::domain::models::scan_task::{DomainError, ScanStatus, ScanTask};
use crate::domain::models::shared_estimate::SharedEstimateError;
use crate::domain::repositories::audit_result_repository::AuditResultRepository;
use crate::domain::repositories::scan_task_repository::ScanTaskRepository;
use crate::domain::repositories::storage_repository::StorageError;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::report_service::ReportError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Scan not found")]
    ScanNotFound,
    #[error("Report not found")]
    ReportNotFound,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    SharedEstimate(#[from] SharedEstimateError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 查找属于用户的扫描任务
///
/// 不属于该用户的扫描与不存在的扫描一样返回 `ScanNotFound`
pub(crate) async fn find_owned_scan(
    tasks: &dyn ScanTaskRepository,
    owner_id: Uuid,
    scan_id: Uuid,
) -> Result<ScanTask, UseCaseError> {
    tasks
        .find_by_id(scan_id)
        .await?
        .filter(|task| task.owner_id == owner_id)
        .ok_or(UseCaseError::ScanNotFound)
}

/// 查找已完成扫描及其审计结果
pub(crate) async fn find_completed_scan(
    tasks: &dyn ScanTaskRepository,
    results: &dyn AuditResultRepository,
    owner_id: Uuid,
    scan_id: Uuid,
) -> Result<(ScanTask, AuditResult), UseCaseError> {
    let task = find_owned_scan(tasks, owner_id, scan_id).await?;
    if task.status != ScanStatus::Completed {
        return Err(DomainError::ResultNotReady(scan_id).into());
    }
    let result = results
        .find_by_scan_id(scan_id)
        .await?
        .ok_or(DomainError::ResultNotReady(scan_id))?;
    Ok((task, result))
}
