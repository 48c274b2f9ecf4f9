// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库接口模块
///
/// 定义领域层的仓库接口，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 扫描任务仓库（scan_task_repository）
/// - 审计结果仓库（audit_result_repository）
/// - 通知仓库（notification_repository）
/// - 分享链接仓库（shared_estimate_repository）
/// - 报告仓库（pdf_report_repository）
/// - 存储仓库（storage_repository）：管理报告文件的存储
pub mod audit_result_repository;
pub mod notification_repository;
pub mod pdf_report_repository;
pub mod scan_task_repository;
pub mod shared_estimate_repository;
pub mod storage_repository;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 记录已存在
    #[error("Record already exists")]
    AlreadyExists,
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
