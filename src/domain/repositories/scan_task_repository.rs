// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scan_task::ScanTask;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 扫描任务仓库特质
///
/// 定义扫描任务数据访问接口
#[async_trait]
pub trait ScanTaskRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, task: &ScanTask) -> Result<ScanTask, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScanTask>, RepositoryError>;
    /// 更新任务（最后写入者生效）
    async fn update(&self, task: &ScanTask) -> Result<ScanTask, RepositoryError>;
    /// 按创建时间倒序列出用户的任务
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ScanTask>, RepositoryError>;
    /// 查找所有未终止的任务
    async fn find_unfinished(&self) -> Result<Vec<ScanTask>, RepositoryError>;
}
