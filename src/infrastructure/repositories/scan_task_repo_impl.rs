// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::scan_task::{ScanStatus, ScanTask};
use crate::domain::repositories::scan_task_repository::ScanTaskRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::scan_task as scan_task_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 扫描任务仓库实现
///
/// 基于SeaORM实现的扫描任务数据访问层
#[derive(Clone)]
pub struct ScanTaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ScanTaskRepositoryImpl {
    /// 创建新的扫描任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<scan_task_entity::Model> for ScanTask {
    fn from(model: scan_task_entity::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            url: model.url,
            backend_task_id: model.backend_task_id,
            status: model.status.parse().unwrap_or_default(),
            progress: model.progress.clamp(0, 100) as u8,
            pages_scanned: model.pages_scanned.max(0) as u32,
            estimated_total_pages: model.estimated_total_pages.max(0) as u32,
            current_url: model.current_url,
            error_message: model.error_message,
            options: serde_json::from_value(model.options).unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
        }
    }
}

impl From<ScanTask> for scan_task_entity::ActiveModel {
    fn from(task: ScanTask) -> Self {
        Self {
            id: Set(task.id),
            owner_id: Set(task.owner_id),
            url: Set(task.url),
            backend_task_id: Set(task.backend_task_id),
            status: Set(task.status.to_string()),
            progress: Set(task.progress as i32),
            pages_scanned: Set(task.pages_scanned as i32),
            estimated_total_pages: Set(task.estimated_total_pages as i32),
            current_url: Set(task.current_url),
            error_message: Set(task.error_message),
            options: Set(serde_json::to_value(&task.options).unwrap_or_default()),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
            started_at: Set(task.started_at),
            completed_at: Set(task.completed_at),
        }
    }
}

#[async_trait]
impl ScanTaskRepository for ScanTaskRepositoryImpl {
    async fn create(&self, task: &ScanTask) -> Result<ScanTask, RepositoryError> {
        let model: scan_task_entity::ActiveModel = task.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(task.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScanTask>, RepositoryError> {
        let model = scan_task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, task: &ScanTask) -> Result<ScanTask, RepositoryError> {
        let mut model: scan_task_entity::ActiveModel = task.clone().into();
        // The primary key must stay unchanged for an UPDATE.
        model.id = sea_orm::ActiveValue::Unchanged(task.id);

        match model.update(self.db.as_ref()).await {
            Ok(updated) => Ok(updated.into()),
            Err(DbErr::RecordNotUpdated) => Err(RepositoryError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ScanTask>, RepositoryError> {
        let models = scan_task_entity::Entity::find()
            .filter(scan_task_entity::Column::OwnerId.eq(owner_id))
            .order_by_desc(scan_task_entity::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_unfinished(&self) -> Result<Vec<ScanTask>, RepositoryError> {
        let models = scan_task_entity::Entity::find()
            .filter(scan_task_entity::Column::Status.is_in([
                ScanStatus::Pending.to_string(),
                ScanStatus::InProgress.to_string(),
            ]))
            .order_by_asc(scan_task_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
