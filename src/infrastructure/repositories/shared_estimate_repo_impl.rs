// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::shared_estimate::SharedEstimate;
use crate::domain::repositories::shared_estimate_repository::SharedEstimateRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::shared_estimate as shared_estimate_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;

/// 分享链接仓库实现
#[derive(Clone)]
pub struct SharedEstimateRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl SharedEstimateRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<shared_estimate_entity::Model> for SharedEstimate {
    fn from(model: shared_estimate_entity::Model) -> Self {
        Self {
            id: model.id,
            token: model.token,
            scan_id: model.scan_id,
            owner_id: model.owner_id,
            recipient_email: model.recipient_email,
            message: model.message,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

impl From<SharedEstimate> for shared_estimate_entity::ActiveModel {
    fn from(shared: SharedEstimate) -> Self {
        Self {
            id: Set(shared.id),
            token: Set(shared.token),
            scan_id: Set(shared.scan_id),
            owner_id: Set(shared.owner_id),
            recipient_email: Set(shared.recipient_email),
            message: Set(shared.message),
            created_at: Set(shared.created_at),
            expires_at: Set(shared.expires_at),
        }
    }
}

#[async_trait]
impl SharedEstimateRepository for SharedEstimateRepositoryImpl {
    async fn create(&self, shared: &SharedEstimate) -> Result<(), RepositoryError> {
        let model: shared_estimate_entity::ActiveModel = shared.clone().into();
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SharedEstimate>, RepositoryError> {
        let model = shared_estimate_entity::Entity::find()
            .filter(shared_estimate_entity::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn delete_expired(&self, now: DateTime<FixedOffset>) -> Result<u64, RepositoryError> {
        let result = shared_estimate_entity::Entity::delete_many()
            .filter(shared_estimate_entity::Column::ExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::scan_task::{ScanOptions, ScanTask};
    use crate::domain::repositories::scan_task_repository::ScanTaskRepository;
    use crate::infrastructure::database::test_connection;
    use crate::infrastructure::repositories::scan_task_repo_impl::ScanTaskRepositoryImpl;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_find_by_token_and_delete_expired() {
        let db = test_connection().await;
        let tasks = ScanTaskRepositoryImpl::new(db.clone());
        let repo = SharedEstimateRepositoryImpl::new(db);

        let task = ScanTask::new(
            Uuid::new_v4(),
            "https://acme.test".to_string(),
            ScanOptions::default(),
        );
        tasks.create(&task).await.unwrap();

        let live = SharedEstimate::new(
            task.id,
            task.owner_id,
            Some("client@acme.test".to_string()),
            None,
            Duration::hours(24),
        );
        let mut stale = SharedEstimate::new(task.id, task.owner_id, None, None, Duration::hours(1));
        stale.expires_at = (Utc::now() - Duration::hours(1)).into();

        repo.create(&live).await.unwrap();
        repo.create(&stale).await.unwrap();

        let found = repo.find_by_token(&live.token).await.unwrap().unwrap();
        assert_eq!(found.recipient_email.as_deref(), Some("client@acme.test"));
        assert!(repo.find_by_token("missing").await.unwrap().is_none());

        let deleted = repo.delete_expired(Utc::now().into()).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.find_by_token(&stale.token).await.unwrap().is_none());
        assert!(repo.find_by_token(&live.token).await.unwrap().is_some());
    }
}
