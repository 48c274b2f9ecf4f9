// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::{Notification, NotificationKind};
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::notification as notification_entity;
use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// 通知仓库实现
#[derive(Clone)]
pub struct NotificationRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<notification_entity::Model> for Notification {
    type Error = ();

    fn try_from(model: notification_entity::Model) -> Result<Self, Self::Error> {
        let kind: NotificationKind = model.kind.parse()?;
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            scan_id: model.scan_id,
            kind,
            title: model.title,
            message: model.message,
            read: model.is_read,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl NotificationRepository for NotificationRepositoryImpl {
    async fn create(&self, notification: &Notification) -> Result<(), RepositoryError> {
        let model = notification_entity::ActiveModel {
            id: Set(notification.id),
            owner_id: Set(notification.owner_id),
            scan_id: Set(notification.scan_id),
            kind: Set(notification.kind.to_string()),
            title: Set(notification.title.clone()),
            message: Set(notification.message.clone()),
            is_read: Set(notification.read),
            created_at: Set(notification.created_at),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        unread_only: bool,
        limit: u64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut query = notification_entity::Entity::find()
            .filter(notification_entity::Column::OwnerId.eq(owner_id));
        if unread_only {
            query = query.filter(notification_entity::Column::IsRead.eq(false));
        }

        let models = query
            .order_by_desc(notification_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id;
                Notification::try_from(model)
                    .map_err(|_| warn!(notification_id = %id, "Skipping notification with unknown kind"))
                    .ok()
            })
            .collect())
    }

    async fn mark_read(&self, id: Uuid, owner_id: Uuid) -> Result<(), RepositoryError> {
        let result = notification_entity::Entity::update_many()
            .col_expr(notification_entity::Column::IsRead, Expr::value(true))
            .filter(notification_entity::Column::Id.eq(id))
            .filter(notification_entity::Column::OwnerId.eq(owner_id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_connection;
    use chrono::Duration;

    #[tokio::test]
    async fn test_list_filter_and_mark_read() {
        let repo = NotificationRepositoryImpl::new(test_connection().await);
        let owner = Uuid::new_v4();

        let older = Notification::new(
            owner,
            None,
            NotificationKind::ScanCompleted,
            "Scan completed",
            "https://a.test scored 80",
        );
        let mut newer = Notification::new(
            owner,
            None,
            NotificationKind::ScanFailed,
            "Scan failed",
            "https://b.test could not be reached",
        );
        newer.created_at = older.created_at + Duration::seconds(5);
        let foreign = Notification::new(
            Uuid::new_v4(),
            None,
            NotificationKind::ReportReady,
            "Report ready",
            "",
        );

        for n in [&older, &newer, &foreign] {
            repo.create(n).await.unwrap();
        }

        let all = repo.list_by_owner(owner, false, 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[0].kind, NotificationKind::ScanFailed);

        repo.mark_read(older.id, owner).await.unwrap();
        let unread = repo.list_by_owner(owner, true, 10).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, newer.id);

        // other owners cannot mark someone else's notification
        assert!(matches!(
            repo.mark_read(foreign.id, owner).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
