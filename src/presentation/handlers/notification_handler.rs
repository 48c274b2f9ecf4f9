// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::notification_query::NotificationQuery;
use crate::domain::models::notification::Notification;
use crate::presentation::{errors::AppError, extractors::user_id::UserId, state::AppState};

const DEFAULT_LIMIT: u64 = 50;

pub async fn list_notifications(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    query.validate()?;
    let notifications = state
        .notifications
        .list_by_owner(owner_id, query.unread_only, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(notification_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .notifications
        .mark_read(notification_id, owner_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
