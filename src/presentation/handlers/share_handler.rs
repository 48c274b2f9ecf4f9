// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::share_request::{
    ShareRequestDto, ShareResponseDto, SharedEstimateViewDto,
};
use crate::presentation::{errors::AppError, extractors::user_id::UserId, state::AppState};

/// 分享扫描的优化报价
///
/// 请求体可省略，此时不记录收件人和附言
pub async fn create_share(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
    payload: Option<Json<ShareRequestDto>>,
) -> Result<(StatusCode, Json<ShareResponseDto>), AppError> {
    let request = payload.map(|Json(p)| p).unwrap_or_default();
    let shared = state.sharing.create_share(owner_id, scan_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShareResponseDto {
            path: format!("/v1/shared/{}", shared.token),
            token: shared.token,
            expires_at: shared.expires_at,
        }),
    ))
}

/// 公开查看分享的报价
pub async fn view_shared(
    Extension(state): Extension<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SharedEstimateViewDto>, AppError> {
    Ok(Json(state.sharing.view_shared(&token).await?))
}
