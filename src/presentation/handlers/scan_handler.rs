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

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::{self, Stream};
use tokio::sync::watch;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::scan_request::{ListScansQuery, StartScanRequestDto},
    domain::models::{
        audit_result::AuditResult, estimate::CostEstimate, scan_task::ScanTask,
    },
    domain::services::llm_service::AuditSummary,
    presentation::{errors::AppError, extractors::user_id::UserId, state::AppState},
};

/// 启动新的扫描
pub async fn start_scan(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Json(payload): Json<StartScanRequestDto>,
) -> Result<(StatusCode, Json<ScanTask>), AppError> {
    payload.validate()?;
    let options = payload.options.map(Into::into).unwrap_or_default();
    let task = state
        .tracker
        .start_scan(owner_id, &payload.url, options)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// 列出当前用户的扫描
pub async fn list_scans(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Query(query): Query<ListScansQuery>,
) -> Result<Json<Vec<ScanTask>>, AppError> {
    query.validate()?;
    let scans = state
        .audits
        .list_scans(owner_id, query.limit, query.offset)
        .await?;
    Ok(Json(scans))
}

/// 获取扫描详情
pub async fn get_scan(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
) -> Result<Json<ScanTask>, AppError> {
    Ok(Json(state.audits.get_scan(owner_id, scan_id).await?))
}

/// 取消进行中的扫描
pub async fn cancel_scan(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
) -> Result<Json<ScanTask>, AppError> {
    state.audits.get_scan(owner_id, scan_id).await?;
    let task = state.tracker.cancel_scan(scan_id).await?;
    Ok(Json(task))
}

enum EventFeed {
    Start(ScanTask, Option<watch::Receiver<ScanTask>>),
    Watch(watch::Receiver<ScanTask>),
    Done,
}

fn scan_event(task: &ScanTask) -> Result<Event, axum::Error> {
    Event::default().event("scan").json_data(task)
}

fn next_feed(task: &ScanTask, rx: Option<watch::Receiver<ScanTask>>) -> EventFeed {
    match rx {
        Some(rx) if !task.status.is_terminal() => EventFeed::Watch(rx),
        _ => EventFeed::Done,
    }
}

/// 扫描状态事件流（SSE）
///
/// 先发送当前状态，之后每次更新发送一次；扫描结束后关闭流
pub async fn scan_events(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    // Subscribe first: tracking ends only after the final state is stored,
    // so a missing receiver means the read below is already final.
    let rx = state.tracker.subscribe(scan_id);
    let stored = state.audits.get_scan(owner_id, scan_id).await?;
    let feed = match rx {
        Some(mut rx) => {
            let current = rx.borrow_and_update().clone();
            EventFeed::Start(current, Some(rx))
        }
        None => EventFeed::Start(stored, None),
    };

    let stream = stream::unfold(feed, |feed| async move {
        match feed {
            EventFeed::Start(task, rx) => Some((scan_event(&task), next_feed(&task, rx))),
            EventFeed::Watch(mut rx) => {
                rx.changed().await.ok()?;
                let task = rx.borrow_and_update().clone();
                Some((scan_event(&task), next_feed(&task, Some(rx))))
            }
            EventFeed::Done => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// 获取审计结果
pub async fn get_result(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
) -> Result<Json<AuditResult>, AppError> {
    Ok(Json(state.audits.get_result(owner_id, scan_id).await?))
}

/// 获取优化报价
pub async fn get_estimate(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
) -> Result<Json<CostEstimate>, AppError> {
    Ok(Json(state.audits.get_estimate(owner_id, scan_id).await?))
}

/// 获取站点地图 XML
pub async fn get_sitemap(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let xml = state.audits.get_sitemap(owner_id, scan_id).await?;
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}

/// 生成AI摘要
pub async fn summarize(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
) -> Result<Json<AuditSummary>, AppError> {
    Ok(Json(state.audits.summarize(owner_id, scan_id).await?))
}
