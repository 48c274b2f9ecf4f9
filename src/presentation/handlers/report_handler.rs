// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::domain::models::pdf_report::PdfReport;
use crate::presentation::{errors::AppError, extractors::user_id::UserId, state::AppState};

/// 为已完成的扫描生成 PDF 报告
pub async fn generate_report(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(scan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<PdfReport>), AppError> {
    let report = state.reports.generate(owner_id, scan_id).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// 下载 PDF 报告
pub async fn download_report(
    Extension(state): Extension<AppState>,
    UserId(owner_id): UserId,
    Path(report_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (report, bytes) = state.reports.download(owner_id, report_id).await?;
    let disposition = format!("attachment; filename=\"seo-audit-{}.pdf\"", report.scan_id);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
