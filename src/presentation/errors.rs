// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::use_cases::UseCaseError;
use crate::domain::models::scan_task::DomainError;
use crate::domain::models::shared_estimate::SharedEstimateError;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::scan_backend::BackendError;
use crate::workers::scan_tracker::StartError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，按错误类型映射为 HTTP 状态码
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<UseCaseError>() {
            return match err {
                UseCaseError::Validation(_) => StatusCode::BAD_REQUEST,
                UseCaseError::ScanNotFound | UseCaseError::ReportNotFound => StatusCode::NOT_FOUND,
                UseCaseError::Domain(e) => domain_status(e),
                UseCaseError::SharedEstimate(e) => shared_estimate_status(e),
                UseCaseError::Repository(e) => repository_status(e),
                UseCaseError::Other(e) if e.to_string().contains("not configured") => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                UseCaseError::Storage(_) | UseCaseError::Report(_) | UseCaseError::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
        }
        if let Some(err) = self.0.downcast_ref::<StartError>() {
            return match err {
                StartError::EmptyUrl | StartError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                StartError::Rejected(BackendError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
                StartError::Rejected(_) => StatusCode::BAD_GATEWAY,
                StartError::Repository(e) => repository_status(e),
            };
        }
        if let Some(err) = self.0.downcast_ref::<DomainError>() {
            return domain_status(err);
        }
        if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            return repository_status(err);
        }
        if self.0.downcast_ref::<validator::ValidationErrors>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidStateTransition(_) | DomainError::ResultNotReady(_) => {
            StatusCode::CONFLICT
        }
        DomainError::ValidationError(_) => StatusCode::BAD_REQUEST,
    }
}

fn shared_estimate_status(err: &SharedEstimateError) -> StatusCode {
    match err {
        SharedEstimateError::NotFound => StatusCode::NOT_FOUND,
        SharedEstimateError::Expired => StatusCode::GONE,
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::AlreadyExists => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::scan_task::ScanStatus;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (StartError::EmptyUrl.into(), StatusCode::BAD_REQUEST),
            (
                StartError::Rejected(BackendError::Network("timeout".into())).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (UseCaseError::ScanNotFound.into(), StatusCode::NOT_FOUND),
            (
                UseCaseError::from(SharedEstimateError::Expired).into(),
                StatusCode::GONE,
            ),
            (
                UseCaseError::from(DomainError::ResultNotReady(Uuid::new_v4())).into(),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::InvalidStateTransition(ScanStatus::Completed).into(),
                StatusCode::CONFLICT,
            ),
            (RepositoryError::NotFound.into(), StatusCode::NOT_FOUND),
            (
                UseCaseError::Other(anyhow::anyhow!("LLM API key not configured")).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (anyhow::anyhow!("boom").into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{:?}", err);
        }
    }
}
