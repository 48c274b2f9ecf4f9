// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, create_test_app_with_tick, USER_HEADER};
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// 测试分享报价并通过公开链接查看
#[tokio::test]
async fn test_share_estimate_and_view_publicly() {
    let app = create_test_app().await;
    let scan_id = app.completed_scan("https://example.com").await;

    let response = app
        .server
        .post(&format!("/v1/scans/{}/share", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .json(&json!({
            "recipient_email": "client@example.com",
            "message": "Estimate for the spring redesign"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let shared: Value = response.json();
    let token = shared["token"].as_str().unwrap();
    assert_eq!(token.len(), 32);
    assert_eq!(shared["path"], format!("/v1/shared/{}", token));

    let estimate: Value = app
        .server
        .get(&format!("/v1/scans/{}/estimate", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .json();

    // No user header on the public link.
    let response = app.server.get(&format!("/v1/shared/{}", token)).await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["url"], "https://example.com/");
    assert_eq!(view["estimate"]["total_cents"], estimate["total_cents"]);
    assert_eq!(view["message"], "Estimate for the spring redesign");
}

#[tokio::test]
async fn test_share_without_body() {
    let app = create_test_app().await;
    let scan_id = app.completed_scan("https://example.com").await;

    let response = app
        .server
        .post(&format!("/v1/scans/{}/share", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await;
    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_share_rejects_invalid_email() {
    let app = create_test_app().await;
    let scan_id = app.completed_scan("https://example.com").await;

    app.server
        .post(&format!("/v1/scans/{}/share", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .json(&json!({ "recipient_email": "not-an-email" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// 未完成的扫描不能分享
#[tokio::test]
async fn test_share_requires_completed_scan() {
    let app = create_test_app_with_tick(Duration::from_secs(60)).await;
    let scan_id = app.start_scan("https://example.com").await;

    app.server
        .post(&format!("/v1/scans/{}/share", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .json(&json!({}))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_share_token_is_not_found() {
    let app = create_test_app().await;

    app.server
        .get("/v1/shared/0123456789abcdef0123456789abcdef")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
