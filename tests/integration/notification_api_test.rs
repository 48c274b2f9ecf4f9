// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, USER_HEADER};
use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

/// 扫描完成后产生通知，标记已读后不再出现在未读列表中
#[tokio::test]
async fn test_completion_notification_and_mark_read() {
    let app = create_test_app().await;
    let scan_id = app.completed_scan("https://example.com").await;

    // The notification is written right after the task is committed.
    let mut notifications = Vec::new();
    for _ in 0..100 {
        let body: Value = app
            .server
            .get("/v1/notifications")
            .add_query_param("unread_only", true)
            .add_header(USER_HEADER, app.owner.to_string())
            .await
            .json();
        notifications = body.as_array().unwrap().clone();
        if !notifications.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(notifications.len(), 1);
    let notification = &notifications[0];
    assert_eq!(notification["kind"], "scan_completed");
    assert_eq!(notification["scan_id"], scan_id.to_string());
    assert_eq!(notification["read"], false);

    let id = notification["id"].as_str().unwrap();
    app.server
        .post(&format!("/v1/notifications/{}/read", id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let unread: Value = app
        .server
        .get("/v1/notifications?unread_only=true")
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .json();
    assert!(unread.as_array().unwrap().is_empty());

    let all: Value = app
        .server
        .get("/v1/notifications")
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .json();
    assert_eq!(all[0]["read"], true);
}

#[tokio::test]
async fn test_mark_read_of_foreign_notification_is_not_found() {
    let app = create_test_app().await;

    app.server
        .post(&format!("/v1/notifications/{}/read", Uuid::new_v4()))
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notification_limit_is_validated() {
    let app = create_test_app().await;

    app.server
        .get("/v1/notifications?limit=0")
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
