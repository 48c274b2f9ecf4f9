// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, USER_HEADER};
use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

/// 测试生成并下载 PDF 报告
#[tokio::test]
async fn test_generate_and_download_report() {
    let app = create_test_app().await;
    let scan_id = app.completed_scan("https://example.com").await;

    let response = app
        .server
        .post(&format!("/v1/scans/{}/report", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await;
    response.assert_status(StatusCode::CREATED);
    let report: Value = response.json();
    let report_id = report["id"].as_str().unwrap();
    assert_eq!(report["scan_id"], scan_id.to_string());

    let response = app
        .server
        .get(&format!("/v1/reports/{}", report_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    assert!(response
        .header("content-disposition")
        .to_str()
        .unwrap()
        .starts_with("attachment;"));
    let bytes = response.as_bytes();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(bytes.len() as u64, report["size_bytes"].as_u64().unwrap());

    app.server
        .get(&format!("/v1/reports/{}", report_id))
        .add_header(USER_HEADER, Uuid::new_v4().to_string())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_for_unknown_scan_is_not_found() {
    let app = create_test_app().await;

    app.server
        .post(&format!("/v1/scans/{}/report", Uuid::new_v4()))
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
