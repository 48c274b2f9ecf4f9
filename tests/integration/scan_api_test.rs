// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, create_test_app_with_tick, USER_HEADER};
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

/// 测试扫描完整流程
///
/// 启动扫描后等待完成，随后结果、报价和站点地图均可获取
#[tokio::test]
async fn test_scan_lifecycle() {
    let app = create_test_app().await;
    let scan_id = app.start_scan("Example.com").await;

    let task = app.wait_for_terminal(scan_id).await;
    assert_eq!(task["status"], "completed");
    assert_eq!(task["url"], "https://example.com/");
    assert_eq!(task["progress"], 100);
    assert_eq!(task["pages_scanned"], 6);

    let result: Value = app
        .server
        .get(&format!("/v1/scans/{}/result", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .json();
    assert_eq!(result["scan_id"], scan_id.to_string());
    assert!(result["scores"]["global"].as_u64().unwrap() <= 100);

    let estimate = app
        .server
        .get(&format!("/v1/scans/{}/estimate", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await;
    estimate.assert_status_ok();
    let estimate: Value = estimate.json();
    assert_eq!(estimate["currency"], "EUR");
    assert!(
        estimate["total_cents"].as_u64().unwrap() >= estimate["subtotal_cents"].as_u64().unwrap()
    );

    let sitemap = app
        .server
        .get(&format!("/v1/scans/{}/sitemap.xml", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await;
    sitemap.assert_status_ok();
    assert!(sitemap
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("application/xml"));
    assert!(sitemap.text().contains("<urlset"));

    let scans: Value = app
        .server
        .get("/v1/scans")
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .json();
    assert_eq!(scans.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_start_scan_rejects_invalid_input() {
    let app = create_test_app().await;

    for body in [
        json!({ "url": "" }),
        json!({ "url": "ftp://example.com" }),
        json!({ "url": "https://example.com", "options": { "max_pages": 0 } }),
    ] {
        let response = app
            .server
            .post("/v1/scans")
            .add_header(USER_HEADER, app.owner.to_string())
            .json(&body)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert!(error["error"].is_string());
    }

    let scans: Value = app
        .server
        .get("/v1/scans")
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .json();
    assert!(scans.as_array().unwrap().is_empty());
}

/// 扫描只对其所有者可见
#[tokio::test]
async fn test_scans_are_scoped_to_owner() {
    let app = create_test_app().await;
    let scan_id = app.completed_scan("https://example.com").await;

    let stranger = Uuid::new_v4().to_string();
    for path in [
        format!("/v1/scans/{}", scan_id),
        format!("/v1/scans/{}/result", scan_id),
        format!("/v1/scans/{}/estimate", scan_id),
    ] {
        app.server
            .get(&path)
            .add_header(USER_HEADER, stranger.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    app.server
        .delete(&format!("/v1/scans/{}", scan_id))
        .add_header(USER_HEADER, stranger)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// 进行中的扫描没有结果，可以取消且只能取消一次
#[tokio::test]
async fn test_cancel_running_scan() {
    let app = create_test_app_with_tick(Duration::from_secs(60)).await;
    let scan_id = app.start_scan("https://example.com").await;

    app.server
        .get(&format!("/v1/scans/{}/result", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .assert_status(StatusCode::CONFLICT);

    let response = app
        .server
        .delete(&format!("/v1/scans/{}", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await;
    response.assert_status_ok();
    let task: Value = response.json();
    assert_eq!(task["status"], "cancelled");
    assert!(task["completed_at"].is_string());

    app.server
        .delete(&format!("/v1/scans/{}", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(app.state.tracker.active_count(), 0);
}

/// 事件流发送当前状态和后续更新，扫描结束后关闭
#[tokio::test]
async fn test_scan_events_stream_until_finished() {
    let app = create_test_app().await;
    let scan_id = app.start_scan("https://example.com").await;

    let response = app
        .server
        .get(&format!("/v1/scans/{}/events", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await;
    response.assert_status_ok();
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let body = response.text();
    assert!(body.contains("event: scan"));
    let last = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .last()
        .unwrap();
    let task: Value = serde_json::from_str(last).unwrap();
    assert_eq!(task["status"], "completed");
}

/// 已结束扫描的事件流只发送一次最终状态
#[tokio::test]
async fn test_scan_events_for_finished_scan_send_final_state() {
    let app = create_test_app().await;
    let scan_id = app.completed_scan("https://example.com").await;

    let response = app
        .server
        .get(&format!("/v1/scans/{}/events", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await;
    response.assert_status_ok();

    let body = response.text();
    let events: Vec<Value> = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["status"], "completed");
    assert_eq!(events[0]["progress"], 100);
}

/// 未配置LLM时摘要接口返回503
#[tokio::test]
async fn test_summary_requires_llm() {
    let app = create_test_app().await;
    let scan_id = app.completed_scan("https://example.com").await;

    app.server
        .post(&format!("/v1/scans/{}/summary", scan_id))
        .add_header(USER_HEADER, app.owner.to_string())
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
