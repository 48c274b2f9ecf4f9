// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::{
    metrics_handler, notification_handler, report_handler, scan_handler, share_handler,
};
use crate::presentation::state::AppState;
use axum::{
    routing::{get, post},
    Extension, Router,
};

/// 创建应用路由
///
/// # 参数
///
/// * `state` - 共享的应用状态，以 `Extension` 注入所有处理器
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/metrics", get(metrics_handler::metrics))
        .route("/v1/shared/{token}", get(share_handler::view_shared));

    let scan_routes = Router::new()
        .route(
            "/v1/scans",
            post(scan_handler::start_scan).get(scan_handler::list_scans),
        )
        .route(
            "/v1/scans/{id}",
            get(scan_handler::get_scan).delete(scan_handler::cancel_scan),
        )
        .route("/v1/scans/{id}/events", get(scan_handler::scan_events))
        .route("/v1/scans/{id}/result", get(scan_handler::get_result))
        .route("/v1/scans/{id}/estimate", get(scan_handler::get_estimate))
        .route("/v1/scans/{id}/sitemap.xml", get(scan_handler::get_sitemap))
        .route("/v1/scans/{id}/summary", post(scan_handler::summarize))
        .route("/v1/scans/{id}/report", post(report_handler::generate_report))
        .route("/v1/scans/{id}/share", post(share_handler::create_share))
        .route("/v1/reports/{id}", get(report_handler::download_report));

    let notification_routes = Router::new()
        .route(
            "/v1/notifications",
            get(notification_handler::list_notifications),
        )
        .route(
            "/v1/notifications/{id}/read",
            post(notification_handler::mark_read),
        );

    Router::new()
        .merge(public_routes)
        .merge(scan_routes)
        .merge(notification_routes)
        .layer(Extension(state))
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
