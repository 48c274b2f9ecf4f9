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

use super::helpers::create_test_app;
use axum::http::StatusCode;

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn version_reports_package_version() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/version").await;

    response.assert_text(env!("CARGO_PKG_VERSION"));
}

/// 未安装指标记录器时返回503
#[tokio::test]
async fn metrics_without_recorder_is_unavailable() {
    let app = create_test_app().await;

    let response = app.server.get("/metrics").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

/// 缺少用户标识时返回401
#[tokio::test]
async fn scan_endpoints_require_user_header() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/scans").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/v1/scans")
        .add_header("X-User-Id", "not-a-uuid")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
