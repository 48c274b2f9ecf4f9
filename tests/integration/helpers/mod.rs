// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use auditrs::config::settings::Settings;
use auditrs::domain::services::llm_service::LLMService;
use auditrs::domain::services::scan_backend::ScanBackend;
use auditrs::infrastructure::backends::simulated_backend::SimulatedCrawler;
use auditrs::infrastructure::database::connection;
use auditrs::infrastructure::storage::InMemoryStorage;
use auditrs::presentation::routes;
use auditrs::presentation::state::AppState;
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const USER_HEADER: &str = "X-User-Id";

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub state: AppState,
    pub owner: Uuid,
}

/// 使用快速推进的模拟后端创建测试应用
pub async fn create_test_app() -> TestApp {
    create_test_app_with_tick(Duration::from_millis(5)).await
}

/// 使用指定推进周期的模拟后端创建测试应用
pub async fn create_test_app_with_tick(tick: Duration) -> TestApp {
    let builder = Settings::defaults()
        .unwrap()
        .set_override("database.url", "sqlite::memory:")
        .unwrap()
        .set_override("scan.poll_interval_ms", 10)
        .unwrap();
    let settings = Settings::from_builder(builder).unwrap();

    let db = Arc::new(connection::create_pool(&settings.database).await.unwrap());
    Migrator::up(db.as_ref(), None).await.unwrap();

    let backend: Arc<dyn ScanBackend> = Arc::new(SimulatedCrawler::with_tick(tick));
    let llm = Arc::new(LLMService::new_with_config(
        None,
        settings.llm.model.clone(),
        settings.llm.base_url.clone(),
    ));
    let state = AppState::new(
        &settings,
        db.clone(),
        backend,
        Arc::new(InMemoryStorage::new()),
        llm,
        None,
    );

    let server = TestServer::new(routes::routes(state.clone())).unwrap();
    TestApp {
        server,
        db,
        state,
        owner: Uuid::new_v4(),
    }
}

impl TestApp {
    /// 以当前用户身份启动扫描，返回任务ID
    pub async fn start_scan(&self, url: &str) -> Uuid {
        let response = self
            .server
            .post("/v1/scans")
            .add_header(USER_HEADER, self.owner.to_string())
            .json(&json!({ "url": url, "options": { "max_pages": 6 } }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }

    /// 轮询扫描详情直到进入终止状态
    pub async fn wait_for_terminal(&self, scan_id: Uuid) -> Value {
        for _ in 0..500 {
            let body: Value = self
                .server
                .get(&format!("/v1/scans/{}", scan_id))
                .add_header(USER_HEADER, self.owner.to_string())
                .await
                .json();
            if matches!(
                body["status"].as_str(),
                Some("completed" | "failed" | "cancelled")
            ) {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("scan {} did not finish", scan_id);
    }

    /// 启动并等待扫描完成
    pub async fn completed_scan(&self, url: &str) -> Uuid {
        let scan_id = self.start_scan(url).await;
        let task = self.wait_for_terminal(scan_id).await;
        assert_eq!(task["status"], "completed");
        scan_id
    }
}
