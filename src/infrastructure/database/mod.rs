// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库模块
///
/// 提供数据库连接和实体管理功能
/// 包括数据库连接池和实体定义
pub mod connection;
pub mod entities;

/// 已执行迁移的内存 SQLite 连接，供仓库测试使用
#[cfg(test)]
pub(crate) async fn test_connection() -> std::sync::Arc<sea_orm::DatabaseConnection> {
    use migration::MigratorTrait;

    let settings = crate::config::settings::DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: None,
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
    };
    let db = connection::create_pool(&settings).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    std::sync::Arc::new(db)
}
