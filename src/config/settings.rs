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

use crate::domain::services::cost_estimator::PricingTable;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、数据库、扫描后端、报价、分享、存储和LLM等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 扫描配置
    pub scan: ScanSettings,
    /// 外部审计API配置
    pub audit_api: AuditApiSettings,
    /// 报价表
    pub pricing: PricingTable,
    /// 分享与过期配置
    pub sharing: SharingSettings,
    /// 存储配置
    pub storage: StorageSettings,
    /// LLM配置
    pub llm: LlmSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 扫描后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanBackendKind {
    /// 外部审计任务API
    Http,
    /// 模拟爬虫
    Simulated,
    /// 内置站点爬虫
    Crawler,
}

/// 扫描配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScanSettings {
    /// 使用的扫描后端
    pub backend: ScanBackendKind,
    /// 轮询间隔（毫秒），未设置时使用后端推荐值
    pub poll_interval_ms: Option<u64>,
    /// 未指定 max_pages 时的页面上限
    pub default_max_pages: u32,
    /// 爬虫单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 爬虫默认 User-Agent
    pub user_agent: String,
    /// 是否允许爬取内网地址
    pub allow_private_hosts: bool,
}

impl ScanSettings {
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms.map(Duration::from_millis)
    }
}

/// 外部审计API配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AuditApiSettings {
    /// API基础URL
    pub base_url: String,
    /// API密钥
    pub api_key: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

/// 分享与过期配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SharingSettings {
    /// 分享链接有效期（小时）
    pub estimate_ttl_hours: i64,
    /// PDF报告保留天数
    pub report_ttl_days: i64,
    /// 过期清理间隔（秒）
    pub cleanup_interval_secs: u64,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 本地存储路径
    pub local_path: String,
}

/// LLM配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// API密钥
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// API基础URL
    pub base_url: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `AUDITRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("AUDITRS").separator("__"));

        Self::from_builder(builder)
    }

    /// 只包含默认值的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let pricing = PricingTable::default();
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.url", "sqlite://auditrs.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default scan settings
            .set_default("scan.backend", "simulated")?
            .set_default("scan.default_max_pages", 50)?
            .set_default("scan.request_timeout_secs", 15)?
            .set_default("scan.user_agent", "auditrs/0.1")?
            .set_default("scan.allow_private_hosts", false)?
            .set_default("audit_api.base_url", "http://localhost:8080/api")?
            .set_default("audit_api.timeout_secs", 30)?
            // Default pricing, in cents
            .set_default("pricing.currency", pricing.currency)?
            .set_default("pricing.critical_cents", pricing.critical_cents as i64)?
            .set_default("pricing.high_cents", pricing.high_cents as i64)?
            .set_default("pricing.medium_cents", pricing.medium_cents as i64)?
            .set_default("pricing.low_cents", pricing.low_cents as i64)?
            .set_default(
                "pricing.minimum_charge_cents",
                pricing.minimum_charge_cents as i64,
            )?
            .set_default("sharing.estimate_ttl_hours", 72)?
            .set_default("sharing.report_ttl_days", 30)?
            .set_default("sharing.cleanup_interval_secs", 3600)?
            .set_default("storage.local_path", "./storage")?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.base_url", "https://api.openai.com/v1")
    }

    /// 从构建器生成配置
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;
