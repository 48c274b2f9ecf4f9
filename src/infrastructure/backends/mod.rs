// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 扫描后端实现
///
/// - `http`：外部审计 API
/// - `simulated`：不访问网络的模拟爬虫
/// - `crawler`：真实的站点爬虫
pub mod http_backend;
pub mod simulated_backend;
pub mod site_crawler;

use crate::config::settings::{ScanBackendKind, Settings};
use crate::domain::services::scan_backend::ScanBackend;
use http_backend::HttpScanBackend;
use simulated_backend::SimulatedCrawler;
use site_crawler::{CrawlerConfig, SiteCrawler};
use std::sync::Arc;

/// 根据 `scan.backend` 配置创建扫描后端
pub fn create_scan_backend(settings: &Settings) -> Arc<dyn ScanBackend> {
    match settings.scan.backend {
        ScanBackendKind::Http => Arc::new(HttpScanBackend::from_settings(&settings.audit_api)),
        ScanBackendKind::Simulated => Arc::new(SimulatedCrawler::new()),
        ScanBackendKind::Crawler => Arc::new(SiteCrawler::new(CrawlerConfig::from(&settings.scan))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_follows_settings() {
        let mut settings = Settings::from_builder(Settings::defaults().unwrap()).unwrap();
        assert_eq!(create_scan_backend(&settings).name(), "simulated");

        settings.scan.backend = ScanBackendKind::Http;
        assert_eq!(create_scan_backend(&settings).name(), "http");

        settings.scan.backend = ScanBackendKind::Crawler;
        assert_eq!(create_scan_backend(&settings).name(), "crawler");
    }
}
