// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

static PROMETHEUS: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// 初始化指标系统
///
/// 安装全局 Prometheus 记录器并注册扫描指标。可重复调用，
/// 之后的调用返回首次安装得到的句柄。
pub fn init_metrics() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                describe_metrics();
                Some(handle)
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
                None
            }
        })
        .clone()
}

fn describe_metrics() {
    describe_counter!(
        "auditrs_scans_started_total",
        "Total number of scans submitted to a backend"
    );
    describe_counter!(
        "auditrs_scans_completed_total",
        "Total number of scans completed"
    );
    describe_counter!("auditrs_scans_failed_total", "Total number of scans failed");
    describe_counter!(
        "auditrs_scans_cancelled_total",
        "Total number of scans cancelled"
    );
    describe_histogram!(
        "auditrs_scan_duration_seconds",
        "Duration of finished scans in seconds"
    );
}

pub fn record_scan_started(backend: &'static str) {
    counter!("auditrs_scans_started_total", "backend" => backend).increment(1);
}

pub fn record_scan_completed(backend: &'static str, duration_secs: Option<f64>) {
    counter!("auditrs_scans_completed_total", "backend" => backend).increment(1);
    if let Some(secs) = duration_secs {
        histogram!("auditrs_scan_duration_seconds", "backend" => backend).record(secs);
    }
}

pub fn record_scan_failed(backend: &'static str) {
    counter!("auditrs_scans_failed_total", "backend" => backend).increment(1);
}

pub fn record_scan_cancelled(backend: &'static str) {
    counter!("auditrs_scans_cancelled_total", "backend" => backend).increment(1);
}
