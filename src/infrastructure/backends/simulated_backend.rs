// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::{
    AuditFindings, AuditScores, IssueCounts, PageStats, PageSummary,
};
use crate::domain::models::scan_task::{ScanOptions, ScanSnapshot, ScanStatus};
use crate::domain::services::scan_backend::{BackendError, ScanBackend};
use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// 生成示例URL时使用的常见栏目
const SAMPLE_SECTIONS: &[&str] = &[
    "about", "services", "products", "blog", "contact", "pricing", "faq", "team", "careers",
    "news", "support", "privacy", "terms",
];

const MIN_SIMULATED_PAGES: u32 = 20;
const MAX_SIMULATED_PAGES: u32 = 60;

struct SimulatedScan {
    snapshot: ScanSnapshot,
    findings: Option<AuditFindings>,
    token: CancellationToken,
}

/// 模拟爬虫后端
///
/// 不访问网络。启动时确定预计页面数并生成示例URL，之后每个周期
/// 前进 1-3 个页面；全部访问完成后生成随机评分的审计发现。
#[derive(Clone)]
pub struct SimulatedCrawler {
    scans: Arc<DashMap<String, SimulatedScan>>,
    tick: Duration,
}

impl Default for SimulatedCrawler {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCrawler {
    pub fn new() -> Self {
        Self::with_tick(Duration::from_secs(1))
    }

    /// 使用自定义推进周期创建（测试中使用较短周期）
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            scans: Arc::new(DashMap::new()),
            tick,
        }
    }

    fn advance(scans: &DashMap<String, SimulatedScan>, id: &str, urls: &[String]) -> bool {
        let Some(mut scan) = scans.get_mut(id) else {
            return true;
        };
        let total = scan.snapshot.estimated_total_pages;
        let step = rand::rng().random_range(1..=3);
        let scanned = (scan.snapshot.pages_scanned + step).min(total);

        let snapshot = &mut scan.snapshot;
        snapshot.pages_scanned = scanned;
        snapshot.progress = (scanned * 100 / total.max(1)).min(100) as u8;
        snapshot.current_url = urls.get(scanned.saturating_sub(1) as usize).cloned();
        snapshot.status = ScanStatus::InProgress;

        if scanned >= total {
            // Counters and findings become visible together.
            snapshot.status = ScanStatus::Completed;
            snapshot.progress = 100;
            scan.findings = Some(synthesize_findings(urls));
            return true;
        }
        false
    }
}

/// 生成 `count` 个以 `base` 为前缀的示例URL
///
/// `base` 的结尾斜杠会被去掉；第一个URL为 `base + "/"`。
pub fn generate_sample_urls(base: &str, count: usize) -> Vec<String> {
    let base = base.trim_end_matches('/');
    (0..count)
        .map(|i| {
            if i == 0 {
                return format!("{}/", base);
            }
            let section = SAMPLE_SECTIONS[(i - 1) % SAMPLE_SECTIONS.len()];
            let round = (i - 1) / SAMPLE_SECTIONS.len();
            if round == 0 {
                format!("{}/{}", base, section)
            } else {
                format!("{}/{}/page-{}", base, section, round)
            }
        })
        .collect()
}

fn synthesize_findings(urls: &[String]) -> AuditFindings {
    let mut rng = rand::rng();

    let seo = rng.random_range(50..=95u8);
    let technical = rng.random_range(50..=95u8);
    let content = rng.random_range(50..=95u8);
    let performance = rng.random_range(50..=95u8);
    let global = (0.30 * seo as f64
        + 0.25 * technical as f64
        + 0.25 * content as f64
        + 0.20 * performance as f64)
        .round() as u8;

    let total_pages = urls.len() as u32;
    let issues = IssueCounts {
        critical: rng.random_range(0..=3u32).min(total_pages),
        high: rng.random_range(0..=8),
        medium: rng.random_range(0..=15),
        low: rng.random_range(0..=25),
    };

    let pages: Vec<PageSummary> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| PageSummary {
            url: url.clone(),
            // the last `critical` pages are reported broken
            status_code: if (i as u32) < total_pages - issues.critical {
                200
            } else {
                404
            },
            load_time_ms: rng.random_range(150..=3000),
            issue_count: rng.random_range(0..=5),
            depth: Url::parse(url)
                .ok()
                .and_then(|u| u.path_segments().map(|s| s.filter(|p| !p.is_empty()).count()))
                .unwrap_or(0) as u32,
        })
        .collect();

    let average_load_time_ms = if pages.is_empty() {
        0
    } else {
        pages.iter().map(|p| p.load_time_ms).sum::<u64>() / pages.len() as u64
    };

    AuditFindings {
        scores: AuditScores {
            global,
            seo,
            technical,
            content,
            performance,
        },
        issues,
        page_stats: PageStats {
            total_pages,
            pages_with_issues: pages.iter().filter(|p| p.issue_count > 0).count() as u32,
            broken_pages: issues.critical,
            average_load_time_ms,
            average_word_count: rng.random_range(250..=1200),
        },
        pages,
    }
}

#[async_trait]
impl ScanBackend for SimulatedCrawler {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn default_poll_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn start(&self, url: &str, options: &ScanOptions) -> Result<String, BackendError> {
        let total = match options.max_pages {
            Some(max) if max > 0 => max,
            _ => rand::rng().random_range(MIN_SIMULATED_PAGES..=MAX_SIMULATED_PAGES),
        };
        let id = format!("sim-{}", Uuid::new_v4().simple());
        let urls = generate_sample_urls(url, total as usize);
        let token = CancellationToken::new();

        self.scans.insert(
            id.clone(),
            SimulatedScan {
                snapshot: ScanSnapshot {
                    status: ScanStatus::Pending,
                    progress: 0,
                    pages_scanned: 0,
                    estimated_total_pages: total,
                    current_url: None,
                    error: None,
                },
                findings: None,
                token: token.clone(),
            },
        );
        debug!(backend_task_id = %id, total, "Simulated crawl started for {}", url);

        let scans = self.scans.clone();
        let tick = self.tick;
        let scan_id = id.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if Self::advance(&scans, &scan_id, &urls) {
                            break;
                        }
                    }
                }
            }
        });

        Ok(id)
    }

    async fn status(&self, backend_task_id: &str) -> Result<ScanSnapshot, BackendError> {
        self.scans
            .get(backend_task_id)
            .map(|scan| scan.snapshot.clone())
            .ok_or_else(|| BackendError::TaskNotFound(backend_task_id.to_string()))
    }

    async fn result(&self, backend_task_id: &str) -> Result<AuditFindings, BackendError> {
        let findings = {
            let scan = self
                .scans
                .get(backend_task_id)
                .ok_or_else(|| BackendError::TaskNotFound(backend_task_id.to_string()))?;
            scan.findings
                .clone()
                .ok_or_else(|| BackendError::NotReady(backend_task_id.to_string()))?
        };
        // Results are handed out once; the tracker persists them.
        self.scans.remove(backend_task_id);
        Ok(findings)
    }

    async fn cancel(&self, backend_task_id: &str) -> Result<(), BackendError> {
        match self.scans.remove(backend_task_id) {
            Some((_, scan)) => {
                scan.token.cancel();
                Ok(())
            }
            None => Err(BackendError::TaskNotFound(backend_task_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sample_urls_count_and_prefix() {
        for n in [0usize, 1, 5, 14, 60] {
            let urls = generate_sample_urls("https://acme.test/", n);
            assert_eq!(urls.len(), n);
            assert!(urls.iter().all(|u| u.starts_with("https://acme.test")));
        }

        let urls = generate_sample_urls("https://acme.test", 40);
        assert_eq!(urls[0], "https://acme.test/");
        assert_eq!(urls[1], "https://acme.test/about");
        let unique: std::collections::HashSet<_> = urls.iter().collect();
        assert_eq!(unique.len(), urls.len());
    }

    #[test]
    fn test_synthesized_findings_are_in_range() {
        let urls = generate_sample_urls("https://acme.test", 25);
        let findings = synthesize_findings(&urls);

        for score in [
            findings.scores.seo,
            findings.scores.technical,
            findings.scores.content,
            findings.scores.performance,
            findings.scores.global,
        ] {
            assert!((50..=95).contains(&score));
        }
        assert_eq!(findings.pages.len(), 25);
        assert_eq!(findings.page_stats.total_pages, 25);
        assert_eq!(
            findings.pages.iter().filter(|p| !p.is_success()).count() as u32,
            findings.issues.critical
        );
    }

    #[tokio::test]
    async fn test_simulated_scan_runs_to_completion() {
        let crawler = SimulatedCrawler::with_tick(Duration::from_millis(5));
        let options = ScanOptions {
            max_pages: Some(6),
            ..Default::default()
        };
        let id = crawler.start("https://acme.test", &options).await.unwrap();

        let initial = crawler.status(&id).await.unwrap();
        assert_eq!(initial.estimated_total_pages, 6);
        assert_eq!(
            crawler.result(&id).await.unwrap_err(),
            BackendError::NotReady(id.clone())
        );

        let mut last_progress = 0;
        let snapshot = loop {
            let snapshot = crawler.status(&id).await.unwrap();
            assert!(snapshot.progress >= last_progress);
            last_progress = snapshot.progress;
            if snapshot.status == ScanStatus::Completed {
                break snapshot;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        };

        assert_eq!(snapshot.pages_scanned, 6);
        assert_eq!(snapshot.progress, 100);
        let findings = crawler.result(&id).await.unwrap();
        assert_eq!(findings.pages.len(), 6);
        // handed out once
        assert!(matches!(
            crawler.status(&id).await,
            Err(BackendError::TaskNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_stops_progress() {
        let crawler = SimulatedCrawler::with_tick(Duration::from_millis(5));
        let id = crawler
            .start(
                "https://acme.test",
                &ScanOptions {
                    max_pages: Some(500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        crawler.cancel(&id).await.unwrap();
        assert!(matches!(
            crawler.status(&id).await,
            Err(BackendError::TaskNotFound(_))
        ));
        assert!(crawler.cancel(&id).await.is_err());
    }
}
