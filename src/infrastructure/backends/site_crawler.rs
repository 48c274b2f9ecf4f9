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

use crate::config::settings::ScanSettings;
use crate::domain::models::audit_result::AuditFindings;
use crate::domain::models::scan_task::{ScanOptions, ScanSnapshot, ScanStatus};
use crate::domain::services::audit_scorer::AuditScorer;
use crate::domain::services::page_analyzer::{LinkDiscoverer, PageAnalysis};
use crate::domain::services::scan_backend::{BackendError, ScanBackend};
use crate::utils::robots::RobotsChecker;
use crate::utils::validators::{ensure_public_host, TargetError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// robots.txt 中 Crawl-delay 的上限
const MAX_CRAWL_DELAY: Duration = Duration::from_secs(5);

/// 单个页面最多跟随的重定向次数
const MAX_REDIRECTS: usize = 5;

#[derive(Error, Debug)]
enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("redirect to {0} refused: {1}")]
    RedirectRefused(String, TargetError),
    #[error("too many redirects")]
    TooManyRedirects,
}

/// 爬虫配置
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// 未指定 max_pages 时的页面上限
    pub default_max_pages: u32,
    /// 默认 User-Agent
    pub user_agent: String,
    /// 单次请求超时
    pub request_timeout: Duration,
    /// 是否允许访问内网地址
    pub allow_private_hosts: bool,
}

impl From<&ScanSettings> for CrawlerConfig {
    fn from(settings: &ScanSettings) -> Self {
        Self {
            default_max_pages: settings.default_max_pages,
            user_agent: settings.user_agent.clone(),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            allow_private_hosts: settings.allow_private_hosts,
        }
    }
}

struct CrawlState {
    snapshot: ScanSnapshot,
    findings: Option<AuditFindings>,
    token: CancellationToken,
}

/// 站点爬虫后端
///
/// 从起始页开始广度优先爬取同一站点的页面，逐页分析，
/// 结束后由审计评分器汇总。
#[derive(Clone)]
pub struct SiteCrawler {
    client: reqwest::Client,
    config: CrawlerConfig,
    crawls: Arc<DashMap<String, CrawlState>>,
}

impl SiteCrawler {
    pub fn new(config: CrawlerConfig) -> Self {
        // Redirects are followed in `fetch` so every hop passes the host check.
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default();
        Self {
            client,
            config,
            crawls: Arc::new(DashMap::new()),
        }
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut CrawlState)) {
        if let Some(mut state) = self.crawls.get_mut(id) {
            apply(&mut state);
        }
    }

    /// 执行一次完整的爬取，直到完成、失败或被取消
    async fn run(self, id: String, root: Url, options: ScanOptions, token: CancellationToken) {
        let max_pages = options
            .max_pages
            .filter(|m| *m > 0)
            .unwrap_or(self.config.default_max_pages)
            .max(1) as usize;
        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| self.config.user_agent.clone());
        let root_host = root.host_str().unwrap_or_default().to_string();
        let robots = RobotsChecker::new(self.client.clone(), user_agent.clone());

        let crawl_delay = if options.respect_robots_txt {
            robots
                .get_crawl_delay(root.as_str())
                .await
                .ok()
                .flatten()
                .map(|d| d.min(MAX_CRAWL_DELAY))
        } else {
            None
        };

        let mut queue: VecDeque<(String, u32)> = VecDeque::from([(root.to_string(), 0)]);
        let mut seen: HashSet<String> = HashSet::from([root.to_string()]);
        let mut safe_hosts: HashSet<String> = HashSet::from([root_host.clone()]);
        let mut pages: Vec<PageAnalysis> = Vec::new();

        while let Some((url, depth)) = queue.pop_front() {
            if token.is_cancelled() {
                debug!(backend_task_id = %id, "Crawl cancelled");
                return;
            }
            if pages.len() >= max_pages {
                break;
            }

            if options.respect_robots_txt && !robots.is_allowed(&url).await.unwrap_or(true) {
                debug!("Skipping {} (disallowed by robots.txt)", url);
                continue;
            }

            if !self.config.allow_private_hosts {
                let Ok(parsed) = Url::parse(&url) else {
                    continue;
                };
                let host = parsed.host_str().unwrap_or_default().to_string();
                if !safe_hosts.contains(&host) {
                    if let Err(e) = ensure_public_host(&parsed).await {
                        warn!("Skipping {}: {}", url, e);
                        continue;
                    }
                    safe_hosts.insert(host);
                }
            }

            self.update(&id, |state| {
                state.snapshot.status = ScanStatus::InProgress;
                state.snapshot.current_url = Some(url.clone());
            });

            let fetched = tokio::select! {
                _ = token.cancelled() => return,
                fetched = self.fetch(&url, depth, &user_agent) => fetched,
            };

            let analysis = match fetched {
                Ok(analysis) => analysis,
                Err(e) if depth == 0 => {
                    warn!(backend_task_id = %id, "Start page {} unreachable: {}", url, e);
                    self.update(&id, |state| {
                        state.snapshot.status = ScanStatus::Failed;
                        state.snapshot.error = Some(format!("Could not fetch {}: {}", url, e));
                    });
                    return;
                }
                Err(e) => {
                    debug!("Fetching {} failed: {}", url, e);
                    PageAnalysis::unreachable(&url, 0, 0, depth)
                }
            };

            for link in &analysis.links {
                if !seen.contains(link)
                    && LinkDiscoverer::is_in_scope(link, &root_host, options.include_subdomains)
                {
                    seen.insert(link.clone());
                    queue.push_back((link.clone(), depth + 1));
                }
            }
            pages.push(analysis);

            let scanned = pages.len();
            // Known work; never equal to the scanned count before the crawl ends.
            let estimated = (scanned + queue.len()).min(max_pages).max(scanned + 1);
            self.update(&id, |state| {
                state.snapshot.pages_scanned = scanned as u32;
                state.snapshot.estimated_total_pages = estimated as u32;
                state.snapshot.progress = (scanned * 100 / estimated).min(99) as u8;
            });

            if let Some(delay) = crawl_delay {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        if pages.is_empty() {
            self.update(&id, |state| {
                state.snapshot.status = ScanStatus::Failed;
                state.snapshot.error = Some("No page could be crawled".to_string());
            });
            return;
        }

        let findings = AuditScorer::score(&pages);
        let total = pages.len() as u32;
        info!(
            backend_task_id = %id,
            pages = total,
            score = findings.scores.global,
            "Crawl of {} finished",
            root
        );
        self.update(&id, |state| {
            state.snapshot.status = ScanStatus::Completed;
            state.snapshot.progress = 100;
            state.snapshot.pages_scanned = total;
            state.snapshot.estimated_total_pages = total;
            state.findings = Some(findings);
        });
    }

    async fn fetch(
        &self,
        url: &str,
        depth: u32,
        user_agent: &str,
    ) -> Result<PageAnalysis, FetchError> {
        let started = Instant::now();
        let mut current = Url::parse(url)?;
        let mut redirects = 0;

        let response = loop {
            let response = self
                .client
                .get(current.clone())
                .header("User-Agent", user_agent)
                .send()
                .await?;

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .filter(|_| response.status().is_redirection())
                .map(str::to_owned);
            let Some(location) = location else {
                break response;
            };

            if redirects == MAX_REDIRECTS {
                return Err(FetchError::TooManyRedirects);
            }
            let next = current.join(&location)?;
            if !self.config.allow_private_hosts {
                ensure_public_host(&next)
                    .await
                    .map_err(|e| FetchError::RedirectRefused(next.to_string(), e))?;
            }
            debug!("{} redirects to {}", current, next);
            redirects += 1;
            current = next;
        };

        let status = response.status().as_u16();
        let final_url = current.to_string();
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));

        if !response.status().is_success() || !is_html {
            let elapsed = started.elapsed().as_millis() as u64;
            let mut page = PageAnalysis::unreachable(url, status, elapsed, depth);
            page.is_https = final_url.starts_with("https://");
            return Ok(page);
        }

        let body = response.text().await?;
        let elapsed = started.elapsed().as_millis() as u64;
        Ok(PageAnalysis::from_html(&final_url, status, elapsed, depth, &body))
    }
}

#[async_trait]
impl ScanBackend for SiteCrawler {
    fn name(&self) -> &'static str {
        "crawler"
    }

    fn default_poll_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn start(&self, url: &str, options: &ScanOptions) -> Result<String, BackendError> {
        let root = Url::parse(url).map_err(|e| BackendError::Rejected(e.to_string()))?;
        if !self.config.allow_private_hosts {
            ensure_public_host(&root)
                .await
                .map_err(|e| BackendError::Rejected(format!("{}: {}", url, e)))?;
        }

        let id = format!("crawl-{}", Uuid::new_v4().simple());
        let token = CancellationToken::new();
        self.crawls.insert(
            id.clone(),
            CrawlState {
                snapshot: ScanSnapshot {
                    status: ScanStatus::Pending,
                    progress: 0,
                    pages_scanned: 0,
                    estimated_total_pages: 0,
                    current_url: None,
                    error: None,
                },
                findings: None,
                token: token.clone(),
            },
        );

        tokio::spawn(self.clone().run(id.clone(), root, options.clone(), token));
        Ok(id)
    }

    async fn status(&self, backend_task_id: &str) -> Result<ScanSnapshot, BackendError> {
        let snapshot = self
            .crawls
            .get(backend_task_id)
            .map(|state| state.snapshot.clone())
            .ok_or_else(|| BackendError::TaskNotFound(backend_task_id.to_string()))?;
        // A failed crawl has no result to collect; its last report is final.
        if snapshot.status == ScanStatus::Failed {
            self.crawls.remove(backend_task_id);
        }
        Ok(snapshot)
    }

    async fn result(&self, backend_task_id: &str) -> Result<AuditFindings, BackendError> {
        let findings = {
            let state = self
                .crawls
                .get(backend_task_id)
                .ok_or_else(|| BackendError::TaskNotFound(backend_task_id.to_string()))?;
            state
                .findings
                .clone()
                .ok_or_else(|| BackendError::NotReady(backend_task_id.to_string()))?
        };
        self.crawls.remove(backend_task_id);
        Ok(findings)
    }

    async fn cancel(&self, backend_task_id: &str) -> Result<(), BackendError> {
        match self.crawls.remove(backend_task_id) {
            Some((_, state)) => {
                state.token.cancel();
                Ok(())
            }
            None => Err(BackendError::TaskNotFound(backend_task_id.to_string())),
        }
    }
}
