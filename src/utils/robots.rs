// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use dashmap::DashMap;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Robots.txt检查器
///
/// 每个主机的 robots.txt 只获取一次并缓存在内存中。
/// 获取失败或返回非 2xx 状态时视为允许全部访问。
#[derive(Clone)]
pub struct RobotsChecker {
    /// HTTP客户端
    client: Client,

    /// 用于请求 robots.txt 的 User-Agent
    user_agent: String,

    /// 内存缓存，键为 robots.txt 的完整URL
    cache: Arc<DashMap<String, String>>,
}

impl RobotsChecker {
    /// 创建新的Robots检查器实例
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            cache: Arc::new(DashMap::new()),
        }
    }

    /// 检查URL是否被允许访问
    pub async fn is_allowed(&self, url_str: &str) -> Result<bool> {
        let content = self.get_robots_content(url_str).await?;
        let url = Url::parse(url_str)?;
        let mut matcher = DefaultMatcher::default();
        Ok(matcher.one_agent_allowed_by_robots(&content, &self.user_agent, url.as_str()))
    }

    /// 获取爬取延迟
    pub async fn get_crawl_delay(&self, url_str: &str) -> Result<Option<Duration>> {
        let content = self.get_robots_content(url_str).await?;
        Ok(parse_crawl_delay(&content, &self.user_agent))
    }

    /// 获取Robots.txt内容（带缓存）
    async fn get_robots_content(&self, url_str: &str) -> Result<String> {
        let url = Url::parse(url_str)?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid URL"))?;
        let robots_url = match url.port() {
            Some(port) => format!("{}://{}:{}/robots.txt", url.scheme(), host, port),
            None => format!("{}://{}/robots.txt", url.scheme(), host),
        };

        if let Some(cached) = self.cache.get(&robots_url) {
            return Ok(cached.clone());
        }

        let content = match self
            .client
            .get(&robots_url)
            .header("User-Agent", &self.user_agent)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp.text().await.unwrap_or_default(),
            Ok(resp) => {
                tracing::debug!("No usable robots.txt at {} ({})", robots_url, resp.status());
                String::new()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch robots.txt from {}: {}", robots_url, e);
                String::new()
            }
        };

        self.cache.insert(robots_url, content.clone());
        Ok(content)
    }
}

/// 解析Crawl-delay指令
///
/// 简化实现：优先使用与 User-Agent 匹配的分组，否则使用 `*` 分组。
fn parse_crawl_delay(content: &str, user_agent: &str) -> Option<Duration> {
    let mut current_agent_matched = false;
    let mut delay: Option<f64> = None;
    let mut specific_agent_found = false;
    let user_agent = user_agent.to_lowercase();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        if key == "user-agent" {
            if value == "*" {
                current_agent_matched = !specific_agent_found;
            } else if user_agent.contains(&value.to_lowercase()) {
                current_agent_matched = true;
                specific_agent_found = true;
                // Reset delay if we found a more specific agent
                delay = None;
            } else {
                current_agent_matched = false;
            }
        } else if key == "crawl-delay" && current_agent_matched {
            if let Ok(d) = value.parse::<f64>() {
                delay = Some(d);
            }
        }
    }

    delay
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(Duration::from_secs_f64)
}
