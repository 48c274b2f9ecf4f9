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

use crate::domain::models::audit_result::{IssueCounts, PageSummary};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

pub const TITLE_LENGTH: std::ops::RangeInclusive<usize> = 10..=60;
pub const DESCRIPTION_LENGTH: std::ops::RangeInclusive<usize> = 50..=160;
pub const THIN_CONTENT_WORDS: usize = 300;

/// 单个页面的 SEO 分析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAnalysis {
    pub url: String,
    /// HTTP 状态码，0 表示请求失败
    pub status_code: u16,
    pub load_time_ms: u64,
    /// 距离起始页的链接深度
    pub depth: u32,
    pub is_https: bool,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_count: usize,
    pub has_viewport: bool,
    pub has_lang: bool,
    pub has_canonical: bool,
    pub image_count: usize,
    pub images_missing_alt: usize,
    pub word_count: usize,
    /// 页面中发现的 http(s) 链接，已去除片段
    pub links: BTreeSet<String>,
}

impl PageAnalysis {
    /// 解析HTML并生成页面分析
    ///
    /// # 参数
    ///
    /// * `url` - 页面URL，同时作为相对链接的基准
    /// * `status_code` - HTTP 状态码
    /// * `load_time_ms` - 加载耗时
    /// * `depth` - 链接深度
    /// * `html` - 页面HTML
    pub fn from_html(url: &str, status_code: u16, load_time_ms: u64, depth: u32, html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = select_first_text(&document, "title");
        let meta_description = document
            .select(&selector("meta[name=\"description\"]"))
            .next()
            .and_then(|e| e.value().attr("content"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let h1_count = document.select(&selector("h1")).count();
        let has_viewport = document
            .select(&selector("meta[name=\"viewport\"]"))
            .next()
            .is_some();
        let has_lang = document
            .select(&selector("html"))
            .next()
            .and_then(|e| e.value().attr("lang"))
            .is_some_and(|lang| !lang.trim().is_empty());
        let has_canonical = document
            .select(&selector("link[rel=\"canonical\"]"))
            .next()
            .is_some();

        let images: Vec<_> = document.select(&selector("img")).collect();
        let images_missing_alt = images
            .iter()
            .filter(|img| {
                img.value()
                    .attr("alt")
                    .is_none_or(|alt| alt.trim().is_empty())
            })
            .count();

        let word_count = count_words(&document);
        let links = LinkDiscoverer::extract_from_document(&document, url);

        Self {
            url: url.to_string(),
            status_code,
            load_time_ms,
            depth,
            is_https: url.starts_with("https://"),
            title,
            meta_description,
            h1_count,
            has_viewport,
            has_lang,
            has_canonical,
            image_count: images.len(),
            images_missing_alt,
            word_count,
            links,
        }
    }

    /// 无法获取内容的页面（网络错误或非HTML响应）
    pub fn unreachable(url: &str, status_code: u16, load_time_ms: u64, depth: u32) -> Self {
        Self {
            url: url.to_string(),
            status_code,
            load_time_ms,
            depth,
            is_https: url.starts_with("https://"),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn title_length_ok(&self) -> bool {
        self.title
            .as_ref()
            .is_some_and(|t| TITLE_LENGTH.contains(&t.chars().count()))
    }

    pub fn description_length_ok(&self) -> bool {
        self.meta_description
            .as_ref()
            .is_some_and(|d| DESCRIPTION_LENGTH.contains(&d.chars().count()))
    }

    /// 计算页面问题
    ///
    /// 非 2xx 页面只记一个严重问题，其余检查对其没有意义。
    pub fn issues(&self) -> IssueCounts {
        let mut issues = IssueCounts::default();
        if !self.is_success() {
            issues.critical = 1;
            return issues;
        }

        if self.title.is_none() {
            issues.high += 1;
        } else if !self.title_length_ok() {
            issues.medium += 1;
        }

        if self.meta_description.is_none() {
            issues.high += 1;
        } else if !self.description_length_ok() {
            issues.medium += 1;
        }

        if self.h1_count != 1 {
            issues.medium += 1;
        }
        if self.images_missing_alt > 0 {
            issues.low += 1;
        }
        if self.word_count < THIN_CONTENT_WORDS {
            issues.low += 1;
        }
        issues
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            url: self.url.clone(),
            status_code: self.status_code,
            load_time_ms: self.load_time_ms,
            issue_count: self.issues().total(),
            depth: self.depth,
        }
    }
}

fn selector(css: &str) -> Selector {
    // Only called with literal selectors.
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e:?}"))
}

fn select_first_text(document: &Html, css: &str) -> Option<String> {
    document
        .select(&selector(css))
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn count_words(document: &Html) -> usize {
    let Some(body) = document.select(&selector("body")).next() else {
        return 0;
    };

    body.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent()?;
            let parent_name = parent.value().as_element()?.name();
            if matches!(parent_name, "script" | "style" | "noscript") {
                None
            } else {
                Some(text.split_whitespace().count())
            }
        })
        .sum()
}

/// 链接发现器
///
/// 负责从HTML内容中提取和过滤链接
pub struct LinkDiscoverer;

impl LinkDiscoverer {
    /// 从HTML内容中提取链接
    pub fn extract_links(html_content: &str, base_url: &str) -> BTreeSet<String> {
        let document = Html::parse_document(html_content);
        Self::extract_from_document(&document, base_url)
    }

    fn extract_from_document(document: &Html, base_url: &str) -> BTreeSet<String> {
        let mut links = BTreeSet::new();
        let Ok(base) = Url::parse(base_url) else {
            return links;
        };

        for element in document.select(&selector("a[href]")) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            // Ignore fragment identifiers, mailto, tel and javascript links
            if href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
                || href.starts_with("javascript:")
            {
                continue;
            }

            if let Ok(mut url) = base.join(href) {
                if url.scheme() == "http" || url.scheme() == "https" {
                    url.set_fragment(None);
                    links.insert(url.to_string());
                }
            }
        }

        links
    }

    /// 判断链接是否属于扫描范围（同一主机，可选包含子域名）
    pub fn is_in_scope(link: &str, root_host: &str, include_subdomains: bool) -> bool {
        let Some(host) = Url::parse(link).ok().and_then(|u| u.host_str().map(str::to_string))
        else {
            return false;
        };
        let host = host.trim_start_matches("www.");
        let root = root_host.trim_start_matches("www.");
        host == root || (include_subdomains && host.ends_with(&format!(".{}", root)))
    }
}
