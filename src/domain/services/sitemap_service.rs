// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::AuditResult;
use std::collections::HashSet;
use std::fmt::Write;
use url::Url;

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// 根据审计结果生成 sitemap.xml
///
/// 只包含返回 2xx 的页面，按首次出现顺序去重。
pub fn generate_sitemap(result: &AuditResult) -> String {
    let lastmod = result.created_at.format("%Y-%m-%d").to_string();
    let mut seen = HashSet::new();

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{}\">", SITEMAP_NAMESPACE);

    for page in result.pages.iter().filter(|p| p.is_success()) {
        if !seen.insert(page.url.as_str()) {
            continue;
        }
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>weekly</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            html_escape::encode_text(&page.url),
            lastmod,
            priority_for(&page.url),
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

/// 按路径深度计算优先级：根路径 1.0，一级 0.8，更深 0.6
fn priority_for(url: &str) -> &'static str {
    let depth = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .map(|segments| segments.filter(|s| !s.is_empty()).count())
        })
        .unwrap_or(0);

    match depth {
        0 => "1.0",
        1 => "0.8",
        _ => "0.6",
    }
}
