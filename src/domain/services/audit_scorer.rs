// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::{AuditFindings, AuditScores, IssueCounts, PageStats};
use crate::domain::services::page_analyzer::{PageAnalysis, THIN_CONTENT_WORDS};

const SEO_WEIGHT: f64 = 0.30;
const TECHNICAL_WEIGHT: f64 = 0.25;
const CONTENT_WEIGHT: f64 = 0.25;
const PERFORMANCE_WEIGHT: f64 = 0.20;

/// 审计评分器
///
/// 将页面分析结果汇总为分项评分、问题统计和页面统计。
/// SEO 和内容评分只统计 2xx 页面；技术和性能评分统计全部页面。
pub struct AuditScorer;

impl AuditScorer {
    pub fn score(pages: &[PageAnalysis]) -> AuditFindings {
        let ok_pages: Vec<&PageAnalysis> = pages.iter().filter(|p| p.is_success()).collect();

        let seo = average(ok_pages.iter().map(|p| Self::seo_score(p)));
        let content = average(ok_pages.iter().map(|p| Self::content_score(p)));
        let technical = average(pages.iter().map(Self::technical_score));
        let performance = average(pages.iter().map(|p| Self::performance_score(p.load_time_ms)));

        let global = SEO_WEIGHT * seo
            + TECHNICAL_WEIGHT * technical
            + CONTENT_WEIGHT * content
            + PERFORMANCE_WEIGHT * performance;

        let mut issues = IssueCounts::default();
        let mut pages_with_issues = 0;
        for page in pages {
            let page_issues = page.issues();
            if page_issues.total() > 0 {
                pages_with_issues += 1;
            }
            issues += page_issues;
        }

        let total_load: u64 = pages.iter().map(|p| p.load_time_ms).sum();
        let total_words: usize = ok_pages.iter().map(|p| p.word_count).sum();

        AuditFindings {
            scores: AuditScores {
                global: to_score(global),
                seo: to_score(seo),
                technical: to_score(technical),
                content: to_score(content),
                performance: to_score(performance),
            },
            issues,
            page_stats: PageStats {
                total_pages: pages.len() as u32,
                pages_with_issues,
                broken_pages: (pages.len() - ok_pages.len()) as u32,
                average_load_time_ms: if pages.is_empty() {
                    0
                } else {
                    total_load / pages.len() as u64
                },
                average_word_count: if ok_pages.is_empty() {
                    0
                } else {
                    (total_words / ok_pages.len()) as u32
                },
            },
            pages: pages.iter().map(PageAnalysis::summary).collect(),
        }
    }

    fn seo_score(page: &PageAnalysis) -> f64 {
        ratio(&[
            page.title.is_some(),
            page.title_length_ok(),
            page.meta_description.is_some(),
            page.description_length_ok(),
            page.h1_count == 1,
        ])
    }

    fn technical_score(page: &PageAnalysis) -> f64 {
        ratio(&[
            page.is_success(),
            page.is_https,
            page.has_viewport,
            page.has_lang,
        ])
    }

    fn content_score(page: &PageAnalysis) -> f64 {
        ratio(&[
            page.word_count >= THIN_CONTENT_WORDS,
            page.images_missing_alt == 0,
        ])
    }

    /// 按加载耗时分档
    pub fn performance_score(load_time_ms: u64) -> f64 {
        match load_time_ms {
            0..=1000 => 100.0,
            1001..=2500 => 70.0,
            2501..=5000 => 40.0,
            _ => 10.0,
        }
    }
}

fn ratio(checks: &[bool]) -> f64 {
    let passed = checks.iter().filter(|c| **c).count();
    100.0 * passed as f64 / checks.len() as f64
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perfect_page(url: &str) -> PageAnalysis {
        PageAnalysis {
            url: url.to_string(),
            status_code: 200,
            load_time_ms: 400,
            depth: 0,
            is_https: true,
            title: Some("A perfectly sized title".to_string()),
            meta_description: Some("d".repeat(120)),
            h1_count: 1,
            has_viewport: true,
            has_lang: true,
            has_canonical: true,
            image_count: 2,
            images_missing_alt: 0,
            word_count: 800,
            links: Default::default(),
        }
    }

    #[test]
    fn test_perfect_site_scores_100() {
        let findings = AuditScorer::score(&[perfect_page("https://a.test/"), perfect_page("https://a.test/b")]);

        assert_eq!(findings.scores.global, 100);
        assert_eq!(findings.scores.seo, 100);
        assert_eq!(findings.issues.total(), 0);
        assert_eq!(findings.page_stats.total_pages, 2);
        assert_eq!(findings.page_stats.pages_with_issues, 0);
        assert_eq!(findings.page_stats.average_word_count, 800);
        assert_eq!(findings.pages.len(), 2);
    }

    #[test]
    fn test_broken_page_only_affects_technical_and_performance() {
        let mut broken = PageAnalysis::unreachable("https://a.test/404", 404, 6000, 1);
        broken.is_https = true;
        let findings = AuditScorer::score(&[perfect_page("https://a.test/"), broken]);

        assert_eq!(findings.scores.seo, 100);
        assert_eq!(findings.scores.content, 100);
        // (100 + 25) / 2
        assert_eq!(findings.scores.technical, 63);
        // (100 + 10) / 2
        assert_eq!(findings.scores.performance, 55);
        // 0.3*100 + 0.25*62.5 + 0.25*100 + 0.2*55 = 81.625
        assert_eq!(findings.scores.global, 82);
        assert_eq!(findings.issues.critical, 1);
        assert_eq!(findings.page_stats.broken_pages, 1);
        assert_eq!(findings.page_stats.average_load_time_ms, 3200);
    }

    #[test]
    fn test_empty_crawl_scores_zero() {
        let findings = AuditScorer::score(&[]);
        assert_eq!(findings.scores, AuditScores::default());
        assert_eq!(findings.page_stats.total_pages, 0);
    }

    #[test]
    fn test_performance_buckets() {
        assert_eq!(AuditScorer::performance_score(1000), 100.0);
        assert_eq!(AuditScorer::performance_score(2500), 70.0);
        assert_eq!(AuditScorer::performance_score(5000), 40.0);
        assert_eq!(AuditScorer::performance_score(5001), 10.0);
    }
}
