// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 审计评分 (0-100)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditScores {
    pub global: u8,
    pub seo: u8,
    pub technical: u8,
    pub content: u8,
    pub performance: u8,
}

/// 按严重程度统计的问题数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl IssueCounts {
    pub fn total(&self) -> u32 {
        self.critical + self.high + self.medium + self.low
    }
}

impl std::ops::AddAssign for IssueCounts {
    fn add_assign(&mut self, other: Self) {
        self.critical += other.critical;
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
    }
}

/// 页面汇总统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStats {
    pub total_pages: u32,
    pub pages_with_issues: u32,
    pub broken_pages: u32,
    pub average_load_time_ms: u64,
    pub average_word_count: u32,
}

/// 单个页面的扫描摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub url: String,
    /// HTTP 状态码，0 表示无法访问
    pub status_code: u16,
    pub load_time_ms: u64,
    pub issue_count: u32,
    #[serde(default)]
    pub depth: u32,
}

impl PageSummary {
    /// 页面是否成功返回 (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// 扫描后端产出的审计发现，尚未关联到扫描任务
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditFindings {
    pub scores: AuditScores,
    pub issues: IssueCounts,
    pub page_stats: PageStats,
    #[serde(default)]
    pub pages: Vec<PageSummary>,
}

/// 审计结果
///
/// 与已完成的扫描任务一一对应，写入后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub scan_id: Uuid,
    pub scores: AuditScores,
    pub issues: IssueCounts,
    pub page_stats: PageStats,
    pub pages: Vec<PageSummary>,
    pub created_at: DateTime<FixedOffset>,
}

impl AuditResult {
    /// 将审计发现关联到扫描任务
    pub fn from_findings(scan_id: Uuid, findings: AuditFindings) -> Self {
        Self {
            scan_id,
            scores: findings.scores,
            issues: findings.issues,
            page_stats: findings.page_stats,
            pages: findings.pages,
            created_at: Utc::now().into(),
        }
    }
}
