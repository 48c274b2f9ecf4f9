// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 优化工作类别，与问题严重程度一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationCategory {
    /// 严重问题：技术修复
    TechnicalFixes,
    /// 高优先级：页面 SEO
    OnPageSeo,
    /// 中优先级：内容改进
    ContentImprovements,
    /// 低优先级：细节调整
    MinorAdjustments,
}

impl OptimizationCategory {
    pub fn label(&self) -> &'static str {
        match self {
            OptimizationCategory::TechnicalFixes => "Technical fixes",
            OptimizationCategory::OnPageSeo => "On-page SEO",
            OptimizationCategory::ContentImprovements => "Content improvements",
            OptimizationCategory::MinorAdjustments => "Minor adjustments",
        }
    }
}

impl fmt::Display for OptimizationCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 报价明细项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationItem {
    pub category: OptimizationCategory,
    pub unit_count: u32,
    pub unit_price_cents: u64,
    pub total_cents: u64,
}

/// 优化费用估算
///
/// 按需计算，不持久化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub scan_id: Uuid,
    pub currency: String,
    pub items: Vec<OptimizationItem>,
    pub subtotal_cents: u64,
    pub total_cents: u64,
}

/// 将分格式化为带两位小数的金额
pub fn format_cents(cents: u64, currency: &str) -> String {
    format!("{}.{:02} {}", cents / 100, cents % 100, currency)
}
