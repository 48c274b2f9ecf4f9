// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::AuditResult;
use crate::domain::models::estimate::{CostEstimate, OptimizationCategory, OptimizationItem};
use serde::{Deserialize, Serialize};

/// 价格表（单位：分）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTable {
    pub currency: String,
    pub critical_cents: u64,
    pub high_cents: u64,
    pub medium_cents: u64,
    pub low_cents: u64,
    /// 存在至少一项工作时的最低收费
    pub minimum_charge_cents: u64,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            critical_cents: 5000,
            high_cents: 3000,
            medium_cents: 1500,
            low_cents: 500,
            minimum_charge_cents: 9900,
        }
    }
}

/// 根据审计结果的问题数计算优化费用
///
/// 每个严重程度对应一个明细项，数量为0的类别不出现。
pub fn estimate_cost(result: &AuditResult, pricing: &PricingTable) -> CostEstimate {
    let lines = [
        (
            OptimizationCategory::TechnicalFixes,
            result.issues.critical,
            pricing.critical_cents,
        ),
        (
            OptimizationCategory::OnPageSeo,
            result.issues.high,
            pricing.high_cents,
        ),
        (
            OptimizationCategory::ContentImprovements,
            result.issues.medium,
            pricing.medium_cents,
        ),
        (
            OptimizationCategory::MinorAdjustments,
            result.issues.low,
            pricing.low_cents,
        ),
    ];

    let items: Vec<OptimizationItem> = lines
        .into_iter()
        .filter(|(_, count, _)| *count > 0)
        .map(|(category, unit_count, unit_price_cents)| OptimizationItem {
            category,
            unit_count,
            unit_price_cents,
            total_cents: unit_count as u64 * unit_price_cents,
        })
        .collect();

    let subtotal_cents: u64 = items.iter().map(|i| i.total_cents).sum();
    let total_cents = if items.is_empty() {
        0
    } else {
        subtotal_cents.max(pricing.minimum_charge_cents)
    };

    CostEstimate {
        scan_id: result.scan_id,
        currency: pricing.currency.clone(),
        items,
        subtotal_cents,
        total_cents,
    }
}
