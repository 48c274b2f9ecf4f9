// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::{AuditScores, IssueCounts};
use crate::domain::models::estimate::CostEstimate;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 分享报价请求
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ShareRequestDto {
    #[validate(email)]
    pub recipient_email: Option<String>,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

/// 分享链接创建结果
#[derive(Debug, Serialize, Deserialize)]
pub struct ShareResponseDto {
    pub token: String,
    pub path: String,
    pub expires_at: DateTime<FixedOffset>,
}

/// 通过分享链接公开查看的报价
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedEstimateViewDto {
    pub url: String,
    pub scores: AuditScores,
    pub issues: IssueCounts,
    pub estimate: CostEstimate,
    pub message: Option<String>,
    pub expires_at: DateTime<FixedOffset>,
}
