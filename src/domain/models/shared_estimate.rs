// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 分享的费用估算链接
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedEstimate {
    pub id: Uuid,
    /// 32位十六进制访问令牌
    pub token: String,
    pub scan_id: Uuid,
    pub owner_id: Uuid,
    pub recipient_email: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub expires_at: DateTime<FixedOffset>,
}

/// 分享链接访问错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SharedEstimateError {
    #[error("Shared estimate not found")]
    NotFound,
    #[error("Shared estimate has expired")]
    Expired,
}

impl SharedEstimate {
    pub fn new(
        scan_id: Uuid,
        owner_id: Uuid,
        recipient_email: Option<String>,
        message: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            token: Uuid::new_v4().simple().to_string(),
            scan_id,
            owner_id,
            recipient_email,
            message,
            created_at: now.into(),
            expires_at: (now + ttl).into(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<FixedOffset>) -> bool {
        self.expires_at <= now
    }
}
