// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 已生成的 PDF 报告记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfReport {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub owner_id: Uuid,
    /// 存储层中的键
    pub storage_key: String,
    pub size_bytes: u64,
    pub created_at: DateTime<FixedOffset>,
    pub expires_at: DateTime<FixedOffset>,
}

impl PdfReport {
    pub fn new(scan_id: Uuid, owner_id: Uuid, size_bytes: u64, ttl: Duration) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id,
            scan_id,
            owner_id,
            storage_key: format!("reports/{}/{}.pdf", scan_id, id),
            size_bytes,
            created_at: now.into(),
            expires_at: (now + ttl).into(),
        }
    }
}
