// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ScanCompleted,
    ScanFailed,
    EstimateShared,
    ReportReady,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotificationKind::ScanCompleted => write!(f, "scan_completed"),
            NotificationKind::ScanFailed => write!(f, "scan_failed"),
            NotificationKind::EstimateShared => write!(f, "estimate_shared"),
            NotificationKind::ReportReady => write!(f, "report_ready"),
        }
    }
}

impl FromStr for NotificationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scan_completed" => Ok(NotificationKind::ScanCompleted),
            "scan_failed" => Ok(NotificationKind::ScanFailed),
            "estimate_shared" => Ok(NotificationKind::EstimateShared),
            "report_ready" => Ok(NotificationKind::ReportReady),
            _ => Err(()),
        }
    }
}

/// 用户通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub scan_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl Notification {
    pub fn new(
        owner_id: Uuid,
        scan_id: Option<Uuid>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            scan_id,
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            created_at: Utc::now().into(),
        }
    }
}
