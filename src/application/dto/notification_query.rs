// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use validator::Validate;

/// 通知列表查询参数
#[derive(Debug, Deserialize, Validate)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
}
