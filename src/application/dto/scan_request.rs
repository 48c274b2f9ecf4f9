// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scan_task::ScanOptions;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 启动扫描请求
///
/// URL 可以省略协议，规范化由扫描跟踪器完成
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct StartScanRequestDto {
    #[validate(length(max = 2048))]
    pub url: String,
    #[validate(nested)]
    pub options: Option<ScanOptionsDto>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate, Clone)]
pub struct ScanOptionsDto {
    #[validate(range(min = 1, max = 500))]
    pub max_pages: Option<u32>,
    pub include_subdomains: Option<bool>,
    pub respect_robots_txt: Option<bool>,
    #[validate(length(min = 1, max = 256))]
    pub user_agent: Option<String>,
}

impl From<ScanOptionsDto> for ScanOptions {
    fn from(dto: ScanOptionsDto) -> Self {
        let defaults = ScanOptions::default();
        Self {
            max_pages: dto.max_pages,
            include_subdomains: dto.include_subdomains.unwrap_or(defaults.include_subdomains),
            respect_robots_txt: dto.respect_robots_txt.unwrap_or(defaults.respect_robots_txt),
            user_agent: dto.user_agent,
        }
    }
}

/// 扫描列表查询参数
#[derive(Debug, Deserialize, Validate)]
pub struct ListScansQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
