// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::shared_estimate::SharedEstimate;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

/// 分享链接仓库特质
#[async_trait]
pub trait SharedEstimateRepository: Send + Sync {
    async fn create(&self, shared: &SharedEstimate) -> Result<(), RepositoryError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<SharedEstimate>, RepositoryError>;
    /// 删除在给定时间之前过期的链接，返回删除数量
    async fn delete_expired(&self, now: DateTime<FixedOffset>) -> Result<u64, RepositoryError>;
}
