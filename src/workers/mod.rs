// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供后台任务：扫描进度跟踪和过期数据清理
pub mod expiration_worker;
pub mod scan_tracker;

pub use expiration_worker::ExpirationWorker;
pub use scan_tracker::{ScanTracker, StartError};
