// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 定义扫描任务、审计结果、费用估算及其附属记录
pub mod audit_result;
pub mod estimate;
pub mod notification;
pub mod pdf_report;
pub mod scan_task;
pub mod shared_estimate;
