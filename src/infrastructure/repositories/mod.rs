// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的 sea-orm 实现
pub mod audit_result_repo_impl;
pub mod notification_repo_impl;
pub mod pdf_report_repo_impl;
pub mod scan_task_repo_impl;
pub mod shared_estimate_repo_impl;
