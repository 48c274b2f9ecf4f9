// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括 robots.txt 检查、URL 规范化、SSRF 校验和日志初始化
pub mod robots;
pub mod telemetry;
pub mod url_utils;
pub mod validators;
