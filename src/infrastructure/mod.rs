// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，依赖于领域层的抽象接口。
///
/// 包含的子模块：
/// - 扫描后端（backends）：外部审计 API、模拟爬虫和站点爬虫
/// - 数据库（database）：提供数据库连接和实体映射
/// - 指标（metrics）：扫描计数与耗时指标
/// - 仓库实现（repositories）：提供领域仓库接口的具体实现
/// - 存储（storage）：报告文件存储
pub mod backends;
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod storage;
