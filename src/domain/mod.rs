// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：扫描任务、审计结果及附属记录
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：扫描后端接口、页面分析、评分、报价、站点地图和报告
///
/// 领域层不依赖于任何外部实现，具体实现由基础设施层提供。
pub mod models;
pub mod repositories;
pub mod services;
