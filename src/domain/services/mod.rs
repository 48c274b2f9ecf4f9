// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含审计业务的核心逻辑，均为纯计算或通过特质抽象外部依赖。
///
/// 包含的服务：
/// - 页面分析（page_analyzer）：从HTML提取SEO信号和链接
/// - 审计评分（audit_scorer）：汇总页面分析为评分和问题统计
/// - 费用估算（cost_estimator）：根据问题数计算优化报价
/// - 站点地图（sitemap_service）：生成 sitemap.xml
/// - 报告（report_service）：组织并渲染PDF报告
/// - LLM服务（llm_service）：生成审计摘要
/// - 扫描后端（scan_backend）：扫描实现的统一接口
pub mod audit_scorer;
pub mod cost_estimator;
pub mod llm_service;
pub mod page_analyzer;
pub mod report_service;
pub mod scan_backend;
pub mod sitemap_service;
