// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理序列化缩进与日志过滤等配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含值图模型与环安全序列化服务
pub mod domain;

/// 工具模块
///
/// 提供错误类型与日志初始化
pub mod utils;

pub use domain::models::value_graph::{Node, NodeId};
pub use domain::services::stringify_service::{safe_stringify, CycleSafeSerializer, StringifyReport};
pub use utils::errors::{StringifyError, StringifyResult};
