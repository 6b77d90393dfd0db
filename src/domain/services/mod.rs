// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 环安全序列化（stringify_service）：深度优先遍历值图，每个容器实例只展开一次，
/// 输出供日志与调试使用的 JSON 文本
pub mod stringify_service;
