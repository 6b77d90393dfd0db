// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// - 领域模型（models）：可共享、可成环的值图
/// - 服务（services）：把值图渲染为带缩进 JSON 的序列化服务
pub mod models;
pub mod services;
