// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 序列化与配置相关的错误类型
///
/// 序列化本身是全函数，不会失败；这里只覆盖外围可能出错的边界：
/// 输出目标的 I/O、图结构的错误修改、配置加载与校验。
#[derive(Error, Debug)]
pub enum StringifyError {
    #[error("写入输出失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 编码失败: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("节点不是对象: {0}")]
    NotAnObject(&'static str),

    #[error("节点不是数组: {0}")]
    NotAnArray(&'static str),

    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    #[error("配置校验失败: {0}")]
    InvalidSettings(#[from] validator::ValidationErrors),
}

pub type StringifyResult<T> = Result<T, StringifyError>;
