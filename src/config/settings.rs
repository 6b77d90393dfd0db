// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::StringifyResult;
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use validator::Validate;

/// 应用程序配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// 序列化配置
    #[validate(nested)]
    pub stringify: StringifySettings,
    /// 日志配置
    #[validate(nested)]
    pub logging: LoggingSettings,
}

/// 序列化配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StringifySettings {
    /// 每层缩进的空格数，0 表示紧凑输出
    #[validate(range(max = 10))]
    pub indent: usize,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoggingSettings {
    /// EnvFilter 过滤规则
    #[validate(length(min = 1))]
    pub filter: String,
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

impl Default for StringifySettings {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与
    /// `SAFE_STRINGIFY__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载并通过校验的配置
    /// * `Err(StringifyError)` - 配置加载或校验失败
    pub fn new() -> StringifyResult<Self> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("SAFE_STRINGIFY")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder)
    }

    /// 在默认值之上叠加一段 TOML 配置
    pub fn from_toml_str(toml: &str) -> StringifyResult<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder)
    }

    fn defaults() -> StringifyResult<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("stringify.indent", 2)?
            .set_default("logging.filter", "info,safe_stringify=debug")?
            .set_default("logging.json", false)?)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> StringifyResult<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
