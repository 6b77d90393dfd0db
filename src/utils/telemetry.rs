// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LoggingSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,safe_stringify=debug";

/// 使用默认过滤规则初始化日志
pub fn init_telemetry() {
    init_with_filter(DEFAULT_FILTER, false);
}

/// 按配置初始化日志
///
/// `RUST_LOG` 环境变量优先于配置中的过滤规则。
/// 全局订阅者已存在时（例如测试中重复调用）静默跳过。
pub fn init_telemetry_with(settings: &LoggingSettings) {
    init_with_filter(&settings.filter, settings.json);
}

fn init_with_filter(filter: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());

    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Telemetry already initialized");
    }
}
