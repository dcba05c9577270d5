//! 日志初始化模块
//!
//! 所有服务通过单一入口点配置 tracing 订阅器，保证一致的日志格式与过滤规则。

use anyhow::Result;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// 日志级别（如 "info", "debug"），RUST_LOG 存在时以 RUST_LOG 为准
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 是否启用 JSON 格式日志
    #[serde(default)]
    pub json_logs: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// 构建环境过滤器：RUST_LOG 优先，其次配置的级别，都无效时退回 info
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// 初始化 tracing 订阅器
///
/// 同一进程只能初始化一次，重复调用返回错误。
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<()> {
    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()?;

    info!(
        service = %service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = ObservabilityConfig {
            log_level: "not a [valid filter".to_string(),
            json_logs: false,
        };
        // 不应 panic
        let _ = config.env_filter();
    }
}
