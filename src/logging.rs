//! # 日志配置模块
//!
//! CLI 使用的 tracing 订阅器初始化。库代码只产生事件，不安装订阅器。

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 默认过滤规则：指定级别，HTTP 客户端内部日志降为 warn
fn default_filter(level: &str) -> String {
    format!("{level},authmux={level},hyper=warn,reqwest=warn,rustls=warn")
}

/// 初始化日志系统（`RUST_LOG` 优先）。重复调用时保留已安装的订阅器。
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");

    let result = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();

    if result.is_ok() {
        tracing::debug!(level, "logging initialized");
    }
}

/// 环境变量设置指南
pub fn print_logging_help() {
    println!("📋 日志配置指南:");
    println!("  RUST_LOG=info                      # 标准日志级别");
    println!("  RUST_LOG=debug                     # 调试级别（含流程细节）");
    println!("  RUST_LOG=authmux=trace             # 应用详细追踪");
    println!("  RUST_LOG=info,reqwest=debug        # 排查厂商网络问题");
    println!();
    println!("💡 厂商原始响应需要同时打开提供商 debug 开关并使用 debug 级别");
}
