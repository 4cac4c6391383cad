//! # 配置管理模块
//!
//! 从 TOML 文件加载提供商配置并构建注册表

mod app_config;

pub use app_config::{AuthConfig, HttpConfig, ProviderConfig, VendorKind};

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{AuthError, Result};

/// 显式指定配置文件的环境变量
pub const CONFIG_ENV: &str = "AUTHMUX_CONFIG";

/// 默认配置文件路径：`AUTHMUX_CONFIG`，否则 `config/providers.{RUST_ENV}.toml`
pub fn config_path() -> PathBuf {
    resolve_config_path(env::var(CONFIG_ENV).ok(), env::var("RUST_ENV").ok())
}

fn resolve_config_path(explicit: Option<String>, rust_env: Option<String>) -> PathBuf {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let rust_env = rust_env
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "dev".to_string());
    PathBuf::from(format!("config/providers.{rust_env}.toml"))
}

/// 加载并验证配置文件
pub fn load_config(path: &Path) -> Result<AuthConfig> {
    if !path.exists() {
        return Err(AuthError::config(format!(
            "配置文件不存在: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        AuthError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
    })?;

    let config = AuthConfig::from_toml_str(&content)?;
    config.validate()?;

    tracing::debug!(path = %path.display(), providers = config.providers.len(), "configuration loaded");
    Ok(config)
}
