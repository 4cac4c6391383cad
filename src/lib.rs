//! # authmux
//!
//! 可插拔的第三方登录抽象：提供商注册表 + OAuth1/OAuth2 会话生命周期，
//! 所有厂商最终产出统一的用户资料。
//!
//! 典型流程：`Registry::get_provider` → `Provider::begin_auth` →
//! 用户跳转并回调 → `Session::authorize` → `Provider::fetch_user`。

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod oauth1;
pub mod oauth2;
pub mod providers;

// Re-export commonly used types
pub use auth::{
    AccessToken, CallbackParams, ClientSettings, Credentials, EndpointOverrides, OAuthToken,
    Params, Provider, Registry, Session, TokenPair, User,
};
pub use config::AuthConfig;
pub use error::{AuthError, ErrorKind, Result};
