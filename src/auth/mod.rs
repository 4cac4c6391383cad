//! # 认证核心
//!
//! 提供商与会话契约、回调参数、统一用户资料以及提供商注册表。
//! 具体协议族实现位于 `crate::oauth2` / `crate::oauth1`，厂商适配位于 `crate::providers`。

pub mod params;
pub mod provider;
pub mod registry;
pub mod session;
pub mod settings;
pub mod types;
pub mod user;

pub use params::{CallbackParams, Params};
pub use provider::Provider;
pub use registry::Registry;
pub use session::Session;
pub use settings::{ClientSettings, EndpointOverrides, HttpOptions};
pub use types::{AccessToken, Credentials, OAuthToken, PendingGrant, TokenPair};
pub use user::User;
