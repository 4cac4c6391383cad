//! # OAuth2 协议族
//!
//! 授权码模式的公共实现：`OAuth2Provider<V>` 负责 URL 拼接、令牌交换、
//! 刷新与资料获取，厂商之间的差异全部收敛到 `OAuth2Vendor` 描述中。

mod provider;
mod session;
mod token_exchange;

pub use provider::OAuth2Provider;
pub use session::BearerSession;

use serde_json::{Map, Value};

use crate::auth::{EndpointOverrides, OAuthToken, User};

/// OAuth2 厂商端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// 授权地址
    pub auth_url: String,
    /// 令牌地址
    pub token_url: String,
    /// 用户资料地址
    pub profile_url: String,
}

impl Endpoints {
    /// 由三个地址构造
    pub fn new<A, T, P>(auth_url: A, token_url: T, profile_url: P) -> Self
    where
        A: Into<String>,
        T: Into<String>,
        P: Into<String>,
    {
        Self {
            auth_url: auth_url.into(),
            token_url: token_url.into(),
            profile_url: profile_url.into(),
        }
    }

    /// 叠加调用方的端点覆盖
    #[must_use]
    pub fn apply(mut self, overrides: &EndpointOverrides) -> Self {
        if let Some(url) = &overrides.auth_url {
            self.auth_url.clone_from(url);
        }
        if let Some(url) = &overrides.token_url {
            self.token_url.clone_from(url);
        }
        if let Some(url) = &overrides.profile_url {
            self.profile_url.clone_from(url);
        }
        self
    }
}

/// 令牌端点的客户端认证方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStyle {
    /// `client_id` / `client_secret` 放在表单体中
    #[default]
    InParams,
    /// HTTP Basic 认证头
    InHeader,
}

/// 会话保留哪些令牌字段（部分厂商为控制 cookie 大小只保留访问令牌）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRetention {
    /// 是否保留刷新令牌
    pub refresh_token: bool,
    /// 是否保留过期时间
    pub expiry: bool,
}

impl TokenRetention {
    /// 全部保留
    pub const ALL: Self = Self {
        refresh_token: true,
        expiry: true,
    };
    /// 只保留访问令牌
    pub const ACCESS_ONLY: Self = Self {
        refresh_token: false,
        expiry: false,
    };
    /// 保留过期时间，丢弃刷新令牌
    pub const WITHOUT_REFRESH: Self = Self {
        refresh_token: false,
        expiry: true,
    };

    /// 去掉不保留的字段
    pub fn apply(self, mut token: OAuthToken) -> OAuthToken {
        if !self.refresh_token {
            token.refresh_token = None;
        }
        if !self.expiry {
            token.expires_at = None;
        }
        token
    }
}

/// OAuth2 厂商描述
pub trait OAuth2Vendor: Send + Sync + std::fmt::Debug + 'static {
    /// 默认注册名
    fn default_name(&self) -> &'static str;

    /// 默认端点
    fn endpoints(&self) -> Endpoints;

    /// 未配置授权范围时请求的默认范围
    fn default_scopes(&self) -> &'static [&'static str] {
        &[]
    }

    /// 客户端凭证的传递方式
    fn auth_style(&self) -> AuthStyle {
        AuthStyle::InParams
    }

    /// 授权 URL 上的厂商专属参数
    fn authorize_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// 令牌字段的保留策略
    fn retention(&self) -> TokenRetention {
        TokenRetention::ALL
    }

    /// 厂商是否签发刷新令牌
    fn refresh_token_available(&self) -> bool;

    /// 获取资料所需的授权范围，403 时报告给调用方
    fn profile_scope(&self) -> Option<&'static str> {
        None
    }

    /// 把厂商资料响应映射到统一用户资料（尽力填充）
    fn map_user(&self, raw: &Map<String, Value>, user: &mut User);
}
