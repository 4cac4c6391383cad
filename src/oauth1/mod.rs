//! # OAuth1 协议族
//!
//! RFC 5849 三段式流程的公共实现。`OAuth1Provider<V>` 在 `begin_auth` 时
//! 申请请求令牌，回调时用 `oauth_verifier` 兑换访问令牌，资料请求逐个签名。

mod consumer;
mod provider;
mod session;
mod signature;

pub use consumer::{Consumer, ConsumerEndpoints};
pub use provider::OAuth1Provider;
pub use session::OAuth1Session;
pub use signature::SignatureMethod;

use reqwest::header::HeaderName;
use serde_json::{Map, Value};

use crate::auth::{EndpointOverrides, User};

/// OAuth1 厂商端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth1Endpoints {
    /// 请求令牌地址
    pub request_token_url: String,
    /// 用户授权地址
    pub authorize_url: String,
    /// 访问令牌地址
    pub access_token_url: String,
    /// 资料接口完整地址
    pub profile_url: String,
}

impl OAuth1Endpoints {
    /// 叠加覆盖：`auth_url` 对应授权页，`token_url` 对应访问令牌端点
    #[must_use]
    pub fn apply(mut self, overrides: &EndpointOverrides) -> Self {
        if let Some(url) = &overrides.request_token_url {
            self.request_token_url.clone_from(url);
        }
        if let Some(url) = &overrides.auth_url {
            self.authorize_url.clone_from(url);
        }
        if let Some(url) = &overrides.token_url {
            self.access_token_url.clone_from(url);
        }
        if let Some(url) = &overrides.profile_url {
            self.profile_url.clone_from(url);
        }
        self
    }
}

/// OAuth1 厂商描述
pub trait OAuth1Vendor: Send + Sync + std::fmt::Debug + 'static {
    /// 默认注册名
    fn default_name(&self) -> &'static str;

    /// 厂商默认端点
    fn endpoints(&self) -> OAuth1Endpoints;

    /// 资料请求附加的请求头
    fn profile_headers(&self) -> Vec<(HeaderName, &'static str)> {
        Vec::new()
    }

    /// 资料接口返回 403 时报告的访问范围
    fn profile_scope(&self) -> &'static str {
        "profile"
    }

    /// 把原始资料映射到统一用户记录
    fn map_user(&self, raw: &Map<String, Value>, user: &mut User);
}
