//! # 客户端配置
//!
//! 构造提供商时使用的客户端凭据、授权范围、端点覆盖与 HTTP 选项。
//! 构造完成后不可修改。

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 厂商端点覆盖，未设置的项使用厂商默认值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOverrides {
    /// 覆盖授权地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    /// 覆盖令牌地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    /// 覆盖用户资料地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    /// 仅 OAuth1 使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_token_url: Option<String>,
}

impl EndpointOverrides {
    /// 所有端点都未覆盖
    pub const fn is_empty(&self) -> bool {
        self.auth_url.is_none()
            && self.token_url.is_none()
            && self.profile_url.is_none()
            && self.request_token_url.is_none()
    }

    /// 已设置的覆盖项
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("auth_url", self.auth_url.as_deref()),
            ("token_url", self.token_url.as_deref()),
            ("profile_url", self.profile_url.as_deref()),
            ("request_token_url", self.request_token_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }
}

/// 访问厂商接口时的 HTTP 选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpOptions {
    /// 请求超时；默认不设置，由调用方自行控制截止时间
    pub timeout: Option<Duration>,
    /// 自定义 User-Agent（Reddit 等厂商要求必须提供）
    pub user_agent: Option<String>,
}

/// 构造提供商所需的客户端设置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    /// 客户端 ID（OAuth1 中为 consumer key）
    pub client_id: String,
    /// 客户端密钥（OAuth1 中为 consumer secret）
    pub client_secret: String,
    /// 回调地址
    pub redirect_uri: String,
    /// 请求的授权范围，为空时使用厂商默认值
    pub scopes: Vec<String>,
    /// 端点覆盖（测试或私有部署）
    pub endpoints: EndpointOverrides,
    /// HTTP 客户端选项
    pub http: HttpOptions,
}

impl ClientSettings {
    /// 创建客户端设置
    pub fn new<I, S, R>(client_id: I, client_secret: S, redirect_uri: R) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        R: Into<String>,
    {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            ..Self::default()
        }
    }

    /// 设置授权范围
    #[must_use]
    pub fn with_scopes<S: AsRef<str>>(mut self, scopes: &[S]) -> Self {
        self.scopes = scopes.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// 设置端点覆盖
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointOverrides) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// 设置请求超时
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = Some(timeout);
        self
    }

    /// 设置 User-Agent
    #[must_use]
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.http.user_agent = Some(user_agent.into());
        self
    }

    /// 请求的授权范围，未配置时退回厂商默认值
    pub(crate) fn scopes_or(&self, defaults: &[&str]) -> Vec<String> {
        if self.scopes.is_empty() {
            defaults.iter().map(ToString::to_string).collect()
        } else {
            self.scopes.clone()
        }
    }
}
