//! # 令牌与凭据类型
//!
//! OAuth2 的 bearer 令牌、OAuth1 的 token/secret 对，以及两者在会话与
//! 提供商之间传递时使用的协议族中立视图。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OAuth2 bearer 令牌
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// 访问令牌
    pub access_token: String,
    /// 令牌类型，通常为 `bearer`
    pub token_type: Option<String>,
    /// 刷新令牌
    pub refresh_token: Option<String>,
    /// 厂商不提供有效期时为 `None`
    pub expires_at: Option<DateTime<Utc>>,
    /// 厂商实际授予的授权范围
    pub scopes: Vec<String>,
}

impl OAuthToken {
    /// 创建只有访问令牌的 bearer 令牌
    pub fn bearer<S: Into<String>>(access_token: S) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }
}

/// OAuth1 token/secret 对（请求令牌）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenPair {
    /// 令牌
    pub token: String,
    /// 令牌密钥
    pub secret: String,
}

impl TokenPair {
    /// 由令牌与密钥构造
    pub fn new<T: Into<String>, S: Into<String>>(token: T, secret: S) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

/// OAuth1 访问令牌
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessToken {
    /// 访问令牌
    pub token: String,
    /// 访问令牌密钥
    pub secret: String,
    /// 厂商随令牌返回的其它字段（有序，保证序列化结果稳定）
    #[serde(default)]
    pub additional_data: BTreeMap<String, String>,
}

impl AccessToken {
    /// 由令牌与密钥构造
    pub fn new<T: Into<String>, S: Into<String>>(token: T, secret: S) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
            additional_data: BTreeMap::new(),
        }
    }

    /// 签名请求只需要 token/secret 对
    pub fn pair(&self) -> TokenPair {
        TokenPair::new(self.token.clone(), self.secret.clone())
    }
}

/// 会话持有的凭据（协议族中立）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// OAuth2 bearer 令牌
    Bearer(OAuthToken),
    /// OAuth1 签名用访问令牌
    Signed(AccessToken),
}

impl Credentials {
    /// 访问令牌字符串
    pub fn access_token(&self) -> &str {
        match self {
            Self::Bearer(token) => &token.access_token,
            Self::Signed(token) => &token.token,
        }
    }
}

/// 会话交给提供商去兑换的待定授权
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingGrant<'a> {
    /// OAuth2：回调参数里的 `code`
    AuthorizationCode,
    /// OAuth1：`begin_auth` 时取得的请求令牌，配合回调里的 `oauth_verifier`
    RequestToken(&'a TokenPair),
}
