//! # OAuth2 会话

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::session::display_marshaled;
use crate::auth::{Credentials, OAuthToken, Params, PendingGrant, Provider, Session};
use crate::error::{AuthError, Result};

/// OAuth2 厂商共用的会话。
///
/// 序列化键名与已有 cookie 格式保持一致，空字段不输出；
/// 同时接受 Azure AD 旧格式的短键名（`au`/`at`/`rt`/`exp`）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerSession {
    /// 用户授权地址
    #[serde(rename = "AuthURL", alias = "au", default, skip_serializing_if = "String::is_empty")]
    pub auth_url: String,
    /// 访问令牌
    #[serde(rename = "AccessToken", alias = "at", default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    /// 刷新令牌
    #[serde(rename = "RefreshToken", alias = "rt", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// 访问令牌过期时间
    #[serde(rename = "ExpiresAt", alias = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl BearerSession {
    /// 新登录会话
    pub fn new<S: Into<String>>(auth_url: S) -> Self {
        Self {
            auth_url: auth_url.into(),
            ..Self::default()
        }
    }

    /// 从 `marshal` 输出还原
    pub fn decode(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(AuthError::SessionDecodeFailed)
    }

    fn store(&mut self, token: OAuthToken) -> String {
        self.access_token.clone_from(&token.access_token);
        self.refresh_token = token.refresh_token;
        self.expires_at = token.expires_at;
        self.auth_url.clear();
        token.access_token
    }
}

#[async_trait]
impl Session for BearerSession {
    fn get_auth_url(&self) -> Result<String> {
        if self.auth_url.is_empty() {
            return Err(AuthError::NoAuthUrl);
        }
        Ok(self.auth_url.clone())
    }

    async fn authorize(&mut self, provider: &dyn Provider, params: &dyn Params) -> Result<String> {
        match provider
            .exchange_grant(PendingGrant::AuthorizationCode, params)
            .await?
        {
            Credentials::Bearer(token) => Ok(self.store(token)),
            Credentials::Signed(_) => Err(AuthError::CredentialsMismatch {
                provider: provider.name().to_string(),
                expected: "bearer",
            }),
        }
    }

    fn marshal(&self) -> Result<String> {
        serde_json::to_string(self).map_err(AuthError::SessionEncodeFailed)
    }

    fn credentials(&self) -> Option<Credentials> {
        if self.access_token.is_empty() {
            return None;
        }
        Some(Credentials::Bearer(OAuthToken {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.expires_at,
            ..OAuthToken::default()
        }))
    }
}

impl fmt::Display for BearerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_marshaled(self, f)
    }
}
