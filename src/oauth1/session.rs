//! # OAuth1 会话

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::session::display_marshaled;
use crate::auth::{AccessToken, Credentials, Params, PendingGrant, Provider, Session, TokenPair};
use crate::error::{AuthError, Result};

/// OAuth1 会话：保存请求令牌，授权后保存访问令牌
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Session {
    /// 用户授权地址
    #[serde(rename = "AuthURL", default, skip_serializing_if = "String::is_empty")]
    pub auth_url: String,
    /// 换得的访问令牌
    #[serde(rename = "AccessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessToken>,
    /// 握手阶段的请求令牌
    #[serde(rename = "RequestToken", default, skip_serializing_if = "Option::is_none")]
    pub request_token: Option<TokenPair>,
}

impl OAuth1Session {
    /// 创建握手阶段的会话
    pub fn new<S: Into<String>>(auth_url: S, request_token: TokenPair) -> Self {
        Self {
            auth_url: auth_url.into(),
            access_token: None,
            request_token: Some(request_token),
        }
    }

    /// 从 JSON 字符串恢复会话
    pub fn decode(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(AuthError::SessionDecodeFailed)
    }
}

#[async_trait]
impl Session for OAuth1Session {
    fn get_auth_url(&self) -> Result<String> {
        if self.auth_url.is_empty() {
            return Err(AuthError::NoAuthUrl);
        }
        Ok(self.auth_url.clone())
    }

    async fn authorize(&mut self, provider: &dyn Provider, params: &dyn Params) -> Result<String> {
        let Some(request_token) = &self.request_token else {
            return Err(AuthError::token_exchange(
                provider.name(),
                "session holds no request token",
            ));
        };

        let credentials = provider
            .exchange_grant(PendingGrant::RequestToken(request_token), params)
            .await?;

        match credentials {
            Credentials::Signed(token) => {
                let access_token = token.token.clone();
                self.access_token = Some(token);
                self.request_token = None;
                self.auth_url.clear();
                Ok(access_token)
            }
            Credentials::Bearer(_) => Err(AuthError::CredentialsMismatch {
                provider: provider.name().to_string(),
                expected: "signed",
            }),
        }
    }

    fn marshal(&self) -> Result<String> {
        serde_json::to_string(self).map_err(AuthError::SessionEncodeFailed)
    }

    fn credentials(&self) -> Option<Credentials> {
        self.access_token
            .as_ref()
            .filter(|token| !token.token.is_empty())
            .cloned()
            .map(Credentials::Signed)
    }
}

impl fmt::Display for OAuth1Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_marshaled(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_existing_cookie() {
        let session = OAuth1Session::decode(
            r#"{"AuthURL":"http://com/auth_url","AccessToken":{"Token":"1234567890","Secret":"secret!!","AdditionalData":{}},"RequestToken":{"Token":"0987654321","Secret":"!!secret"}}"#,
        )
        .unwrap();

        assert_eq!(session.auth_url, "http://com/auth_url");
        let access = session.access_token.as_ref().unwrap();
        assert_eq!(access.token, "1234567890");
        assert_eq!(access.secret, "secret!!");
        let request = session.request_token.as_ref().unwrap();
        assert_eq!(request.token, "0987654321");
        assert_eq!(request.secret, "!!secret");
    }

    #[test]
    fn marshal_is_deterministic() {
        let mut access = AccessToken::new("T", "S");
        access.additional_data.insert("b".to_string(), "2".to_string());
        access.additional_data.insert("a".to_string(), "1".to_string());
        let session = OAuth1Session {
            auth_url: String::new(),
            access_token: Some(access),
            request_token: None,
        };

        let first = session.marshal().unwrap();
        assert_eq!(first, session.clone().marshal().unwrap());
        assert_eq!(
            first,
            r#"{"AccessToken":{"Token":"T","Secret":"S","AdditionalData":{"a":"1","b":"2"}}}"#
        );
        assert_eq!(OAuth1Session::decode(&first).unwrap(), session);
    }

    #[test]
    fn credentials_need_access_token() {
        let session = OAuth1Session::new("https://x/authorize", TokenPair::new("R", "S"));
        assert_eq!(session.credentials(), None);
        assert_eq!(session.get_auth_url().unwrap(), "https://x/authorize");
    }
}
