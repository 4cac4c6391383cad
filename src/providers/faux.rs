//! # 测试用提供商
//!
//! 不访问网络的内存实现：回调中的 `code` 直接作为访问令牌，
//! 资料为固定的测试用户。用于注册表与调用方流程的测试。

use async_trait::async_trait;

use crate::auth::{Credentials, OAuthToken, Params, PendingGrant, Provider, Session, User};
use crate::error::{AuthError, Result};
use crate::oauth2::BearerSession;

const AUTH_URL: &str = "http://example.com/auth";

/// 不访问网络的测试提供商
#[derive(Debug, Clone)]
pub struct Faux {
    name: String,
    user: User,
}

impl Default for Faux {
    fn default() -> Self {
        Self::new()
    }
}

impl Faux {
    /// 使用默认用户模板
    pub fn new() -> Self {
        Self {
            name: "faux".to_string(),
            user: User {
                user_id: "faux-user".to_string(),
                name: "Homer Simpson".to_string(),
                nick_name: "Homer".to_string(),
                email: "homer@example.com".to_string(),
                location: "Springfield".to_string(),
                ..User::default()
            },
        }
    }

    /// 替换 `fetch_user` 返回的资料模板
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }
}

#[async_trait]
impl Provider for Faux {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    async fn begin_auth(&self, state: &str) -> Result<Box<dyn Session>> {
        let url = format!("{AUTH_URL}?state={}", urlencoding::encode(state));
        Ok(Box::new(BearerSession::new(url)))
    }

    fn unmarshal_session(&self, data: &str) -> Result<Box<dyn Session>> {
        Ok(Box::new(BearerSession::decode(data)?))
    }

    async fn exchange_grant(
        &self,
        grant: PendingGrant<'_>,
        params: &dyn Params,
    ) -> Result<Credentials> {
        if let PendingGrant::RequestToken(_) = grant {
            return Err(AuthError::CredentialsMismatch {
                provider: self.name.clone(),
                expected: "bearer",
            });
        }
        let code = params.get("code");
        if code.is_empty() {
            return Err(AuthError::token_exchange(
                &self.name,
                "callback is missing the code parameter",
            ));
        }
        Ok(Credentials::Bearer(OAuthToken::bearer(code)))
    }

    async fn fetch_user(&self, session: &dyn Session) -> Result<User> {
        let Some(credentials) = session.credentials() else {
            return Err(AuthError::profile_fetch(
                &self.name,
                None,
                "cannot get user information without accessToken",
            ));
        };

        let mut user = self.user.clone();
        user.provider.clone_from(&self.name);
        user.access_token = credentials.access_token().to_string();
        Ok(user)
    }

    fn refresh_token_available(&self) -> bool {
        false
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<Option<OAuthToken>> {
        Ok(None)
    }

    fn debug(&self, _enabled: bool) {}
}

/// 创建测试用提供商
pub fn new() -> Box<dyn Provider> {
    Box::new(Faux::new())
}
