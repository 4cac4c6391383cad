//! # OAuth2 提供商
//!
//! 所有授权码模式厂商共用的提供商实现，厂商差异由 `V: OAuth2Vendor` 给出。

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

use super::session::BearerSession;
use super::token_exchange::TokenRequest;
use super::OAuth2Vendor;
use crate::auth::{ClientSettings, Credentials, OAuthToken, Params, PendingGrant, Provider, Session, User};
use crate::error::{AuthError, Result};
use crate::http::{build_client, parse_endpoint, read_profile};

const DEFAULT_GRANT_SCOPE: &str = "default";

/// 授权码模式提供商
pub struct OAuth2Provider<V> {
    name: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    auth_url: Url,
    token_url: Url,
    profile_url: Url,
    vendor: V,
    http: reqwest::Client,
    debug: AtomicBool,
}

impl<V: OAuth2Vendor> OAuth2Provider<V> {
    /// 创建提供商；端点无效或 HTTP 客户端无法构建时返回配置错误
    pub fn new(settings: ClientSettings, vendor: V) -> Result<Self> {
        let name = vendor.default_name().to_string();
        let endpoints = vendor.endpoints().apply(&settings.endpoints);

        let auth_url = parse_endpoint(&name, "authorize URL", &endpoints.auth_url)?;
        let token_url = parse_endpoint(&name, "token URL", &endpoints.token_url)?;
        let profile_url = parse_endpoint(&name, "profile URL", &endpoints.profile_url)?;
        let http = build_client(&settings.http)?;
        let scopes = settings.scopes_or(vendor.default_scopes());

        tracing::debug!(
            provider = %name,
            auth_url = %auth_url,
            token_url = %token_url,
            scopes = ?scopes,
            "OAuth2 provider created"
        );

        Ok(Self {
            name,
            client_id: settings.client_id,
            client_secret: settings.client_secret,
            redirect_uri: settings.redirect_uri,
            scopes,
            auth_url,
            token_url,
            profile_url,
            vendor,
            http,
            debug: AtomicBool::new(false),
        })
    }

    /// 厂商描述
    pub const fn vendor(&self) -> &V {
        &self.vendor
    }

    /// 实际请求的授权范围
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    fn token_request(&self) -> TokenRequest<'_> {
        TokenRequest {
            provider: &self.name,
            http: &self.http,
            token_url: &self.token_url,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            auth_style: self.vendor.auth_style(),
            debug: self.debug_enabled(),
        }
    }

    /// 带 state 的授权跳转地址
    pub fn authorize_url(&self, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.client_id);
            if !self.redirect_uri.is_empty() {
                query.append_pair("redirect_uri", &self.redirect_uri);
            }
            query.append_pair("response_type", "code");
            if !self.scopes.is_empty() {
                query.append_pair("scope", &self.scopes.join(" "));
            }
            query.append_pair("state", state);
            for (key, value) in self.vendor.authorize_params() {
                query.append_pair(key, &value);
            }
        }
        url
    }

    /// 资料接口 403 时报告的授权范围；厂商未声明且未请求任何范围时为 `default`
    fn required_scope(&self) -> String {
        if let Some(scope) = self.vendor.profile_scope() {
            return scope.to_string();
        }
        if self.scopes.is_empty() {
            return DEFAULT_GRANT_SCOPE.to_string();
        }
        self.scopes.join(" ")
    }

    fn callback_error(&self, params: &dyn Params) -> AuthError {
        let error = params.get("error");
        if error.is_empty() {
            return AuthError::token_exchange(&self.name, "callback is missing the code parameter");
        }
        let description = params.get("error_description");
        let message = if description.is_empty() {
            format!("authorization denied: {error}")
        } else {
            format!("authorization denied: {error}: {description}")
        };
        AuthError::token_exchange(&self.name, message)
    }
}

impl<V> fmt::Debug for OAuth2Provider<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Provider")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("profile_url", &self.profile_url.as_str())
            .field("vendor", &self.vendor)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<V: OAuth2Vendor> Provider for OAuth2Provider<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    async fn begin_auth(&self, state: &str) -> Result<Box<dyn Session>> {
        let url = self.authorize_url(state);
        tracing::debug!(provider = %self.name, "authorization URL generated");
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
            return Err(self.callback_error(params));
        }

        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
        ];
        if !self.redirect_uri.is_empty() {
            form.push(("redirect_uri", self.redirect_uri.clone()));
        }

        let token = self.token_request().send(form).await?;
        Ok(Credentials::Bearer(self.vendor.retention().apply(token)))
    }

    async fn fetch_user(&self, session: &dyn Session) -> Result<User> {
        let token = match session.credentials() {
            Some(Credentials::Bearer(token)) => token,
            Some(Credentials::Signed(_)) => {
                return Err(AuthError::CredentialsMismatch {
                    provider: self.name.clone(),
                    expected: "bearer",
                });
            }
            None => {
                return Err(AuthError::profile_fetch(
                    &self.name,
                    None,
                    "cannot get user information without accessToken",
                ));
            }
        };

        let response = self
            .http
            .get(self.profile_url.clone())
            .bearer_auth(&token.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AuthError::profile_fetch(&self.name, None, format!("request failed: {e}")))?;

        let raw = read_profile(&self.name, response, &self.required_scope(), self.debug_enabled()).await?;

        let mut user = User::for_provider(&self.name);
        user.access_token = token.access_token;
        user.refresh_token = token.refresh_token.unwrap_or_default();
        user.expires_at = token.expires_at;
        self.vendor.map_user(&raw, &mut user);
        user.raw_data = raw;

        if user.user_id.is_empty() {
            return Err(AuthError::profile_fetch(
                &self.name,
                None,
                "profile response did not include a user id",
            ));
        }

        tracing::info!(provider = %self.name, user_id = %user.user_id, "user profile fetched");
        Ok(user)
    }

    fn refresh_token_available(&self) -> bool {
        self.vendor.refresh_token_available()
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Option<OAuthToken>> {
        if !self.vendor.refresh_token_available() {
            return Ok(None);
        }
        if refresh_token.is_empty() {
            return Err(AuthError::token_exchange(&self.name, "refresh token is empty"));
        }

        let form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
        ];
        let mut token = self.token_request().send(form).await?;
        // 厂商未轮换刷新令牌时沿用旧值
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(Some(token))
    }

    fn debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }
}
