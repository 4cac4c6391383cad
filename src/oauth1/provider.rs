//! # OAuth1 提供商

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

use super::consumer::{Consumer, ConsumerEndpoints};
use super::session::OAuth1Session;
use super::signature::{SignatureMethod, percent_encode};
use super::OAuth1Vendor;
use crate::auth::{ClientSettings, Credentials, OAuthToken, Params, PendingGrant, Provider, Session, User};
use crate::error::{AuthError, Result};
use crate::http::{build_client, parse_endpoint, read_profile};

/// 三段式 OAuth1 提供商
pub struct OAuth1Provider<V> {
    name: String,
    callback_url: String,
    consumer: Consumer,
    profile_url: Url,
    vendor: V,
    debug: AtomicBool,
}

impl<V: OAuth1Vendor> OAuth1Provider<V> {
    /// 由客户端设置与厂商描述创建提供商
    pub fn new(settings: ClientSettings, vendor: V, method: SignatureMethod) -> Result<Self> {
        let name = vendor.default_name().to_string();
        let endpoints = vendor.endpoints().apply(&settings.endpoints);

        let consumer_endpoints = ConsumerEndpoints {
            request_token_url: parse_endpoint(&name, "request token URL", &endpoints.request_token_url)?,
            authorize_url: parse_endpoint(&name, "authorize URL", &endpoints.authorize_url)?,
            access_token_url: parse_endpoint(&name, "access token URL", &endpoints.access_token_url)?,
        };
        let profile_url = parse_endpoint(&name, "profile URL", &endpoints.profile_url)?;
        let http = build_client(&settings.http)?;

        let consumer = Consumer::new(
            &name,
            settings.client_id,
            settings.client_secret,
            method,
            consumer_endpoints,
            http,
        );

        tracing::debug!(provider = %name, method = %method, "OAuth1 provider created");

        Ok(Self {
            name,
            callback_url: settings.redirect_uri,
            consumer,
            profile_url,
            vendor,
            debug: AtomicBool::new(false),
        })
    }

    /// 底层 OAuth1 消费者
    pub const fn consumer(&self) -> &Consumer {
        &self.consumer
    }

    /// 回调地址，未配置时为空
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// 把 state 附在回跳地址上，厂商会原样带回
    fn callback_with_state(&self, state: &str) -> String {
        if self.callback_url.is_empty() {
            return "oob".to_string();
        }
        if state.is_empty() {
            return self.callback_url.clone();
        }
        let separator = if self.callback_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}state={}", self.callback_url, percent_encode(state))
    }
}

impl<V: fmt::Debug> fmt::Debug for OAuth1Provider<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Provider")
            .field("name", &self.name)
            .field("callback_url", &self.callback_url)
            .field("consumer", &self.consumer)
            .field("profile_url", &self.profile_url.as_str())
            .field("vendor", &self.vendor)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<V: OAuth1Vendor> Provider for OAuth1Provider<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.consumer.set_provider(&name);
        self.name = name;
    }

    async fn begin_auth(&self, state: &str) -> Result<Box<dyn Session>> {
        let request_token = self
            .consumer
            .request_token(&self.callback_with_state(state))
            .await?;
        let auth_url = self.consumer.authorize_url(&request_token);

        tracing::debug!(provider = %self.name, "request token obtained");
        Ok(Box::new(OAuth1Session::new(auth_url, request_token)))
    }

    fn unmarshal_session(&self, data: &str) -> Result<Box<dyn Session>> {
        Ok(Box::new(OAuth1Session::decode(data)?))
    }

    async fn exchange_grant(
        &self,
        grant: PendingGrant<'_>,
        params: &dyn Params,
    ) -> Result<Credentials> {
        let PendingGrant::RequestToken(request_token) = grant else {
            return Err(AuthError::CredentialsMismatch {
                provider: self.name.clone(),
                expected: "signed",
            });
        };

        let verifier = params.get("oauth_verifier");
        if verifier.is_empty() {
            return Err(AuthError::token_exchange(
                &self.name,
                "callback is missing the oauth_verifier parameter",
            ));
        }

        let token = params.get("oauth_token");
        if !token.is_empty() && token != request_token.token {
            return Err(AuthError::token_exchange(
                &self.name,
                "callback oauth_token does not match the session request token",
            ));
        }

        let access_token = self.consumer.access_token(request_token, verifier).await?;
        Ok(Credentials::Signed(access_token))
    }

    async fn fetch_user(&self, session: &dyn Session) -> Result<User> {
        let token = match session.credentials() {
            Some(Credentials::Signed(token)) => token,
            Some(Credentials::Bearer(_)) => {
                return Err(AuthError::CredentialsMismatch {
                    provider: self.name.clone(),
                    expected: "signed",
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

        let mut request = self.consumer.signed_get(&self.profile_url, &token)?;
        for (header, value) in self.vendor.profile_headers() {
            request = request.header(header, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::profile_fetch(&self.name, None, format!("request failed: {e}")))?;

        let debug = self.debug.load(Ordering::Relaxed);
        let raw = read_profile(&self.name, response, self.vendor.profile_scope(), debug).await?;

        let mut user = User::for_provider(&self.name);
        user.access_token = token.token;
        user.access_token_secret = token.secret;
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
        false
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<Option<OAuthToken>> {
        Ok(None)
    }

    fn debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Xero;

    fn xero_with_callback(callback: &str) -> OAuth1Provider<Xero> {
        OAuth1Provider::new(
            ClientSettings::new("key", "secret", callback),
            Xero,
            SignatureMethod::HmacSha256,
        )
        .unwrap()
    }

    #[test]
    fn state_rides_on_callback() {
        let provider = xero_with_callback("http://localhost:3000/callback");
        assert_eq!(provider.callback_url(), "http://localhost:3000/callback");
        assert_eq!(
            provider.callback_with_state("a b"),
            "http://localhost:3000/callback?state=a%20b"
        );
        assert_eq!(provider.callback_with_state(""), "http://localhost:3000/callback");

        let provider = xero_with_callback("http://localhost:3000/callback?tenant=1");
        assert_eq!(
            provider.callback_with_state("xyz"),
            "http://localhost:3000/callback?tenant=1&state=xyz"
        );
    }

    #[test]
    fn missing_callback_is_out_of_band() {
        assert_eq!(xero_with_callback("").callback_with_state("xyz"), "oob");
    }

    #[test]
    fn rename_reaches_consumer_errors() {
        let mut provider = xero_with_callback("http://localhost:3000/callback");
        assert_eq!(provider.consumer().method(), SignatureMethod::HmacSha256);

        provider.set_name("xero-sandbox".to_string());
        assert_eq!(provider.name(), "xero-sandbox");
        assert!(format!("{:?}", provider.consumer()).contains("xero-sandbox"));
    }
}
