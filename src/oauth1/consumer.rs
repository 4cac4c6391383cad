//! # OAuth1 消费方
//!
//! 三段式流程：申请请求令牌 → 用户授权 → 用 verifier 换访问令牌，
//! 之后用访问令牌对资料请求签名。

use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use std::collections::BTreeMap;
use url::Url;

use super::signature::{OAuthParams, SignatureMethod, nonce};
use crate::auth::{AccessToken, TokenPair};
use crate::error::{AuthError, Result};
use crate::http::body_preview;

/// OAuth1 服务端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerEndpoints {
    /// 请求令牌地址
    pub request_token_url: Url,
    /// 用户授权地址
    pub authorize_url: Url,
    /// 访问令牌地址
    pub access_token_url: Url,
}

/// RFC 5849 消费方
#[derive(Clone)]
pub struct Consumer {
    provider: String,
    consumer_key: String,
    consumer_secret: String,
    method: SignatureMethod,
    endpoints: ConsumerEndpoints,
    http: reqwest::Client,
}

impl std::fmt::Debug for Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("provider", &self.provider)
            .field("consumer_key", &self.consumer_key)
            .field("method", &self.method)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl Consumer {
    /// 创建消费者，签名方式由调用方指定
    pub fn new(
        provider: &str,
        consumer_key: String,
        consumer_secret: String,
        method: SignatureMethod,
        endpoints: ConsumerEndpoints,
        http: reqwest::Client,
    ) -> Self {
        Self {
            provider: provider.to_string(),
            consumer_key,
            consumer_secret,
            method,
            endpoints,
            http,
        }
    }

    pub(crate) fn set_provider(&mut self, provider: &str) {
        self.provider = provider.to_string();
    }

    /// 当前签名方式
    pub const fn method(&self) -> SignatureMethod {
        self.method
    }

    fn oauth_params(&self) -> OAuthParams {
        OAuthParams::new(&self.consumer_key, self.method, nonce(), Utc::now().timestamp())
    }

    fn header(&self, params: OAuthParams, url: &Url, token_secret: &str) -> Option<String> {
        params
            .authorization_header("GET", url, self.method, &self.consumer_secret, token_secret)
            .ok()
    }

    /// 申请请求令牌，`callback` 为用户授权后的回跳地址
    pub async fn request_token(&self, callback: &str) -> Result<TokenPair> {
        let url = &self.endpoints.request_token_url;
        let params = self.oauth_params().with("oauth_callback", callback);
        let header = self
            .header(params, url, "")
            .ok_or_else(|| AuthError::token_exchange(&self.provider, "failed to sign request token request"))?;

        let fields = self.token_request(url, header).await?;
        let token = fields.get("oauth_token").cloned().unwrap_or_default();
        let secret = fields.get("oauth_token_secret").cloned().unwrap_or_default();
        if token.is_empty() {
            return Err(AuthError::token_exchange(
                &self.provider,
                "request token response has no oauth_token",
            ));
        }

        if fields.get("oauth_callback_confirmed").is_some_and(|v| v != "true") {
            tracing::warn!(provider = %self.provider, "oauth_callback was not confirmed by the server");
        }

        Ok(TokenPair::new(token, secret))
    }

    /// 用户授权页地址
    pub fn authorize_url(&self, request_token: &TokenPair) -> Url {
        let mut url = self.endpoints.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("oauth_token", &request_token.token);
        url
    }

    /// 用请求令牌与 verifier 换取访问令牌
    pub async fn access_token(&self, request_token: &TokenPair, verifier: &str) -> Result<AccessToken> {
        let url = &self.endpoints.access_token_url;
        let params = self
            .oauth_params()
            .with("oauth_token", &request_token.token)
            .with("oauth_verifier", verifier);
        let header = self
            .header(params, url, &request_token.secret)
            .ok_or_else(|| AuthError::token_exchange(&self.provider, "failed to sign access token request"))?;

        let mut fields = self.token_request(url, header).await?;
        let token = fields.remove("oauth_token").unwrap_or_default();
        let secret = fields.remove("oauth_token_secret").unwrap_or_default();
        if token.is_empty() {
            return Err(AuthError::invalid_token(&self.provider, "empty access token"));
        }

        tracing::info!(provider = %self.provider, "access token obtained");
        Ok(AccessToken {
            token,
            secret,
            additional_data: fields,
        })
    }

    /// 构造用访问令牌签名的 GET 请求
    pub fn signed_get(&self, url: &Url, token: &AccessToken) -> Result<reqwest::RequestBuilder> {
        let params = self.oauth_params().with("oauth_token", &token.token);
        let header = self.header(params, url, &token.secret).ok_or_else(|| {
            AuthError::profile_fetch(&self.provider, None, "failed to sign profile request")
        })?;
        Ok(self.http.get(url.clone()).header(AUTHORIZATION, header))
    }

    async fn token_request(&self, url: &Url, header: String) -> Result<BTreeMap<String, String>> {
        let response = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await
            .map_err(|e| AuthError::token_exchange_with_source(&self.provider, "token request failed", e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AuthError::token_exchange_with_source(&self.provider, "failed to read token response", e)
        })?;

        if !status.is_success() {
            return Err(AuthError::token_exchange(
                &self.provider,
                format!("HTTP {status}: {}", body_preview(&body)),
            ));
        }

        Ok(url::form_urlencoded::parse(body.trim().as_bytes())
            .into_owned()
            .collect())
    }
}
