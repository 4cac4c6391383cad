//! # 令牌交换
//!
//! 授权码换令牌与刷新令牌共用的请求/响应处理。
//! 令牌端点响应可能是 JSON，也可能是表单编码（如 Bitly），两者都接受。

use chrono::{TimeDelta, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use url::Url;

use super::AuthStyle;
use crate::auth::OAuthToken;
use crate::error::{AuthError, Result};
use crate::http::body_preview;

/// 令牌端点原始响应
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    pub token_type: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    // 错误响应字段
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// 按 Content-Type 解析响应体
    pub(crate) fn parse(content_type: &str, body: &str) -> serde_json::Result<Self> {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.starts_with("application/x-www-form-urlencoded")
            || content_type.starts_with("text/plain")
        {
            let fields: Map<String, Value> = url::form_urlencoded::parse(body.as_bytes())
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            serde_json::from_value(Value::Object(fields))
        } else {
            serde_json::from_str(body)
        }
    }

    fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|error| {
            match self.error_description.as_deref().filter(|d| !d.is_empty()) {
                Some(description) => format!("{error}: {description}"),
                None => error.clone(),
            }
        })
    }

    /// 校验并转换为令牌
    pub(crate) fn into_token(self, provider: &str) -> Result<OAuthToken> {
        if let Some(message) = self.error_message() {
            return Err(AuthError::token_exchange(provider, message));
        }

        if self.access_token.is_empty() {
            return Err(AuthError::invalid_token(provider, "empty access token"));
        }

        let expires_at = match self.expires_in {
            Some(secs) if secs < 0 => {
                return Err(AuthError::invalid_token(provider, "token already expired"));
            }
            Some(0) | None => None,
            Some(secs) => Some(
                TimeDelta::try_seconds(secs)
                    .and_then(|d| Utc::now().checked_add_signed(d))
                    .ok_or_else(|| {
                        AuthError::invalid_token(provider, format!("expires_in {secs} is out of range"))
                    })?,
            ),
        };

        let scopes = self
            .scope
            .map(|s| s.split_whitespace().map(ToString::to_string).collect())
            .unwrap_or_default();

        Ok(OAuthToken {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expires_at,
            scopes,
        })
    }
}

const SECRET_FIELDS: &[&str] = &["access_token", "refresh_token", "id_token"];
const REDACTED: &str = "[REDACTED]";

/// 隐藏令牌端点响应中的令牌值，仅用于调试日志
pub(crate) fn redact_token_body(body: &str) -> String {
    if let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(body) {
        for key in SECRET_FIELDS {
            if let Some(value) = fields.get_mut(*key) {
                *value = Value::String(REDACTED.to_string());
            }
        }
        return Value::Object(fields).to_string();
    }

    if !body.contains('=') {
        return format!("<{} bytes>", body.len());
    }
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        if SECRET_FIELDS.contains(&key.as_ref()) {
            serializer.append_pair(&key, REDACTED);
        } else {
            serializer.append_pair(&key, &value);
        }
    }
    serializer.finish()
}

/// 一次令牌端点请求
pub(crate) struct TokenRequest<'a> {
    pub provider: &'a str,
    pub http: &'a reqwest::Client,
    pub token_url: &'a Url,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub auth_style: AuthStyle,
    pub debug: bool,
}

impl TokenRequest<'_> {
    /// 发送表单请求并解析令牌
    pub(crate) async fn send(&self, mut form: Vec<(&'static str, String)>) -> Result<OAuthToken> {
        let mut request = self
            .http
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json");

        match self.auth_style {
            AuthStyle::InParams => {
                form.push(("client_id", self.client_id.to_string()));
                if !self.client_secret.is_empty() {
                    form.push(("client_secret", self.client_secret.to_string()));
                }
            }
            AuthStyle::InHeader => {
                request = request.basic_auth(
                    urlencoding::encode(self.client_id),
                    Some(urlencoding::encode(self.client_secret)),
                );
            }
        }

        let response = request.form(&form).send().await.map_err(|e| {
            AuthError::token_exchange_with_source(self.provider, "token request failed", e)
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await.map_err(|e| {
            AuthError::token_exchange_with_source(self.provider, "failed to read token response", e)
        })?;

        if self.debug {
            tracing::debug!(
                provider = self.provider,
                %status,
                body = %redact_token_body(&body),
                "token endpoint response"
            );
        }

        let parsed = TokenResponse::parse(&content_type, &body);

        if !status.is_success() {
            if let Some(message) = parsed.as_ref().ok().and_then(TokenResponse::error_message) {
                return Err(AuthError::token_exchange(self.provider, message));
            }
            return Err(AuthError::token_exchange(
                self.provider,
                format!("HTTP {status}: {}", body_preview(&body)),
            ));
        }

        let token = parsed
            .map_err(|e| {
                AuthError::token_exchange_with_source(self.provider, "malformed token response", e)
            })?
            .into_token(self.provider)?;

        tracing::info!(
            provider = self.provider,
            has_refresh_token = token.refresh_token.is_some(),
            expires_at = ?token.expires_at,
            "token exchange complete"
        );
        Ok(token)
    }
}
