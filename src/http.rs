//! # HTTP 客户端
//!
//! 客户端构建与两个协议族共用的资料响应处理。

use reqwest::StatusCode;
use serde_json::{Map, Value};
use url::Url;

use crate::auth::HttpOptions;
use crate::error::{AuthError, Result};

const DEFAULT_USER_AGENT: &str = concat!("authmux/", env!("CARGO_PKG_VERSION"));

/// 按选项构建访问厂商接口用的 reqwest 客户端
pub fn build_client(options: &HttpOptions) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| AuthError::config_with_source("Failed to build HTTP client", e))
}

/// 解析厂商端点，无效时报告配置错误
pub(crate) fn parse_endpoint(provider: &str, kind: &str, url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| {
        AuthError::config_with_source(format!("{provider}: invalid {kind} `{url}`"), e)
    })
}

/// 厂商响应体的截断预览，用于错误信息
pub(crate) fn body_preview(body: &str) -> &str {
    const LIMIT: usize = 256;
    if body.len() <= LIMIT {
        return body;
    }
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// 读取资料接口响应：403 视为授权范围不足，其它非 2xx 视为资料获取失败，
/// 成功时响应体必须是 JSON 对象
pub(crate) async fn read_profile(
    provider: &str,
    response: reqwest::Response,
    required_scope: &str,
    debug: bool,
) -> Result<Map<String, Value>> {
    let status = response.status();
    if status == StatusCode::FORBIDDEN {
        tracing::warn!(provider, scope = required_scope, "profile request rejected with 403");
        return Err(AuthError::InsufficientScope {
            provider: provider.to_string(),
            scope: required_scope.to_string(),
        });
    }

    let body = response.text().await.map_err(|e| {
        AuthError::profile_fetch(provider, Some(status.as_u16()), format!("failed to read response: {e}"))
    })?;

    if debug {
        tracing::debug!(provider, %status, body = %body, "profile endpoint response");
    }

    if !status.is_success() {
        return Err(AuthError::profile_fetch(
            provider,
            Some(status.as_u16()),
            format!(
                "{provider} responded with a {} trying to fetch user information: {}",
                status.as_u16(),
                body_preview(&body)
            ),
        ));
    }

    parse_profile(provider, &body)
}

pub(crate) fn parse_profile(provider: &str, body: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AuthError::profile_fetch(
            provider,
            None,
            "profile response is not a JSON object",
        )),
        Err(e) => Err(AuthError::profile_fetch(
            provider,
            None,
            format!("malformed profile response: {e}"),
        )),
    }
}
