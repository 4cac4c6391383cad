//! # OAuth1 请求签名
//!
//! RFC 5849 第 3.4 节：签名基串、参数规范化与 `Authorization: OAuth` 头。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::AuthError;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// 签名方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignatureMethod {
    /// HMAC-SHA1（默认）
    #[default]
    #[serde(rename = "HMAC-SHA1", alias = "hmac-sha1")]
    HmacSha1,
    /// HMAC-SHA256
    #[serde(rename = "HMAC-SHA256", alias = "hmac-sha256")]
    HmacSha256,
    /// 不签名，直接拼接密钥
    #[serde(rename = "PLAINTEXT", alias = "plaintext")]
    Plaintext,
}

impl SignatureMethod {
    /// `oauth_signature_method` 参数值
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HmacSha1 => "HMAC-SHA1",
            Self::HmacSha256 => "HMAC-SHA256",
            Self::Plaintext => "PLAINTEXT",
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HMAC-SHA1" => Ok(Self::HmacSha1),
            "HMAC-SHA256" => Ok(Self::HmacSha256),
            "PLAINTEXT" => Ok(Self::Plaintext),
            other => Err(AuthError::config(format!(
                "unsupported OAuth1 signature method: {other}"
            ))),
        }
    }
}

/// RFC 3986 百分号编码（仅保留非保留字符）
pub(crate) fn percent_encode(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// 签名基串：方法、基础 URI 与规范化参数（含 URL 查询参数）
pub(crate) fn base_string(http_method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut base_uri = url.clone();
    base_uri.set_query(None);
    base_uri.set_fragment(None);

    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k).into_owned(), percent_encode(v).into_owned()))
        .chain(
            url.query_pairs()
                .map(|(k, v)| (percent_encode(&k).into_owned(), percent_encode(&v).into_owned())),
        )
        .collect();
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        http_method.to_ascii_uppercase(),
        percent_encode(base_uri.as_str()),
        percent_encode(&normalized)
    )
}

/// 计算 `oauth_signature`
pub(crate) fn sign(
    method: SignatureMethod,
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, InvalidLength> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let signature = match method {
        SignatureMethod::HmacSha1 => {
            let mut mac = HmacSha1::new_from_slice(key.as_bytes())?;
            mac.update(base_string.as_bytes());
            STANDARD.encode(mac.finalize().into_bytes())
        }
        SignatureMethod::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(key.as_bytes())?;
            mac.update(base_string.as_bytes());
            STANDARD.encode(mac.finalize().into_bytes())
        }
        SignatureMethod::Plaintext => key,
    };
    Ok(signature)
}

/// 32 位字母数字随机串
pub(crate) fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// 一次签名请求的协议参数
#[derive(Debug, Clone)]
pub(crate) struct OAuthParams {
    params: Vec<(String, String)>,
}

impl OAuthParams {
    pub(crate) fn new(
        consumer_key: &str,
        method: SignatureMethod,
        nonce: String,
        timestamp: i64,
    ) -> Self {
        Self {
            params: vec![
                ("oauth_consumer_key".to_string(), consumer_key.to_string()),
                ("oauth_nonce".to_string(), nonce),
                ("oauth_signature_method".to_string(), method.as_str().to_string()),
                ("oauth_timestamp".to_string(), timestamp.to_string()),
                ("oauth_version".to_string(), "1.0".to_string()),
            ],
        }
    }

    /// 追加 `oauth_token` / `oauth_callback` / `oauth_verifier` 等参数
    #[must_use]
    pub(crate) fn with(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// 签名并生成 `Authorization` 头
    pub(crate) fn authorization_header(
        mut self,
        http_method: &str,
        url: &Url,
        method: SignatureMethod,
        consumer_secret: &str,
        token_secret: &str,
    ) -> Result<String, InvalidLength> {
        let base = base_string(http_method, url, &self.params);
        let signature = sign(method, &base, consumer_secret, token_secret)?;
        self.params.push(("oauth_signature".to_string(), signature));
        self.params.sort();

        let fields = self
            .params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }
}
