//! # 提供商配置结构定义

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{ClientSettings, EndpointOverrides, HttpOptions, Provider, Registry};
use crate::error::{AuthError, Result};
use crate::oauth1::SignatureMethod;
use crate::providers;

/// 配置文件根结构
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 访问厂商接口的 HTTP 选项
    #[serde(default)]
    pub http: HttpConfig,
    /// 需要注册的提供商
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// HTTP 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// 请求超时（秒），不设置则不限制
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// 自定义 `User-Agent`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl HttpConfig {
    /// 转换为客户端使用的 HTTP 选项
    pub fn to_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: self.timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// 厂商类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorKind {
    /// Azure AD（OAuth2）
    Azuread,
    /// Bitly（OAuth2）
    Bitly,
    /// Microsoft Online（OAuth2）
    Microsoftonline,
    /// Reddit（OAuth2）
    Reddit,
    /// Xero（OAuth1）
    Xero,
    /// 内存中的测试提供商
    Faux,
}

impl VendorKind {
    /// 配置文件中使用的小写名称
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Azuread => "azuread",
            Self::Bitly => "bitly",
            Self::Microsoftonline => "microsoftonline",
            Self::Reddit => "reddit",
            Self::Xero => "xero",
            Self::Faux => "faux",
        }
    }

    /// 是否需要客户端凭据与回调地址
    pub const fn needs_credentials(self) -> bool {
        !matches!(self, Self::Faux)
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个提供商配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 厂商类型
    pub kind: VendorKind,
    /// 注册名，默认使用厂商名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 客户端 ID
    #[serde(default)]
    pub client_id: String,
    /// 客户端密钥
    #[serde(default)]
    pub client_secret: String,
    /// 回调地址
    #[serde(default)]
    pub redirect_uri: String,
    /// 授权范围，为空时使用厂商默认值
    #[serde(default)]
    pub scopes: Vec<String>,
    /// 仅 Azure AD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    /// 仅 Reddit：`temporary` 或 `permanent`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// 仅 Xero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_method: Option<SignatureMethod>,
    /// 端点覆盖
    #[serde(default, skip_serializing_if = "EndpointOverrides::is_empty")]
    pub endpoints: EndpointOverrides,
    /// 记录厂商原始响应
    #[serde(default)]
    pub debug: bool,
}

impl ProviderConfig {
    /// 注册表中使用的名称
    pub fn registered_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.kind.as_str())
    }

    /// 生成单个提供商的客户端设置
    pub fn to_settings(&self, http: &HttpConfig) -> ClientSettings {
        ClientSettings {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
            endpoints: self.endpoints.clone(),
            http: http.to_options(),
        }
    }

    /// 构建提供商（注册前完成改名与调试开关）
    pub fn build(&self, http: &HttpConfig) -> Result<Box<dyn Provider>> {
        let settings = self.to_settings(http);
        let mut provider = match self.kind {
            VendorKind::Azuread => providers::azuread::new(settings, self.tenant.as_deref())?,
            VendorKind::Bitly => providers::bitly::new(settings)?,
            VendorKind::Microsoftonline => providers::microsoftonline::new(settings)?,
            VendorKind::Reddit => providers::reddit::new(settings, self.duration.as_deref())?,
            VendorKind::Xero => {
                providers::xero::new(settings, self.signature_method.unwrap_or_default())?
            }
            VendorKind::Faux => providers::faux::new(),
        };

        let name = self.registered_name();
        if provider.name() != name {
            provider.set_name(name.to_string());
        }
        provider.debug(self.debug);
        Ok(provider)
    }

    fn validate(&self) -> Result<()> {
        let name = self.registered_name();

        if self.kind.needs_credentials() {
            if self.client_id.trim().is_empty() {
                return Err(AuthError::config(format!("{name}: client_id不能为空")));
            }
            if self.redirect_uri.trim().is_empty() {
                return Err(AuthError::config(format!("{name}: redirect_uri不能为空")));
            }
        }

        for (key, value) in self.endpoints.iter() {
            url::Url::parse(value).map_err(|e| {
                AuthError::config_with_source(format!("{name}: 无效的端点 {key} = {value}"), e)
            })?;
        }

        if self.signature_method.is_some() && self.kind != VendorKind::Xero {
            tracing::warn!(provider = name, "signature_method is ignored for OAuth2 providers");
        }
        if self.tenant.is_some() && self.kind != VendorKind::Azuread {
            tracing::warn!(provider = name, "tenant is only used by azuread");
        }
        if self.duration.is_some() && self.kind != VendorKind::Reddit {
            tracing::warn!(provider = name, "duration is only used by reddit");
        }

        Ok(())
    }
}

impl AuthConfig {
    /// 解析 TOML 配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == Some(0) {
            return Err(AuthError::config("请求超时必须大于0"));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            provider.validate()?;
            let name = provider.registered_name();
            if !seen.insert(name) {
                tracing::warn!(provider = name, "duplicate provider name, the last entry wins");
            }
        }
        Ok(())
    }

    /// 按配置构建全部提供商并注册
    pub fn build_registry(&self) -> Result<Registry> {
        self.validate()?;

        let providers = self
            .providers
            .iter()
            .map(|p| p.build(&self.http).map(Arc::from))
            .collect::<Result<Vec<Arc<dyn Provider>>>>()?;

        let registry = Registry::new();
        registry.use_providers(providers);
        tracing::info!(count = registry.len(), "provider registry built");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SAMPLE: &str = r#"
[http]
timeout_secs = 10
user_agent = "authmux-test/1.0"

[[providers]]
kind = "reddit"
client_id = "reddit-id"
client_secret = "reddit-secret"
redirect_uri = "http://localhost:3000/auth/reddit/callback"
duration = "permanent"

[[providers]]
kind = "azuread"
name = "work"
client_id = "azure-id"
client_secret = "azure-secret"
redirect_uri = "http://localhost:3000/auth/work/callback"
tenant = "contoso.onmicrosoft.com"

[[providers]]
kind = "xero"
client_id = "xero-key"
client_secret = "xero-secret"
redirect_uri = "http://localhost:3000/auth/xero/callback"
signature_method = "HMAC-SHA1"

[providers.endpoints]
request_token_url = "http://127.0.0.1:9000/oauth/RequestToken"
"#;

    #[test]
    fn parses_sample() {
        let config = AuthConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.http.timeout_secs, Some(10));
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.providers[1].registered_name(), "work");
        assert_eq!(config.providers[2].signature_method, Some(SignatureMethod::HmacSha1));
        assert_eq!(
            config.providers[2].endpoints.request_token_url.as_deref(),
            Some("http://127.0.0.1:9000/oauth/RequestToken")
        );
        config.validate().unwrap();
    }

    #[test]
    fn builds_registry_with_custom_names() {
        let registry = AuthConfig::from_toml_str(SAMPLE).unwrap().build_registry().unwrap();
        let mut names: Vec<_> = registry.get_providers().into_keys().collect();
        names.sort();
        assert_eq!(names, vec!["reddit", "work", "xero"]);
    }

    #[rstest]
    #[case::missing_client_id("kind = \"bitly\"\nredirect_uri = \"http://x/cb\"")]
    #[case::missing_redirect("kind = \"bitly\"\nclient_id = \"id\"")]
    #[case::bad_endpoint(
        "kind = \"bitly\"\nclient_id = \"id\"\nredirect_uri = \"http://x/cb\"\n[providers.endpoints]\ntoken_url = \"not a url\""
    )]
    fn rejects_invalid_provider(#[case] body: &str) {
        let config = AuthConfig::from_toml_str(&format!("[[providers]]\n{body}")).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AuthError::Config { .. }));
    }

    #[test]
    fn faux_needs_no_credentials() {
        let config = AuthConfig::from_toml_str("[[providers]]\nkind = \"faux\"").unwrap();
        let registry = config.build_registry().unwrap();
        assert!(registry.get_provider("faux").is_ok());
    }

    #[test]
    fn unknown_kind_is_parse_error() {
        let err = AuthConfig::from_toml_str("[[providers]]\nkind = \"github\"").unwrap_err();
        assert!(err.to_string().contains("配置"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = AuthConfig::from_toml_str("[http]\ntimeout_secs = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
