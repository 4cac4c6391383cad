//! # Azure AD v2 提供商
//!
//! 微软身份平台 v2 端点，资料来自 Microsoft Graph `/me`。

use serde_json::{Map, Value};

use crate::auth::user::string_field;
use crate::auth::{ClientSettings, Provider, User};
use crate::error::Result;
use crate::oauth2::{Endpoints, OAuth2Provider, OAuth2Vendor};

/// 未指定租户时使用的多租户入口
pub const DEFAULT_TENANT: &str = "common";

pub(super) const GRAPH_ME_URL: &str = "https://graph.microsoft.com/v1.0/me";

const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email", "offline_access", "User.Read"];

/// Azure AD v2 厂商描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureAd {
    tenant: String,
}

impl AzureAd {
    /// 创建 Azure AD 描述，租户缺省为 `common`
    pub fn new(tenant: Option<&str>) -> Self {
        let tenant = tenant
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TENANT);
        Self {
            tenant: tenant.to_string(),
        }
    }

    /// 当前租户
    pub fn tenant(&self) -> &str {
        &self.tenant
    }
}

impl OAuth2Vendor for AzureAd {
    fn default_name(&self) -> &'static str {
        "azuread"
    }

    fn endpoints(&self) -> Endpoints {
        let base = format!("https://login.microsoftonline.com/{}/oauth2/v2.0", self.tenant);
        Endpoints::new(format!("{base}/authorize"), format!("{base}/token"), GRAPH_ME_URL)
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        DEFAULT_SCOPES
    }

    fn refresh_token_available(&self) -> bool {
        true
    }

    fn profile_scope(&self) -> Option<&'static str> {
        Some("User.Read")
    }

    fn map_user(&self, raw: &Map<String, Value>, user: &mut User) {
        map_graph_user(raw, user);
    }
}

/// Graph `/me` 响应映射，Azure AD 与 Microsoft Online 共用
pub(super) fn map_graph_user(raw: &Map<String, Value>, user: &mut User) {
    user.user_id = string_field(raw, "id");
    user.name = string_field(raw, "displayName");
    user.first_name = string_field(raw, "givenName");
    user.last_name = string_field(raw, "surname");
    user.nick_name = string_field(raw, "userPrincipalName");
    user.description = string_field(raw, "jobTitle");
    user.location = string_field(raw, "officeLocation");

    user.email = string_field(raw, "mail");
    if user.email.is_empty() {
        user.email.clone_from(&user.nick_name);
    }
}

/// 创建 Azure AD v2 提供商，`tenant` 为空时使用 `common`
pub fn new(settings: ClientSettings, tenant: Option<&str>) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OAuth2Provider::new(settings, AzureAd::new(tenant))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tenant_defaults_to_common() {
        assert_eq!(AzureAd::new(None).tenant(), "common");
        assert_eq!(AzureAd::new(Some("  ")).tenant(), "common");
        assert_eq!(
            AzureAd::new(Some("contoso.onmicrosoft.com")).endpoints().token_url,
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/token"
        );
    }

    #[test]
    fn graph_mapping_falls_back_to_principal_name() {
        let raw = json!({
            "id": "48d31887-5fad-4d73-a9f5-3c356e68a038",
            "displayName": "Megan Bowen",
            "givenName": "Megan",
            "surname": "Bowen",
            "jobTitle": "Auditor",
            "mail": null,
            "officeLocation": "12/1110",
            "userPrincipalName": "MeganB@contoso.com"
        });
        let mut user = User::for_provider("azuread");
        map_graph_user(raw.as_object().unwrap(), &mut user);

        assert_eq!(user.user_id, "48d31887-5fad-4d73-a9f5-3c356e68a038");
        assert_eq!(user.name, "Megan Bowen");
        assert_eq!(user.first_name, "Megan");
        assert_eq!(user.last_name, "Bowen");
        assert_eq!(user.email, "MeganB@contoso.com");
        assert_eq!(user.description, "Auditor");
        assert_eq!(user.location, "12/1110");
    }

    #[test]
    fn factory_uses_default_name_and_scopes() {
        let provider = new(ClientSettings::new("id", "secret", "http://localhost/cb"), None).unwrap();
        assert_eq!(provider.name(), "azuread");
        assert!(provider.refresh_token_available());
    }
}
