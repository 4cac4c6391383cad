//! # Microsoft Online 提供商
//!
//! 个人与工作账号共用的 `common` 端点。会话只保留访问令牌与过期时间，
//! 不保存刷新令牌以控制 cookie 大小。

use serde_json::{Map, Value};

use super::azuread::{GRAPH_ME_URL, map_graph_user};
use crate::auth::{ClientSettings, Provider, User};
use crate::error::Result;
use crate::oauth2::{Endpoints, OAuth2Provider, OAuth2Vendor, TokenRetention};

const AUTH_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/authorize";
const TOKEN_URL: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";

/// Microsoft Online 厂商描述
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MicrosoftOnline;

impl OAuth2Vendor for MicrosoftOnline {
    fn default_name(&self) -> &'static str {
        "microsoftonline"
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints::new(AUTH_URL, TOKEN_URL, GRAPH_ME_URL)
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &["openid", "offline_access", "user.read"]
    }

    fn retention(&self) -> TokenRetention {
        TokenRetention::WITHOUT_REFRESH
    }

    // 调用方可自行保存刷新令牌后调用 refresh_token
    fn refresh_token_available(&self) -> bool {
        true
    }

    fn profile_scope(&self) -> Option<&'static str> {
        Some("user.read")
    }

    fn map_user(&self, raw: &Map<String, Value>, user: &mut User) {
        map_graph_user(raw, user);
    }
}

/// 创建 Microsoft Online 提供商
pub fn new(settings: ClientSettings) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OAuth2Provider::new(settings, MicrosoftOnline)?))
}
