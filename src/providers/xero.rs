//! # Xero 提供商（OAuth1）
//!
//! 用户资料取自当前连接组织（`Organisation` 接口的第一个组织）。

use reqwest::header::{ACCEPT, HeaderName};
use serde_json::{Map, Value};

use crate::auth::user::string_field;
use crate::auth::{ClientSettings, Provider, User};
use crate::error::Result;
use crate::oauth1::{OAuth1Endpoints, OAuth1Provider, OAuth1Vendor, SignatureMethod};

const REQUEST_TOKEN_URL: &str = "https://api.xero.com/oauth/RequestToken";
const AUTHORIZE_URL: &str = "https://api.xero.com/oauth/Authorize";
const ACCESS_TOKEN_URL: &str = "https://api.xero.com/oauth/AccessToken";
const PROFILE_URL: &str = "https://api.xero.com/api.xro/2.0/Organisation";

/// Xero 厂商描述
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xero;

impl OAuth1Vendor for Xero {
    fn default_name(&self) -> &'static str {
        "xero"
    }

    fn endpoints(&self) -> OAuth1Endpoints {
        OAuth1Endpoints {
            request_token_url: REQUEST_TOKEN_URL.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
            access_token_url: ACCESS_TOKEN_URL.to_string(),
            profile_url: PROFILE_URL.to_string(),
        }
    }

    // 默认返回 XML
    fn profile_headers(&self) -> Vec<(HeaderName, &'static str)> {
        vec![(ACCEPT, "application/json")]
    }

    fn profile_scope(&self) -> &'static str {
        "accounting.settings"
    }

    fn map_user(&self, raw: &Map<String, Value>, user: &mut User) {
        let organisation = raw
            .get("Organisations")
            .and_then(Value::as_array)
            .and_then(|orgs| orgs.first())
            .and_then(Value::as_object);

        if let Some(org) = organisation {
            user.user_id = string_field(org, "ShortCode");
            user.name = string_field(org, "Name");
            user.nick_name = string_field(org, "LegalName");
            user.description = string_field(org, "OrganisationType");
            user.location = string_field(org, "CountryCode");
        }
    }
}

/// 创建 Xero 提供商
pub fn new(settings: ClientSettings, method: SignatureMethod) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OAuth1Provider::new(settings, Xero, method)?))
}
