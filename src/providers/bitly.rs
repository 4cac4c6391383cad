//! # Bitly 提供商

use serde_json::{Map, Value};

use crate::auth::user::string_field;
use crate::auth::{ClientSettings, Provider, User};
use crate::error::Result;
use crate::oauth2::{Endpoints, OAuth2Provider, OAuth2Vendor, TokenRetention};

const AUTH_URL: &str = "https://bitly.com/oauth/authorize";
const TOKEN_URL: &str = "https://api-ssl.bitly.com/oauth/access_token";
const PROFILE_URL: &str = "https://api-ssl.bitly.com/v4/user";

/// Bitly 令牌不过期，也没有刷新令牌
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bitly;

impl OAuth2Vendor for Bitly {
    fn default_name(&self) -> &'static str {
        "bitly"
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints::new(AUTH_URL, TOKEN_URL, PROFILE_URL)
    }

    fn retention(&self) -> TokenRetention {
        TokenRetention::ACCESS_ONLY
    }

    fn refresh_token_available(&self) -> bool {
        false
    }

    fn map_user(&self, raw: &Map<String, Value>, user: &mut User) {
        user.user_id = string_field(raw, "login");
        user.nick_name.clone_from(&user.user_id);
        user.name = string_field(raw, "name");

        let emails = raw
            .get("emails")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let primary = emails
            .iter()
            .filter_map(Value::as_object)
            .find(|e| e.get("is_primary").and_then(Value::as_bool) == Some(true));
        if let Some(email) = primary {
            user.email = string_field(email, "email");
        }
    }
}

/// 创建 Bitly 提供商
pub fn new(settings: ClientSettings) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OAuth2Provider::new(settings, Bitly)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_primary_email() {
        let raw = json!({
            "login": "bitlyuser",
            "name": "Bitly User",
            "emails": [
                {"email": "old@example.com", "is_primary": false, "is_verified": true},
                {"email": "main@example.com", "is_primary": true, "is_verified": true}
            ]
        });
        let mut user = User::for_provider("bitly");
        Bitly.map_user(raw.as_object().unwrap(), &mut user);

        assert_eq!(user.user_id, "bitlyuser");
        assert_eq!(user.nick_name, "bitlyuser");
        assert_eq!(user.name, "Bitly User");
        assert_eq!(user.email, "main@example.com");
    }

    #[test]
    fn missing_emails_leave_email_empty() {
        let raw = json!({"login": "someone"});
        let mut user = User::for_provider("bitly");
        Bitly.map_user(raw.as_object().unwrap(), &mut user);
        assert!(user.email.is_empty());
    }

    #[test]
    fn refresh_is_unsupported() {
        let provider = new(ClientSettings::new("id", "secret", "http://localhost/cb")).unwrap();
        assert!(!provider.refresh_token_available());
    }
}
