//! # Reddit 提供商
//!
//! 令牌端点要求 HTTP Basic 客户端认证；`duration=permanent` 时才会下发刷新令牌。

use serde_json::{Map, Value};

use crate::auth::user::string_field;
use crate::auth::{ClientSettings, Provider, User};
use crate::error::Result;
use crate::oauth2::{AuthStyle, Endpoints, OAuth2Provider, OAuth2Vendor};

const AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const PROFILE_URL: &str = "https://oauth.reddit.com/api/v1/me";

/// 缺省授权时长
pub const DEFAULT_DURATION: &str = "temporary";

/// Reddit 厂商描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reddit {
    duration: String,
}

impl Reddit {
    /// 创建 Reddit 描述，时长缺省为 `temporary`
    pub fn new(duration: Option<&str>) -> Self {
        let duration = duration
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DURATION);
        Self {
            duration: duration.to_string(),
        }
    }

    /// 授权时长
    pub fn duration(&self) -> &str {
        &self.duration
    }
}

impl OAuth2Vendor for Reddit {
    fn default_name(&self) -> &'static str {
        "reddit"
    }

    fn endpoints(&self) -> Endpoints {
        Endpoints::new(AUTH_URL, TOKEN_URL, PROFILE_URL)
    }

    fn default_scopes(&self) -> &'static [&'static str] {
        &["identity"]
    }

    fn auth_style(&self) -> AuthStyle {
        AuthStyle::InHeader
    }

    fn authorize_params(&self) -> Vec<(&'static str, String)> {
        vec![("duration", self.duration.clone())]
    }

    fn refresh_token_available(&self) -> bool {
        true
    }

    fn profile_scope(&self) -> Option<&'static str> {
        Some("identity")
    }

    fn map_user(&self, raw: &Map<String, Value>, user: &mut User) {
        user.user_id = string_field(raw, "id");
        user.name = string_field(raw, "name");
        user.nick_name.clone_from(&user.name);
        user.avatar_url = string_field(raw, "icon_img");
    }
}

/// 创建 Reddit 提供商，`duration` 为空时使用 `temporary`
pub fn new(settings: ClientSettings, duration: Option<&str>) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OAuth2Provider::new(settings, Reddit::new(duration))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn auth_url_carries_duration_and_state() {
        let provider = new(
            ClientSettings::new("id", "secret", "http://localhost/cb"),
            Some("permanent"),
        )
        .unwrap();

        let session = provider.begin_auth("xyz").await.unwrap();
        let url = session.get_auth_url().unwrap();
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("duration=permanent"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains("scope=identity"));
    }

    #[test]
    fn duration_defaults_to_temporary() {
        assert_eq!(Reddit::new(None).duration(), "temporary");
        assert_eq!(Reddit::new(Some("")).duration(), "temporary");
    }

    #[test]
    fn maps_profile() {
        let raw = json!({"id": "abc12", "name": "spez", "icon_img": "https://styles.redditmedia.com/x.png"});
        let mut user = User::for_provider("reddit");
        Reddit::new(None).map_user(raw.as_object().unwrap(), &mut user);
        assert_eq!(user.user_id, "abc12");
        assert_eq!(user.name, "spez");
        assert_eq!(user.avatar_url, "https://styles.redditmedia.com/x.png");
    }
}
