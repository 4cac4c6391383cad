//! 配置文件加载测试
//!
//! 从磁盘读取 TOML，构建注册表并驱动一次 faux 登录

use std::io::Write;

use authmux::config::load_config;
use authmux::{CallbackParams, ErrorKind};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const CONFIG: &str = r#"
[http]
timeout_secs = 5

[[providers]]
kind = "faux"

[[providers]]
kind = "faux"
name = "faux-staging"

[[providers]]
kind = "reddit"
client_id = "reddit-id"
client_secret = "reddit-secret"
redirect_uri = "http://localhost:3000/auth/reddit/callback"
debug = true

[[providers]]
kind = "xero"
client_id = "xero-key"
client_secret = "xero-secret"
redirect_uri = "http://localhost:3000/auth/xero/callback"
"#;

#[tokio::test]
async fn load_and_drive_faux_login() {
    let file = write_config(CONFIG);
    let registry = load_config(file.path()).unwrap().build_registry().unwrap();

    let mut names: Vec<_> = registry.get_providers().into_keys().collect();
    names.sort();
    assert_eq!(names, vec!["faux", "faux-staging", "reddit", "xero"]);

    let provider = registry.get_provider("faux-staging").unwrap();
    assert_eq!(provider.name(), "faux-staging");

    let mut session = provider.begin_auth("abc").await.unwrap();
    let token = session
        .authorize(provider.as_ref(), &CallbackParams::parse("code=faux-code&state=abc"))
        .await
        .unwrap();
    assert!(!token.is_empty());

    let user = provider.fetch_user(session.as_ref()).await.unwrap();
    assert_eq!(user.provider, "faux-staging");
    assert_eq!(user.access_token, token);
}

#[test]
fn missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("providers.dev.toml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn invalid_toml_is_config_error() {
    let file = write_config("[[providers]\nkind = ");
    let err = load_config(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn incomplete_provider_is_rejected_at_load() {
    let file = write_config("[[providers]]\nkind = \"azuread\"\nclient_id = \"id\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("redirect_uri"));
}
