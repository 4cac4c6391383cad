//! OAuth1（Xero）登录流程测试
//!
//! 关注点：
//! 1. begin_auth 申请请求令牌，state 随 oauth_callback 发出
//! 2. verifier 兑换访问令牌，回调 oauth_token 必须与请求令牌一致
//! 3. 组织资料映射为统一用户资料
//! 4. 旧格式会话 JSON 可以还原

use authmux::oauth1::{OAuth1Session, SignatureMethod};
use authmux::providers::xero;
use authmux::{
    AccessToken, CallbackParams, ClientSettings, Credentials, EndpointOverrides, ErrorKind,
    Provider, TokenPair,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn xero_settings(server: &MockServer) -> ClientSettings {
    let base = server.uri();
    ClientSettings::new("xero-key", "xero-secret", "http://localhost:3000/callback").with_endpoints(
        EndpointOverrides {
            request_token_url: Some(format!("{base}/oauth/RequestToken")),
            auth_url: Some(format!("{base}/oauth/Authorize")),
            token_url: Some(format!("{base}/oauth/AccessToken")),
            profile_url: Some(format!("{base}/api.xro/2.0/Organisation")),
        },
    )
}

fn xero_provider(server: &MockServer) -> Box<dyn Provider> {
    xero::new(xero_settings(server), SignatureMethod::HmacSha1).unwrap()
}

async fn mount_request_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/oauth/RequestToken"))
        .and(header_regex("authorization", r"^OAuth .*oauth_callback="))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=TOKEN&oauth_token_secret=SECRET&oauth_callback_confirmed=true"),
        )
        .mount(server)
        .await;
}

fn organisation() -> serde_json::Value {
    json!({
        "Organisations": [{
            "Name": "Vanderlay Industries",
            "LegalName": "Vanderlay Industries",
            "OrganisationType": "COMPANY",
            "CountryCode": "NZ",
            "ShortCode": "111-11"
        }]
    })
}

#[tokio::test]
async fn begin_auth_obtains_request_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/RequestToken"))
        .and(header_regex("authorization", r"oauth_callback=.*state%3Dxyz"))
        .and(header_regex("authorization", r#"oauth_signature_method="HMAC-SHA1""#))
        .and(header_regex("authorization", r#"oauth_consumer_key="xero-key""#))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token=TOKEN&oauth_token_secret=SECRET"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = xero_provider(&server);
    let session = provider.begin_auth("xyz").await.unwrap();

    let url = session.get_auth_url().unwrap();
    assert!(url.contains("Authorize"));
    assert!(url.contains("oauth_token=TOKEN"));

    let stored = OAuth1Session::decode(&session.marshal().unwrap()).unwrap();
    assert_eq!(stored.request_token, Some(TokenPair::new("TOKEN", "SECRET")));
    assert_eq!(stored.access_token, None);
}

#[tokio::test]
async fn request_token_failure_is_token_exchange_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/RequestToken"))
        .respond_with(ResponseTemplate::new(401).set_body_string("oauth_problem=signature_invalid"))
        .mount(&server)
        .await;

    let err = xero_provider(&server).begin_auth("xyz").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenExchangeFailed);
    assert!(err.to_string().contains("signature_invalid"));
}

#[tokio::test]
async fn timeout_bounds_request_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/RequestToken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=TOKEN&oauth_token_secret=SECRET")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let provider = xero::new(
        xero_settings(&server).with_timeout(Duration::from_millis(200)),
        SignatureMethod::HmacSha1,
    )
    .unwrap();

    let started = Instant::now();
    let err = provider.begin_auth("xyz").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenExchangeFailed);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn authorize_then_fetch_user() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/oauth/AccessToken"))
        .and(header_regex("authorization", r#"oauth_verifier="V123""#))
        .and(header_regex("authorization", r#"oauth_token="TOKEN""#))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=ACCESS&oauth_token_secret=ASECRET&oauth_expires_in=1800",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api.xro/2.0/Organisation"))
        .and(header("accept", "application/json"))
        .and(header_regex("authorization", r#"oauth_token="ACCESS""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(organisation()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = xero_provider(&server);
    let mut session = provider.begin_auth("xyz").await.unwrap();

    let params = CallbackParams::parse("oauth_token=TOKEN&oauth_verifier=V123&state=xyz");
    let token = session.authorize(provider.as_ref(), &params).await.unwrap();
    assert_eq!(token, "ACCESS");

    let stored = OAuth1Session::decode(&session.marshal().unwrap()).unwrap();
    assert!(stored.auth_url.is_empty());
    assert_eq!(stored.request_token, None);
    let access = stored.access_token.unwrap();
    assert_eq!(access.pair(), TokenPair::new("ACCESS", "ASECRET"));
    assert_eq!(access.additional_data["oauth_expires_in"], "1800");

    let user = provider.fetch_user(session.as_ref()).await.unwrap();
    assert_eq!(user.provider, "xero");
    assert_eq!(user.name, "Vanderlay Industries");
    assert_eq!(user.nick_name, "Vanderlay Industries");
    assert_eq!(user.description, "COMPANY");
    assert_eq!(user.user_id, "111-11");
    assert_eq!(user.location, "NZ");
    assert!(user.email.is_empty());
    assert_eq!(user.access_token, "ACCESS");
    assert_eq!(user.access_token_secret, "ASECRET");
    assert!(user.raw_data.contains_key("Organisations"));
}

#[tokio::test]
async fn mismatched_callback_token_is_rejected() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/oauth/AccessToken"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = xero_provider(&server);
    let mut session = provider.begin_auth("xyz").await.unwrap();

    let err = session
        .authorize(
            provider.as_ref(),
            &CallbackParams::parse("oauth_token=OTHER&oauth_verifier=V123"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenExchangeFailed);

    let err = session
        .authorize(provider.as_ref(), &CallbackParams::parse("oauth_token=TOKEN"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("oauth_verifier"));

    // 会话保持原状，可以用正确的回调重试之前的步骤
    assert!(session.get_auth_url().is_ok());
}

#[tokio::test]
async fn fetch_user_with_restored_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.xro/2.0/Organisation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(organisation()))
        .mount(&server)
        .await;

    let provider = xero_provider(&server);
    let session = provider
        .unmarshal_session(r#"{"AccessToken":{"Token":"TOKEN","Secret":"SECRET"}}"#)
        .unwrap();

    let user = provider.fetch_user(session.as_ref()).await.unwrap();
    assert_eq!(user.user_id, "111-11");
    assert_eq!(user.access_token, "TOKEN");
}

#[tokio::test]
async fn forbidden_organisation_is_insufficient_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.xro/2.0/Organisation"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = xero_provider(&server);
    let session = provider
        .unmarshal_session(r#"{"AccessToken":{"Token":"TOKEN","Secret":"SECRET"}}"#)
        .unwrap();

    let err = provider.fetch_user(session.as_ref()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientScope);
}

#[tokio::test]
async fn session_from_json() {
    let server = MockServer::start().await;
    let provider = xero_provider(&server);

    let session = provider
        .unmarshal_session(
            r#"{"AuthURL":"http://com/auth_url","AccessToken":{"Token":"1234567890","Secret":"secret!!","AdditionalData":{}},"RequestToken":{"Token":"0987654321","Secret":"!!secret"}}"#,
        )
        .unwrap();

    assert_eq!(session.get_auth_url().unwrap(), "http://com/auth_url");
    assert_eq!(
        session.credentials(),
        Some(Credentials::Signed(AccessToken::new("1234567890", "secret!!")))
    );

    let stored = OAuth1Session::decode(&session.marshal().unwrap()).unwrap();
    assert_eq!(stored.request_token, Some(TokenPair::new("0987654321", "!!secret")));
}

#[tokio::test]
async fn bearer_session_is_rejected_by_oauth1_provider() {
    let server = MockServer::start().await;
    let provider = xero_provider(&server);

    let bearer = authmux::oauth2::BearerSession::decode(r#"{"AccessToken":"T1"}"#).unwrap();
    let err = provider.fetch_user(&bearer).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialsMismatch);
    assert!(!provider.refresh_token_available());
    assert_eq!(provider.refresh_token("x").await.unwrap(), None);
}
