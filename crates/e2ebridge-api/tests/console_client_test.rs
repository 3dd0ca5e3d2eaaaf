#![allow(clippy::unwrap_used)]
// Integration tests for `ConsoleClient` using wiremock.

use bytes::Bytes;
use secrecy::SecretString;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use e2ebridge_api::{
    ConsoleClient, Credentials, DeployOptions, Error, NOT_AUTHENTICATED_MESSAGE, ServiceAction,
    ServiceKind,
};

// ── Helpers ─────────────────────────────────────────────────────────

const SESSION_COOKIE: &str = "JSESSIONID=c0ffee";

async fn setup() -> (MockServer, ConsoleClient) {
    let server = MockServer::start().await;
    let http = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    let client =
        ConsoleClient::from_reqwest(&server.uri(), http, Credentials::new("user", "secret"))
            .unwrap();
    (server, client)
}

fn console_path(suffix: &str) -> String {
    format!("/admin/Console{suffix}")
}

fn envelope(status: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
        <Result xmlns="http://e2e.ch/bridge">
            <Status>{status}</Status>
            <Message>{message}</Message>
        </Result>"#
    )
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(envelope("OK", "null"))
}

fn expired() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(envelope("Error", NOT_AUTHENTICATED_MESSAGE))
}

/// Mount a login endpoint that accepts `user`/`secret` and sets the cookie.
async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path(console_path("/Welcome")))
        .and(body_string_contains("j_username=user"))
        .and(body_string_contains("j_password=secret"))
        .respond_with(ok().insert_header("set-cookie", format!("{SESSION_COOKIE}; Path=/")))
        .expect(times)
        .mount(server)
        .await;
}

fn status_endpoint() -> String {
    console_path("/BridgeInstanceConfiguration")
}

// ── Session protocol ────────────────────────────────────────────────

#[tokio::test]
async fn test_session_is_established_once_and_reused() {
    let (server, client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(status_endpoint()))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ok())
        .expect(2)
        .mount(&server)
        .await;

    assert!(!client.is_logged_in().await);
    client
        .set_service_status(ServiceKind::Xuml, "Ticker", "localhost", ServiceAction::Start)
        .await
        .unwrap();
    client
        .set_service_status(ServiceKind::Xuml, "Ticker", "localhost", ServiceAction::Stop)
        .await
        .unwrap();
    assert!(client.is_logged_in().await);
}

#[tokio::test]
async fn test_expired_session_relogs_and_retries_once() {
    let (server, client) = setup().await;
    mount_login(&server, 2).await;

    Mock::given(method("POST"))
        .and(path(status_endpoint()))
        .respond_with(expired())
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(status_endpoint()))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_service_status(ServiceKind::Xuml, "Ticker", "localhost", ServiceAction::Start)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_second_expiry_is_returned_without_third_attempt() {
    let (server, client) = setup().await;
    mount_login(&server, 2).await;

    Mock::given(method("POST"))
        .and(path(status_endpoint()))
        .respond_with(expired())
        .expect(2)
        .mount(&server)
        .await;

    let err = client
        .set_service_status(ServiceKind::Xuml, "Ticker", "localhost", ServiceAction::Start)
        .await
        .unwrap_err();
    assert!(err.is_not_authenticated(), "got {err:?}");
}

#[tokio::test]
async fn test_concurrent_callers_share_one_relogin() {
    let (server, client) = setup().await;

    // Each login hands out a fresh session; only the newest one is valid.
    Mock::given(method("POST"))
        .and(path(console_path("/Welcome")))
        .respond_with(ok().insert_header("set-cookie", "JSESSIONID=one; Path=/"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(console_path("/Welcome")))
        .respond_with(ok().insert_header("set-cookie", "JSESSIONID=two; Path=/"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(status_endpoint()))
        .and(header("cookie", "JSESSIONID=one"))
        .respond_with(expired())
        .expect(1..=2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(status_endpoint()))
        .and(header("cookie", "JSESSIONID=two"))
        .respond_with(ok())
        .expect(2)
        .mount(&server)
        .await;

    let (first, second) = tokio::join!(
        client.set_service_status(ServiceKind::Xuml, "Ticker", "localhost", ServiceAction::Start),
        client.set_service_status(ServiceKind::Xuml, "Clock", "localhost", ServiceAction::Start),
    );
    first.unwrap();
    second.unwrap();
    assert!(client.is_logged_in().await);
}

#[tokio::test]
async fn test_other_console_errors_are_not_retried() {
    let (server, client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(console_path("/nodejs/service/Delete")))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(envelope("Error", "Instance not found")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .remove_service(ServiceKind::Node, "Ghost", "localhost")
        .await
        .unwrap_err();
    assert!(
        matches!(&err, Error::Console { message: Some(m), .. } if m == "Instance not found"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_rejected_login_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(console_path("/Welcome")))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(envelope("Failed", "Invalid credentials")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(status_endpoint()))
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .set_service_status(ServiceKind::Xuml, "Ticker", "localhost", ServiceAction::Start)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got {err:?}");
    assert!(!client.is_logged_in().await);
}

#[tokio::test]
async fn test_login_with_override_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(console_path("/Welcome")))
        .and(body_string_contains("j_username=admin"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client
        .login(Some(&Credentials::new("admin", "other")))
        .await
        .unwrap();
    assert!(client.is_logged_in().await);
}

// ── Form endpoints ──────────────────────────────────────────────────

#[tokio::test]
async fn test_status_change_form_and_query() {
    let (server, client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(console_path("/java/service/Configuration")))
        .and(query_param("node", "node-1"))
        .and(query_param("instance", "Batch"))
        .and(body_string_contains("action=stop"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_service_status(ServiceKind::Java, "Batch", "node-1", ServiceAction::Stop)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_non_2xx_is_bridge_error() {
    let (server, client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(console_path("/BridgeInstanceDelete")))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
        .mount(&server)
        .await;

    let err = client
        .remove_service(ServiceKind::Xuml, "Ticker", "localhost")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Bridge { status: 500, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_deploy_posts_multipart_with_options() {
    let (server, client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(console_path("/Deploy")))
        .and(body_string_contains("name=\"uploadFile\"; filename=\"ticker.zip\""))
        .and(body_string_contains("Content-Type: application/zip"))
        .and(body_string_contains("name=\"overwrite\""))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let options = DeployOptions {
        overwrite: Some(true),
        ..DeployOptions::default()
    };
    client
        .deploy_bytes(Bytes::from_static(b"PK\x03\x04"), "ticker.zip", &options)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deploy_rebuilds_body_after_relogin() {
    let (server, client) = setup().await;
    mount_login(&server, 2).await;

    Mock::given(method("POST"))
        .and(path(console_path("/Deploy")))
        .respond_with(expired())
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(console_path("/Deploy")))
        .and(body_string_contains("name=\"uploadFile\""))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client
        .deploy_bytes(Bytes::from_static(b"PK"), "repository.zip", &DeployOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_domain_groups_and_users() {
    let (server, client) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path(console_path("/DomainGroupCreate")))
        .and(body_string_contains("id=ops"))
        .and(body_string_contains("name=Operations"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(console_path("/DomainUserCreate")))
        .and(body_string_contains("id=jdoe"))
        .and(body_string_contains("group=ops"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(console_path("/DomainUserDelete")))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(console_path("/DomainGroupDelete")))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let password = SecretString::from("pw".to_string());
    client.create_group("ops", "Operations").await.unwrap();
    client
        .create_user("jdoe", "Jane Doe", &password, "ops")
        .await
        .unwrap();
    client.delete_user("jdoe").await.unwrap();
    client.delete_group("ops").await.unwrap();
}
