#![allow(clippy::unwrap_used)]
// Integration tests for `RestClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use wiremock::matchers::{any, body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use e2ebridge_api::{
    Credentials, DeployOptions, Error, ResourceType, RestClient, ServiceAction, ServiceKind,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// `user:secret`
const BASIC: &str = "Basic dXNlcjpzZWNyZXQ=";

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = RestClient::from_reqwest(
        &server.uri(),
        reqwest::Client::new(),
        Credentials::new("user", "secret"),
    )
    .unwrap();
    (server, client)
}

fn rest_path(suffix: &str) -> String {
    format!("/bridge/rest{suffix}")
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// Fails the test on drop if any request reaches the server.
async fn expect_no_requests(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

// ── Service lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_start_service_sends_basic_auth() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(rest_path("/services/xuml/Ticker/start")))
        .and(header("authorization", BASIC))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let answer = client
        .set_service_status(ServiceKind::Xuml, "Ticker", ServiceAction::Start)
        .await
        .unwrap();
    assert_eq!(answer, None);
}

#[tokio::test]
async fn test_every_request_carries_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest_path("/services/nodejs/Ticker")))
        .and(header("authorization", BASIC))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Running" })))
        .expect(3)
        .mount(&server)
        .await;

    for _ in 0..3 {
        client.service_status(ServiceKind::Node, "Ticker").await.unwrap();
    }
}

#[tokio::test]
async fn test_kill_on_node_service_is_rejected_before_io() {
    let (server, client) = setup().await;
    expect_no_requests(&server).await;

    let err = client
        .set_service_status(ServiceKind::Node, "Ticker", ServiceAction::Kill)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedOperation { .. }), "got {err:?}");
    assert!(err.is_caller_error());
}

#[tokio::test]
async fn test_list_services_keeps_service_array() {
    let (server, client) = setup().await;

    let listing = json!({
        "service": [
            { "name": "Ticker", "type": "xUML", "status": "Running" },
            { "name": "Feed", "type": "node", "status": "Stopped" }
        ],
        "link": [{ "rel": "self", "href": "https://bridge.local:8080/bridge/rest/services" }]
    });

    Mock::given(method("GET"))
        .and(path(rest_path("/services")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
        .mount(&server)
        .await;

    let services = client.list_services(None).await.unwrap();
    assert_eq!(services, json!({ "service": listing["service"].clone() }));
}

#[tokio::test]
async fn test_status_strips_scalar_echo() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest_path("/services/java/Batch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service": "Batch",
            "status": "Stopped",
            "link": []
        })))
        .mount(&server)
        .await;

    let status = client.service_status(ServiceKind::Java, "Batch").await.unwrap();
    assert_eq!(status, json!({ "status": "Stopped" }));
}

#[tokio::test]
async fn test_instance_names_are_percent_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(rest_path("/services/xuml/My%20Service")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .remove_service(ServiceKind::Xuml, "My Service")
        .await
        .unwrap();
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_200_is_bridge_error_with_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest_path("/services/xuml/Missing")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Service not found" })),
        )
        .mount(&server)
        .await;

    let err = client
        .service_status(ServiceKind::Xuml, "Missing")
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "got {err:?}");
    assert_eq!(err.bridge_detail(), Some(json!({ "error": "Service not found" })));
}

#[tokio::test]
async fn test_other_2xx_is_not_success() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(rest_path("/services/xuml/Ticker/stop")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = client
        .set_service_status(ServiceKind::Xuml, "Ticker", ServiceAction::Stop)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Bridge { status: 204, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_bridge_is_transport_error() {
    let client = RestClient::from_reqwest(
        "http://127.0.0.1:1",
        reqwest::Client::new(),
        Credentials::new("user", "secret"),
    )
    .unwrap();

    let err = client.list_services(None).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert!(err.is_transient());
}

// ── Deployment ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_deploy_bytes_sends_options_and_upload_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(rest_path("/services")))
        .and(query_param("startup", "true"))
        .and(query_param("instanceName", "xxxy"))
        .and(body_string_contains("name=\"uploadFile\""))
        .and(body_string_contains("filename=\"repository.zip\""))
        .and(body_string_contains("Content-Type: application/zip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let options = DeployOptions {
        startup: Some(true),
        instance_name: Some("xxxy".into()),
        ..DeployOptions::default()
    };
    client.deploy_bytes(b"PK\x03\x04", &options).await.unwrap();
}

// ── Preferences ─────────────────────────────────────────────────────

fn current_preferences() -> Value {
    json!({
        "service": "Ticker",
        "automaticStartup": false,
        "automaticRestart": false,
        "bridgeServerLogLevel": "Info"
    })
}

#[tokio::test]
async fn test_set_preferences_merges_and_returns_merged_on_empty_answer() {
    let (server, client) = setup().await;
    let prefs = rest_path("/services/xuml/Ticker/preferences");

    Mock::given(method("GET"))
        .and(path(prefs.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_preferences()))
        .expect(1)
        .mount(&server)
        .await;

    let merged = json!({
        "automaticStartup": true,
        "automaticRestart": false,
        "bridgeServerLogLevel": "Info"
    });
    Mock::given(method("PUT"))
        .and(path(prefs.as_str()))
        .and(body_json(&merged))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .set_service_preferences(
            ServiceKind::Xuml,
            "Ticker",
            &object(json!({ "automaticStartup": true })),
        )
        .await
        .unwrap();

    assert_eq!(Value::Object(result), merged);
}

#[tokio::test]
async fn test_set_preferences_deep_merges_nested_objects() {
    let (server, client) = setup().await;
    let prefs = rest_path("/services/java/Ticker/preferences");

    Mock::given(method("GET"))
        .and(path(prefs.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "a": { "x": 1, "y": 2 }, "b": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(prefs.as_str()))
        .and(body_json(json!({ "a": { "x": 3, "y": 2 }, "b": 1 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_service_preferences(ServiceKind::Java, "Ticker", &object(json!({ "a": { "x": 3 } })))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_preferences_unknown_key_never_puts() {
    let (server, client) = setup().await;
    let prefs = rest_path("/services/nodejs/Ticker/preferences");

    Mock::given(method("GET"))
        .and(path(prefs.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_preferences()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .set_service_preferences(ServiceKind::Node, "Ticker", &object(json!({ "bogus": 1 })))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Usage { .. }), "got {err:?}");

    let err = client
        .set_service_preferences(
            ServiceKind::Node,
            "Ticker",
            &object(json!({ "automaticRestart": "yes" })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Usage { .. }), "got {err:?}");
}

// ── Settings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_settings_puts_changes_and_refetches_on_empty_answer() {
    let (server, client) = setup().await;
    let settings = rest_path("/services/xuml/Ticker/settings");

    let current = json!({
        "service": "Ticker",
        "setting": [
            { "id": "StringTestValue", "currentValue": "initial Value", "section": "Settings" },
            { "id": "IntegerTestValue", "currentValue": 1, "section": "Settings" }
        ]
    });

    Mock::given(method("GET"))
        .and(path(settings.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&current))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(settings.as_str()))
        .and(body_json(json!({
            "setting": [{ "id": "StringTestValue", "currentValue": "changed" }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let refreshed = client
        .set_service_settings(
            ServiceKind::Xuml,
            "Ticker",
            [("StringTestValue", json!("changed"))],
        )
        .await
        .unwrap();

    assert_eq!(refreshed.setting.len(), 2);
}

#[tokio::test]
async fn test_set_settings_unknown_id_is_usage_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest_path("/services/java/Batch/settings")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "setting": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .set_service_settings(ServiceKind::Java, "Batch", [("Nope", json!(1))])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Usage error: Setting 'Nope' is unknown to the Bridge.");
}

// ── Artefacts ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_model_notes_and_custom_notes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest_path("/services/xuml/Ticker/modelnotes")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service": "Ticker",
            "notes": [{
                "name": "Ticker",
                "href": "https://bridge.local:8080/bridge/rest/services/xuml/Ticker/modelnotes/Model_1.txt"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("/services/xuml/Ticker/modelnotes/Model_1.txt")))
        .respond_with(ResponseTemplate::new(200).set_body_string("Release 1.2"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(rest_path("/services/xuml/Ticker/customnotes")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Ticker</h1>"))
        .mount(&server)
        .await;

    let notes = client.model_notes_list("Ticker").await.unwrap();
    assert_eq!(notes.notes.len(), 1);
    let file = notes.notes[0].file_name();
    assert_eq!(client.model_note("Ticker", file).await.unwrap(), "Release 1.2");
    assert_eq!(client.custom_notes("Ticker").await.unwrap(), "<h1>Ticker</h1>");
}

#[tokio::test]
async fn test_repository_export_is_raw_bytes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest_path("/services/nodejs/Feed/repository")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04zip".to_vec()))
        .mount(&server)
        .await;

    let bytes = client
        .service_repository(ServiceKind::Node, "Feed")
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"PK\x03\x04zip");
}

#[tokio::test]
async fn test_cancel_session() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(rest_path("/services/xuml/Ticker/sessions/42")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.cancel_session("Ticker", "42").await.unwrap();
}

// ── Resource catalogue ──────────────────────────────────────────────

#[tokio::test]
async fn test_resource_catalogue_round() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest_path("/xuml/java")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": [{
                "name": "lib.jar",
                "date": "2024-01-01T10:00:00Z",
                "href": "https://bridge.local:8080/bridge/rest/xuml/java/lib.jar",
                "fileSize": "98 KB"
            }],
            "link": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(rest_path("/xuml/java")))
        .and(body_string_contains("filename=\"lib.jar\""))
        .and(body_string_contains("Content-Type: application/octet-stream"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(rest_path("/xuml/java/lib.jar")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let list = client.list_resources(ResourceType::Java).await.unwrap();
    assert_eq!(list.file[0].name, "lib.jar");
    assert_eq!(list.file[0].file_size.as_deref(), Some("98 KB"));

    client
        .upload_resource_bytes(ResourceType::Java, b"jar", "lib.jar")
        .await
        .unwrap();
    client
        .delete_resource(ResourceType::Java, "lib.jar")
        .await
        .unwrap();
}
