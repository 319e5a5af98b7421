#![allow(clippy::unwrap_used)]
// Integration tests for the camera sub-session using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nestly_api::{Endpoints, Error, LoginMethod, RetryPolicy, Session};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let session = Session::with_client(
        reqwest::Client::new(),
        Endpoints::with_base(&base).unwrap(),
        LoginMethod::Password {
            email: "owner@example.com".into(),
            password: SecretString::from("hunter2".to_string()),
        },
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        },
    );

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "userid": "user-1", "access_token": "tok-1" })),
        )
        .mount(&server)
        .await;

    (server, session)
}

fn camera_json() -> serde_json::Value {
    json!([{
        "name": "Front Door",
        "is_online": true,
        "is_streaming": false,
        "location": "Porch",
        "rq_battery_battery_volt": 4.1,
        "rq_battery_vbridge_volt": null,
        "properties": { "streaming.data-usage-tier": 3, "streaming.enabled": false }
    }])
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_camera_login_posts_token_as_form() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dropcam/api/login"))
        .and(body_string_contains("access_token=tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    session.camera_login().await.unwrap();
}

#[tokio::test]
async fn test_camera_login_runs_once_per_generation() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dropcam/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    session.ensure_camera_login().await.unwrap();
    session.ensure_camera_login().await.unwrap();

    // A fresh main login invalidates the camera cookie.
    session.relogin(session.generation()).await.unwrap();
    session.ensure_camera_login().await.unwrap();
}

#[tokio::test]
async fn test_camera_properties() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dropcam/api/cameras/CAM1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(camera_json()))
        .expect(1)
        .mount(&server)
        .await;

    let props = session.camera_properties("CAM1").await.unwrap();

    assert_eq!(props.name, "Front Door");
    assert!(props.is_online);
    assert!(!props.is_streaming);
    assert_eq!(props.location.as_deref(), Some("Porch"));
    assert_eq!(props.rq_battery_battery_volt, Some(4.1));
    assert_eq!(props.rq_battery_vbridge_volt, None);
    assert_eq!(props.data_tier(), Some(3));
}

#[tokio::test]
async fn test_camera_properties_empty_array_is_decode_error() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dropcam/api/cameras/CAM1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = session.camera_properties("CAM1").await;
    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[tokio::test]
async fn test_list_cameras() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/cameras.get_owned_and_member_of_with_properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "uuid": "CAM1", "name": "Front Door", "is_online": true, "where": "Porch", "type": 12 },
                { "uuid": "CAM2" }
            ]
        })))
        .mount(&server)
        .await;

    let cameras = session.list_cameras().await.unwrap();

    assert_eq!(cameras.len(), 2);
    assert_eq!(cameras[0].uuid, "CAM1");
    assert_eq!(cameras[0].location.as_deref(), Some("Porch"));
    assert_eq!(cameras[0].extra.get("type"), Some(&json!(12)));
    assert_eq!(cameras[1].name, None);
}

#[tokio::test]
async fn test_set_camera_property_form() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dropcams.set_properties"))
        .and(body_string_contains("streaming.enabled=true"))
        .and(body_string_contains("uuid=CAM1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "uuid": "CAM1", "streaming.enabled": true }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = session
        .set_camera_property("CAM1", "streaming.enabled", "true")
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_camera_image_bytes() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_image"))
        .and(query_param("uuid", "CAM1"))
        .and(query_param("cachebuster", "1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .expect(1)
        .mount(&server)
        .await;

    let image = session.camera_image("CAM1", 1_700_000_000).await.unwrap();
    assert_eq!(image.as_ref(), &[0xFF, 0xD8, 0xFF, 0xE0]);
}

#[tokio::test]
async fn test_camera_forbidden_is_session_expired() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get_image"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = session.camera_image("CAM1", 1).await;
    assert!(matches!(result, Err(Error::SessionExpired)));
}
