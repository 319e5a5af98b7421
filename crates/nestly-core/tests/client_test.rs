#![allow(clippy::unwrap_used)]
// Integration tests for NestClient discovery, sensors, and cameras.

use std::time::Duration;

use chrono::DateTime;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nestly_core::{
    AuthCredentials, ClientConfig, CoreError, DEFAULT_CAMERA_NAME, Endpoints, NestClient,
    RetryPolicy,
};

const LAUNCH_PATH: &str = "/api/0.1/user/user-1/app_launch";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, NestClient) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "userid": "user-1", "access_token": "tok" })),
        )
        .mount(&server)
        .await;

    let base = Url::parse(&server.uri()).unwrap();
    let config = ClientConfig::new(AuthCredentials::Password {
        email: "owner@example.com".into(),
        password: SecretString::from("hunter2".to_string()),
    })
    .with_endpoints(Endpoints::with_base(&base).unwrap())
    .with_retry(RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    });

    (server, NestClient::new(config).unwrap())
}

async fn mount_camera_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/dropcam/api/login"))
        .and(body_string_contains("access_token=tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

fn camera_properties(name: &str, streaming: bool) -> serde_json::Value {
    json!([{
        "name": name,
        "is_online": true,
        "is_streaming": streaming,
        "location": "Garage",
        "rq_battery_battery_volt": 3.9,
        "rq_battery_vbridge_volt": 5.1,
        "properties": { "streaming.data-usage-tier": 1 }
    }])
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_devices_lists_every_kind() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(LAUNCH_PATH))
        .and(body_json(json!({
            "known_bucket_types": ["buckets"],
            "known_bucket_versions": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updated_buckets": [{
                "object_key": "buckets.user-1",
                "value": {
                    "buckets": [
                        "device.T1", "shared.T1", "device.T2",
                        "kryptonite.K1", "structure.S1", "user.user-1"
                    ]
                }
            }]
        })))
        .mount(&server)
        .await;
    mount_camera_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/cameras.get_owned_and_member_of_with_properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "uuid": "CAM1", "name": "Garage" }]
        })))
        .mount(&server)
        .await;

    let inventory = client.devices().await.unwrap();

    assert_eq!(inventory.thermostats, vec!["T1", "T2"]);
    assert_eq!(inventory.sensors, vec!["K1"]);
    assert_eq!(inventory.cameras.len(), 1);
    assert_eq!(inventory.cameras[0].uuid, "CAM1");
}

// ── Temperature sensor ──────────────────────────────────────────────

#[tokio::test]
async fn test_sensor_sync_reads_own_bucket() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(LAUNCH_PATH))
        .and(body_json(json!({
            "known_bucket_types": ["kryptonite"],
            "known_bucket_versions": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updated_buckets": [
                { "object_key": "kryptonite.K9", "value": { "current_temperature": 3.0, "battery_level": 1.0 } },
                { "object_key": "kryptonite.K1", "value": { "current_temperature": 18.25, "battery_level": 92.0 } }
            ]
        })))
        .mount(&server)
        .await;

    let sensor = client.temperature_sensor("K1").await.unwrap();
    let state = sensor.state().unwrap();

    assert_eq!(sensor.device_id(), "K1");
    assert_eq!(state.current_temperature, 18.25);
    assert_eq!(state.battery_level, 92.0);
}

#[tokio::test]
async fn test_sensor_missing_bucket_fails_after_one_relogin() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(LAUNCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updated_buckets": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let result = client.temperature_sensor("K1").await;
    assert!(matches!(result, Err(CoreError::SyncFailed { .. })));
}

// ── Camera ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_camera_sync_and_streaming_toggle() {
    let (server, client) = setup().await;
    mount_camera_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dropcam/api/cameras/CAM1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(camera_properties("Driveway", true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dropcams.set_properties"))
        .and(body_string_contains("streaming.enabled=false"))
        .and(body_string_contains("uuid=CAM1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dropcams.set_properties"))
        .and(body_string_contains("streaming.enabled=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let camera = client.camera("CAM1").await.unwrap();
    let state = camera.state().unwrap();

    assert_eq!(camera.name(), "Driveway");
    assert_eq!(state.location.as_deref(), Some("Garage"));
    assert!(state.is_online && state.is_streaming);
    assert_eq!(state.battery_voltage, Some(3.9));
    assert_eq!(state.ac_voltage, Some(5.1));
    assert_eq!(state.data_tier, Some(1));

    camera.turn_off().await.unwrap();
    camera.turn_on().await.unwrap();
}

#[tokio::test]
async fn test_camera_image_uses_cachebuster() {
    let (server, client) = setup().await;
    mount_camera_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dropcam/api/cameras/CAM1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(camera_properties("", false)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_image"))
        .and(query_param("uuid", "CAM1"))
        .and(query_param("cachebuster", "1700000123"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let camera = client.camera("CAM1").await.unwrap();
    assert_eq!(camera.name(), DEFAULT_CAMERA_NAME);

    let image = camera
        .image(DateTime::from_timestamp(1_700_000_123, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(image.as_ref(), b"jpeg-bytes");
}

#[tokio::test]
async fn test_camera_rejection_relogs_both_sessions() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dropcam/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dropcam/api/cameras/CAM1"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dropcam/api/cameras/CAM1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(camera_properties("Porch", true)))
        .mount(&server)
        .await;

    let camera = client.camera("CAM1").await.unwrap();

    assert_eq!(camera.name(), "Porch");
    assert_eq!(client.session().generation(), 2);
}

// ── Connection failures ─────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_service_is_a_connection_failure() {
    // Nothing listens on port 1.
    let base = Url::parse("http://127.0.0.1:1").unwrap();
    let config = ClientConfig::new(AuthCredentials::Password {
        email: "owner@example.com".into(),
        password: SecretString::from("hunter2".to_string()),
    })
    .with_endpoints(Endpoints::with_base(&base).unwrap())
    .with_retry(RetryPolicy {
        max_attempts: 1,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    });
    let client = NestClient::new(config).unwrap();

    let result = client.devices().await;

    assert!(
        matches!(result, Err(CoreError::ConnectionFailed { .. })),
        "expected ConnectionFailed, got: {result:?}"
    );
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_cancelled_client_reports_cancelled() {
    let (_server, client) = setup().await;
    client.cancel();

    let result = client.connect().await;
    assert!(matches!(result, Err(CoreError::Cancelled)));
}
