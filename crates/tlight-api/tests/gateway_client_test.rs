#![allow(clippy::unwrap_used)]
// Integration tests for `GatewayClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tlight_api::{
    Error, GatewayClient, IndividualLight, LightWriteBody, NodeState, NodeWriteBody, RgbColor,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GatewayClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v1", server.uri())).unwrap();
    let client = GatewayClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Node listing ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_nodes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{
                "id": "n1",
                "name": "Kitchen strip",
                "type": "ledstrip",
                "features": { "count": 2, "addressable": true, "color": true },
                "lights": [
                    { "id": "0", "type": "rgb", "brightness": 10, "color": { "red": 255 } },
                    { "id": 1, "type": "rgb" }
                ],
                "state": { "mode": "SINGLE", "brightness": 100 }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let nodes = client.fetch_nodes().await.unwrap();

    assert_eq!(nodes.len(), 1);
    let node = &nodes[0];
    assert_eq!(node.id, "n1");
    assert_eq!(node.node_type, "ledstrip");
    assert!(node.features.addressable);
    assert_eq!(node.features.animatable, None);
    assert_eq!(node.lights[1].id, "1");
    assert_eq!(node.lights[0].color.unwrap().red, Some(255));
    assert_eq!(node.state.mode.as_deref(), Some("SINGLE"));
    assert_eq!(node.state.brightness, Some(100));
}

#[tokio::test]
async fn test_fetch_nodes_empty_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nodes": [] })))
        .mount(&server)
        .await;

    assert!(client.fetch_nodes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_nodes_bad_payload() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.fetch_nodes().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_nodes_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/nodes"))
        .respond_with(ResponseTemplate::new(500).set_body_string("gateway down"))
        .mount(&server)
        .await;

    let result = client.fetch_nodes().await;
    assert!(
        matches!(result, Err(Error::Status { status: 500, ref body }) if body == "gateway down"),
        "expected Status error, got: {result:?}"
    );
}

// ── State writes ────────────────────────────────────────────────────

#[tokio::test]
async fn test_post_node_state_sparse_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_json(json!({
            "id": "n1",
            "state": { "brightness": 50, "color": { "red": 255 } }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let body = NodeWriteBody {
        id: "n1".into(),
        state: NodeState {
            mode: None,
            brightness: Some(50),
            color: Some(RgbColor {
                red: Some(255),
                green: None,
                blue: None,
            }),
        },
    };

    client.post_node_state(&body).await.unwrap();
}

#[tokio::test]
async fn test_post_light_state() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1"))
        .and(body_json(json!({
            "id": "n1",
            "state": { "mode": "INDIVIDUAL" },
            "individualData": [{ "id": "2", "color": { "green": 9 } }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let body = LightWriteBody::single(
        "n1",
        IndividualLight {
            id: "2".into(),
            brightness: None,
            color: Some(RgbColor {
                red: None,
                green: Some(9),
                blue: None,
            }),
        },
    );

    client.post_light_state(&body).await.unwrap();
}

#[tokio::test]
async fn test_post_node_state_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such node"))
        .mount(&server)
        .await;

    let body = NodeWriteBody {
        id: "n9".into(),
        state: NodeState::default(),
    };
    let err = client.post_node_state(&body).await.unwrap_err();

    assert!(err.is_not_found(), "expected 404, got: {err:?}");
}

// ── Effects ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_post_effect_setup() {
    let (server, client) = setup().await;

    let params = json!({
        "name": "SmoothColors",
        "lightCount": 3,
        "colors": true,
        "pluginOpts": { "startChannel": 1, "effectOpts": { "duration": 5 } }
    });

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1/plugin/source"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_json(params.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.post_effect_setup("n1", &params).await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    // Nothing listens on port 9 (discard) in the test environment.
    let client = GatewayClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9/v1").unwrap(),
    );

    let err = client.fetch_nodes().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_transient());
}
