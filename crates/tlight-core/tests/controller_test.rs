#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a wiremock gateway.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tlight_core::schema::deep_get;
use tlight_core::{
    Controller, ControllerConfig, CoreError, EffectType, FileSink, FormNode, LightKey, Mode,
    NodeId, NodeValue, PersistenceSink, ValuesPatch,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> ControllerConfig {
    let url = Url::parse(&format!("{}/v1", server.uri())).unwrap();
    let mut config = ControllerConfig::new(url);
    config.node_throttle = Duration::from_millis(50);
    config.light_throttle = Duration::from_millis(50);
    config
}

fn offline_config() -> ControllerConfig {
    ControllerConfig::new(Url::parse("http://127.0.0.1:9/v1").unwrap())
}

async fn mount_nodes(server: &MockServer, nodes: Value) {
    Mock::given(method("GET"))
        .and(path("/v1/lights/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nodes": nodes })))
        .mount(server)
        .await;
}

async fn mount_node_writes(server: &MockServer, node_id: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/lights/nodes/{node_id}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn two_nodes() -> Value {
    json!([
        {
            "id": "n1",
            "name": "Desk",
            "features": { "color": true },
            "state": { "mode": "SINGLE", "brightness": 100 }
        },
        {
            "id": "n2",
            "name": "Shelf",
            "features": { "count": 2, "addressable": true },
            "lights": [{ "id": "0", "type": "white", "brightness": 5 }, { "id": "1" }],
            "state": { "mode": "INDIVIDUAL" }
        }
    ])
}

async fn connected(server: &MockServer) -> Controller {
    mount_nodes(server, two_nodes()).await;
    let controller = Controller::new(config_for(server)).unwrap();
    controller.connect().await.unwrap();
    controller
}

async fn post_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

// ── Initialization ──────────────────────────────────────────────────

#[tokio::test]
async fn test_initial_load_projects_node_values() {
    let server = MockServer::start().await;
    mount_nodes(
        &server,
        json!([{ "id": "n1", "state": { "mode": "SINGLE", "brightness": 100 }, "features": { "color": true } }]),
    )
    .await;

    let controller = Controller::new(config_for(&server)).unwrap();
    controller.connect().await.unwrap();

    let n1 = NodeId::from("n1");
    assert_eq!(
        controller.store().node_value(&n1).unwrap(),
        NodeValue {
            id: n1.clone(),
            mode: Some(Mode::Single),
            brightness: Some(100),
            red: None,
            green: None,
            blue: None,
        }
    );
    let assignment = controller.store().assignment(&n1).unwrap();
    assert_eq!(assignment.effect_id, None);
    assert!(controller.store().last_full_refresh().is_some());

    controller.disconnect().await;
}

#[tokio::test]
async fn test_out_of_range_reported_values_do_not_fail_connect() {
    let server = MockServer::start().await;
    mount_nodes(
        &server,
        json!([
            { "id": "n1", "state": { "brightness": 300 } },
            { "id": "n2", "lights": [{ "id": "0", "brightness": -1 }] }
        ]),
    )
    .await;

    let controller = Controller::new(config_for(&server)).unwrap();
    controller.connect().await.unwrap();

    assert_eq!(controller.store().node_count(), 2);
    assert_eq!(
        controller
            .store()
            .node_value(&NodeId::from("n1"))
            .unwrap()
            .brightness,
        Some(255)
    );
    controller.disconnect().await;
}

#[tokio::test]
async fn test_empty_node_list_is_valid() {
    let server = MockServer::start().await;
    mount_nodes(&server, json!([])).await;

    let controller = Controller::new(config_for(&server)).unwrap();
    controller.connect().await.unwrap();

    assert_eq!(controller.store().node_count(), 0);
    controller.disconnect().await;
}

#[tokio::test]
async fn test_unreachable_gateway_fails_connect() {
    let controller = Controller::new(offline_config()).unwrap();
    let result = controller.connect().await;
    assert!(
        matches!(result, Err(CoreError::ConnectionFailed { .. })),
        "expected ConnectionFailed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_lights_are_keyed_per_node() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    let n2 = NodeId::from("n2");
    let key = LightKey::new(&n2, "0");
    let light = controller.store().light_value(&n2, &key).unwrap();
    assert_eq!(light.brightness, Some(5));
    assert_eq!(light.light_type, "white");

    controller.disconnect().await;
}

// ── Node writes ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_node_write_commits_after_success() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1"))
        .and(body_json(json!({ "id": "n1", "state": { "color": { "red": 200 } } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let n1 = NodeId::from("n1");
    controller
        .set_node_values(&n1, ValuesPatch::default().red(200))
        .await
        .unwrap();

    let value = controller.store().node_value(&n1).unwrap();
    assert_eq!(value.red, Some(200));
    assert_eq!(value.brightness, Some(100));
    assert_eq!(value.mode, Some(Mode::Single));

    controller.disconnect().await;
}

#[tokio::test]
async fn test_rejected_write_leaves_store_untouched() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;
    mount_node_writes(&server, "n1", 500).await;

    let n1 = NodeId::from("n1");
    let before = controller.snapshot();
    let result = controller
        .change_node_values(&n1, ValuesPatch::default().brightness(7))
        .await;

    assert!(
        matches!(result, Err(CoreError::GatewayRejected { status: 500, .. })),
        "expected GatewayRejected, got: {result:?}"
    );
    assert_eq!(*controller.snapshot(), *before);
    assert_eq!(
        controller.node_display_value(&n1).unwrap().brightness,
        Some(100)
    );

    controller.disconnect().await;
}

#[tokio::test]
async fn test_writes_to_one_node_leave_others_alone() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;
    mount_node_writes(&server, "n1", 200).await;

    let n2 = NodeId::from("n2");
    let before = controller.store().node_value(&n2);
    controller
        .set_node_values(&NodeId::from("n1"), ValuesPatch::default().mode(Mode::External))
        .await
        .unwrap();

    assert_eq!(controller.store().node_value(&n2), before);
    controller.disconnect().await;
}

#[tokio::test]
async fn test_throttled_burst_sends_leading_and_merged_trailing() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;
    mount_node_writes(&server, "n1", 200).await;

    let n1 = NodeId::from("n1");
    let (a, b, c) = tokio::join!(
        controller.change_node_values(&n1, ValuesPatch::default().brightness(10)),
        controller.change_node_values(&n1, ValuesPatch::default().brightness(20).red(1)),
        controller.change_node_values(&n1, ValuesPatch::default().brightness(30)),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(
        post_bodies(&server).await,
        vec![
            json!({ "id": "n1", "state": { "brightness": 10 } }),
            json!({ "id": "n1", "state": { "brightness": 30, "color": { "red": 1 } } }),
        ]
    );
    let value = controller.store().node_value(&n1).unwrap();
    assert_eq!((value.brightness, value.red), (Some(30), Some(1)));

    controller.disconnect().await;
}

#[tokio::test]
async fn test_stale_response_does_not_overwrite_newer_edit() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1"))
        .and(body_partial_json(json!({ "state": { "brightness": 10 } })))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1"))
        .and(body_partial_json(json!({ "state": { "brightness": 20 } })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let n1 = NodeId::from("n1");
    let (older, newer) = tokio::join!(
        controller.set_node_values(&n1, ValuesPatch::default().brightness(10)),
        controller.set_node_values(&n1, ValuesPatch::default().brightness(20)),
    );
    older.unwrap();
    newer.unwrap();

    assert_eq!(
        controller.store().node_value(&n1).unwrap().brightness,
        Some(20)
    );
    controller.disconnect().await;
}

// ── Light writes ────────────────────────────────────────────────────

#[tokio::test]
async fn test_light_write_uses_individual_mode() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n2"))
        .and(body_json(json!({
            "id": "n2",
            "state": { "mode": "INDIVIDUAL" },
            "individualData": [{ "id": "1", "brightness": 42 }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let n2 = NodeId::from("n2");
    let key = LightKey::new(&n2, "1");
    controller
        .change_light_values(&n2, &key, ValuesPatch::default().brightness(42))
        .await
        .unwrap();

    assert_eq!(
        controller.store().light_value(&n2, &key).unwrap().brightness,
        Some(42)
    );
    controller.disconnect().await;
}

// ── Effects ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_type_change_fills_schema_defaults() {
    let controller = Controller::new(offline_config()).unwrap();
    let id = controller.create_effect();
    controller
        .set_effect_type(&id, Some(EffectType::SmoothColors))
        .unwrap();

    let duration_path = "effect.pluginOpts.effectOpts.duration";
    let effect = controller.store().effect(&id).unwrap();
    assert_eq!(deep_get(&effect.effect_properties, duration_path), Some(&json!(5)));

    controller
        .set_effect_property(&id, duration_path, json!(20))
        .unwrap();
    let effect = controller.store().effect(&id).unwrap();
    assert_eq!(deep_get(&effect.effect_properties, duration_path), Some(&json!(20)));
}

#[tokio::test]
async fn test_editing_unknown_effect_is_not_found() {
    let controller = Controller::new(offline_config()).unwrap();
    let result = controller.set_effect_name(&"missing".into(), "x");
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_effect_form_follows_color_preference() {
    let controller = Controller::new(offline_config()).unwrap();
    let id = controller.create_effect();
    assert!(controller.effect_form(&id).unwrap().is_empty());

    controller
        .set_effect_type(&id, Some(EffectType::SmoothColors))
        .unwrap();
    controller
        .set_effect_color(&id, "effect.pluginOpts.effectOpts.startColor", (1, 2, 3))
        .unwrap();

    let form = controller.effect_form(&id).unwrap();
    let json = serde_json::to_value(&form).unwrap();
    let start = &json[2]["children"][1]["children"][1];
    assert_eq!(start["path"], json!("effect.pluginOpts.effectOpts.startColor"));
    assert_eq!(start["mode"], json!("picker"));
    assert_eq!(start["red"], json!(1));
    assert!(form.iter().any(|node| matches!(node, FormNode::IntSlider { .. })));

    controller.set_card_preference(
        id.as_str(),
        tlight_core::CardPreference::UseColorPicker(false),
    );
    let json = serde_json::to_value(controller.effect_form(&id).unwrap()).unwrap();
    assert_eq!(
        json[2]["children"][1]["children"][1]["mode"],
        json!("sliders")
    );
}

#[tokio::test]
async fn test_select_effect_assigns_only_that_node() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1/plugin/source"))
        .and(body_partial_json(json!({ "name": "SmoothColors", "colors": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let id = controller.create_effect();
    controller
        .set_effect_type(&id, Some(EffectType::SmoothColors))
        .unwrap();

    let n1 = NodeId::from("n1");
    controller.select_effect(&n1, &id, Some(true)).await.unwrap();

    let state = controller.snapshot();
    let assignments = &state.effects.effects_in_use_per_node;
    assert_eq!(assignments[&n1].effect_id.as_ref(), Some(&id));
    assert_eq!(assignments[&NodeId::from("n2")].effect_id, None);

    controller.disconnect().await;
}

#[tokio::test]
async fn test_failed_effect_setup_keeps_assignment() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1/plugin/source"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let id = controller.create_effect();
    controller.set_effect_type(&id, Some(EffectType::Sacn)).unwrap();

    let n1 = NodeId::from("n1");
    let result = controller.select_effect(&n1, &id, None).await;

    assert!(result.is_err());
    assert_eq!(controller.store().assignment(&n1).unwrap().effect_id, None);
    controller.disconnect().await;
}

#[tokio::test]
async fn test_reload_resets_every_assignment() {
    let server = MockServer::start().await;
    let controller = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/lights/nodes/n1/plugin/source"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let id = controller.create_effect();
    controller.set_effect_type(&id, Some(EffectType::Sacn)).unwrap();
    let n1 = NodeId::from("n1");
    controller.select_effect(&n1, &id, None).await.unwrap();
    assert!(controller.store().assignment(&n1).unwrap().effect_id.is_some());

    controller.load_nodes().await.unwrap();

    let state = controller.snapshot();
    assert!(
        state
            .effects
            .effects_in_use_per_node
            .values()
            .all(|a| a.effect_id.is_none())
    );
    // Configured effects survive a reload.
    assert_eq!(state.effects.configured_effects.len(), 1);

    controller.disconnect().await;
}

// ── Persistence ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_effects_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let sink: Arc<dyn PersistenceSink> = Arc::new(FileSink::new(dir.path().join("state.json")));

    let first = Controller::with_persistence(offline_config(), Arc::clone(&sink)).unwrap();
    let id = first.create_effect();
    first.set_effect_name(&id, "Sunrise").unwrap();
    first
        .set_effect_type(&id, Some(EffectType::SmoothColors))
        .unwrap();
    first.disconnect().await;

    let second = Controller::with_persistence(offline_config(), sink).unwrap();
    let restored = second.store().effect(&id).unwrap();
    assert_eq!(restored.name, "Sunrise");
    assert_eq!(restored.effect_type, Some(EffectType::SmoothColors));
    assert_eq!(restored, first.store().effect(&id).unwrap());
}
