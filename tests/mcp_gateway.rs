mod common;

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn channel_starts_with_handshake_then_client_id() {
    let app = common::spawn_app().await;
    let mut channel = app.open_channel().await;

    let handshake = channel.next_event().await;
    assert_eq!(handshake.id, "1");
    assert_eq!(handshake.event, "mcp");
    assert_eq!(handshake.data["type"], "mcp_handshake_response");
    assert_eq!(handshake.data["protocol_version"], "2024-11-05");
    assert_eq!(handshake.data["server_info"]["name"], "toolgate-test");
    let names: Vec<&str> = handshake.data["capabilities"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["get-alerts", "get-forecast", "brave-web-search", "tavily-web-search"]
    );
    assert_eq!(
        handshake.data["capabilities"]["tools"][0]["inputSchema"]["required"],
        json!(["state"])
    );

    let assigned = channel.next_event().await;
    assert_eq!(assigned.id, "2");
    assert_eq!(assigned.data["type"], "client_id_assigned");
    assert!(!assigned.data["client_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn each_channel_gets_a_distinct_client_id() {
    let app = common::spawn_app().await;
    let (_first, first_id) = app.connect().await;
    let (_second, second_id) = app.connect().await;
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn missing_client_id_is_rejected_without_push() {
    let app = common::spawn_app().await;
    let (mut channel, _) = app.connect().await;

    let response = app
        .invoke(json!({"id": "r1", "tool_name": "get-alerts", "parameters": {"state": "CA"}}))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "r1");
    assert_eq!(body["status"], "error");
    assert_eq!(body["error_type"], "missing_client_id");
    assert!(channel.event_within(Duration::from_millis(300)).await.is_none());
}

#[tokio::test]
async fn unknown_client_id_is_rejected() {
    let app = common::spawn_app().await;

    let response = app
        .invoke(json!({
            "id": "r2",
            "tool_name": "get-alerts",
            "parameters": {"state": "CA"},
            "client_id": "0-doesnotexist00000"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error_type"], "invalid_client_id");
}

#[tokio::test]
async fn unknown_tool_is_rejected_and_pushed() {
    let app = common::spawn_app().await;
    let (mut channel, client_id) = app.connect().await;

    let response = app
        .invoke(json!({
            "id": "r3",
            "tool_name": "get-tides",
            "parameters": {},
            "client_id": client_id
        }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error_type"], "unknown_tool");

    let event = channel.next_event().await;
    assert_eq!(event.data["type"], "error");
    assert_eq!(event.data["id"], "r3");
    assert_eq!(event.data["error_type"], "unknown_tool");
}

#[tokio::test]
async fn alerts_for_empty_area_are_delivered_on_the_channel() {
    let app = common::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/alerts"))
        .and(query_param("area", "ZZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"features": []})))
        .expect(1)
        .mount(&app.nws)
        .await;
    let (mut channel, client_id) = app.connect().await;

    let response = app
        .invoke(json!({
            "id": "r4",
            "tool_name": "get-alerts",
            "parameters": {"state": "ZZ"},
            "client_id": client_id
        }))
        .await;

    assert_eq!(response.status().as_u16(), 202);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"id": "r4", "status": "processing"}));

    let event = channel.next_event().await;
    assert_eq!(event.id, "3");
    assert_eq!(event.data["type"], "tool_response");
    assert_eq!(event.data["id"], "r4");
    assert_eq!(event.data["tool_name"], "get-alerts");
    assert_eq!(
        event.data["result"]["content"][0]["text"],
        "No active alerts for ZZ"
    );
}

#[tokio::test]
async fn search_count_above_limit_never_reaches_the_provider() {
    let app = common::spawn_app().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"web": {"results": []}})))
        .expect(0)
        .mount(&app.brave)
        .await;
    let (mut channel, client_id) = app.connect().await;

    let response = app
        .invoke(json!({
            "id": "r5",
            "tool_name": "brave-web-search",
            "parameters": {"query": "rust", "count": 25},
            "client_id": client_id
        }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error_type"], "invalid_parameters");
    assert_eq!(body["errors"], json!(["count: must be between 1 and 20 (got 25)"]));

    let event = channel.next_event().await;
    assert_eq!(event.data["type"], "error");
    assert_eq!(event.data["error_type"], "invalid_parameters");
    assert!(channel.event_within(Duration::from_millis(300)).await.is_none());
}

#[tokio::test]
async fn out_of_range_latitude_is_rejected_before_any_request() {
    let app = common::spawn_app().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.nws)
        .await;
    let (_channel, client_id) = app.connect().await;

    let response = app
        .invoke(json!({
            "id": "r6",
            "tool_name": "get-forecast",
            "parameters": {"latitude": 999, "longitude": -74.0},
            "client_id": client_id
        }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error_type"], "invalid_parameters");
    assert_eq!(
        body["errors"],
        json!(["latitude: must be between -90 and 90 (got 999)"])
    );
}

#[tokio::test]
async fn every_violation_is_listed() {
    let app = common::spawn_app().await;
    let (_channel, client_id) = app.connect().await;

    let response = app
        .invoke(json!({
            "id": "r7",
            "tool_name": "get-forecast",
            "parameters": {"latitude": "north"},
            "client_id": client_id
        }))
        .await;

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["errors"],
        json!(["latitude: expected a number", "longitude: is required"])
    );
}

#[tokio::test]
async fn fast_result_is_not_held_behind_a_slow_one() {
    let app = common::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/alerts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"features": []}))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&app.nws)
        .await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Tokio", "url": "https://tokio.rs", "content": "Runtime"}]
        })))
        .mount(&app.tavily)
        .await;
    let (mut channel, client_id) = app.connect().await;

    let slow = app
        .invoke(json!({
            "id": "slow",
            "tool_name": "get-alerts",
            "parameters": {"state": "TX"},
            "client_id": client_id
        }))
        .await;
    assert_eq!(slow.status().as_u16(), 202);
    let fast = app
        .invoke(json!({
            "id": "fast",
            "tool_name": "tavily-web-search",
            "parameters": {"query": "tokio"},
            "client_id": client_id
        }))
        .await;
    assert_eq!(fast.status().as_u16(), 202);

    let first = channel.next_event().await;
    assert_eq!(first.data["id"], "fast");
    assert!(first.data["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("1. Tokio"));

    let second = channel.next_event().await;
    assert_eq!(second.data["id"], "slow");
    assert_eq!(
        second.data["result"]["content"][0]["text"],
        "No active alerts for TX"
    );
}

#[tokio::test]
async fn upstream_outage_is_delivered_as_text() {
    let app = common::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/alerts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.nws)
        .await;
    let (mut channel, client_id) = app.connect().await;

    app.invoke(json!({
        "id": "r8",
        "tool_name": "get-alerts",
        "parameters": {"state": "CA"},
        "client_id": client_id
    }))
    .await;

    let event = channel.next_event().await;
    assert_eq!(event.data["type"], "tool_response");
    assert_eq!(
        event.data["result"]["content"][0]["text"],
        "Failed to retrieve alerts data"
    );
}

#[tokio::test]
async fn malformed_body_is_invalid_request() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .post(&format!("{}/mcp/invoke", &app.address))
        .header("Content-Type", "application/json")
        .body("{\"id\": \"r9\", ")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error_type"], "invalid_request");
}
