use actix_web::web::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use std::time::Duration;
use toolgate::configuration::Settings;
use toolgate::connectors::ConnectorConfig;
use wiremock::MockServer;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    /// Stands in for api.weather.gov
    pub nws: MockServer,
    pub brave: MockServer,
    pub tavily: MockServer,
}

pub async fn spawn_app() -> TestApp {
    let nws = MockServer::start().await;
    let brave = MockServer::start().await;
    let tavily = MockServer::start().await;

    let mut connectors = ConnectorConfig::default();
    connectors.weather.base_url = nws.uri();
    connectors.weather.timeout_secs = 5;
    connectors.brave_search.base_url = brave.uri();
    connectors.brave_search.api_key = Some("brave-test-key".to_string());
    connectors.tavily_search.base_url = tavily.uri();
    connectors.tavily_search.api_key = Some("tavily-test-key".to_string());

    let settings = Settings {
        app_host: "127.0.0.1".to_string(),
        app_port: 0,
        server_name: "toolgate-test".to_string(),
        keep_alive_secs: 30,
        connectors,
    };

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let gateway = toolgate::startup::build_gateway_from_settings(&settings)
        .expect("Failed to build gateway");
    let server = toolgate::startup::run(listener, gateway).expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        nws,
        brave,
        tavily,
    }
}

impl TestApp {
    pub async fn open_channel(&self) -> EventChannel {
        let response = self
            .client
            .get(&format!("{}/mcp/sse", &self.address))
            .send()
            .await
            .expect("Failed to open push channel.");
        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("text/event-stream")
        );

        EventChannel {
            body: Box::pin(response.bytes_stream()),
            buffer: String::new(),
        }
    }

    /// Open a channel and consume the handshake and token assignment.
    pub async fn connect(&self) -> (EventChannel, String) {
        let mut channel = self.open_channel().await;
        let handshake = channel.next_event().await;
        assert_eq!(handshake.data["type"], "mcp_handshake_response");
        let assigned = channel.next_event().await;
        assert_eq!(assigned.data["type"], "client_id_assigned");
        let client_id = assigned.data["client_id"].as_str().unwrap().to_string();
        (channel, client_id)
    }

    pub async fn invoke(&self, body: Value) -> reqwest::Response {
        self.client
            .post(&format!("{}/mcp/invoke", &self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn health(&self) -> Value {
        self.client
            .get(&format!("{}/health_check", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
            .json()
            .await
            .unwrap()
    }
}

#[derive(Debug)]
pub struct ReceivedEvent {
    pub id: String,
    pub event: String,
    pub data: Value,
}

pub struct EventChannel {
    body: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buffer: String,
}

impl EventChannel {
    /// Next event frame, skipping keep-alive comments. Panics after 5 seconds.
    pub async fn next_event(&mut self) -> ReceivedEvent {
        tokio::time::timeout(Duration::from_secs(5), self.read_event())
            .await
            .expect("Timed out waiting for an event")
    }

    /// Whether an event arrives within `wait`.
    pub async fn event_within(&mut self, wait: Duration) -> Option<ReceivedEvent> {
        tokio::time::timeout(wait, self.read_event()).await.ok()
    }

    async fn read_event(&mut self) -> ReceivedEvent {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                if frame.starts_with(':') {
                    continue;
                }
                return parse_frame(&frame);
            }

            let chunk = self
                .body
                .next()
                .await
                .expect("Push channel closed")
                .expect("Failed to read push channel");
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }
}

fn parse_frame(frame: &str) -> ReceivedEvent {
    let mut event = ReceivedEvent {
        id: String::new(),
        event: String::new(),
        data: Value::Null,
    };
    for line in frame.lines() {
        if let Some(id) = line.strip_prefix("id: ") {
            event.id = id.to_string();
        } else if let Some(name) = line.strip_prefix("event: ") {
            event.event = name.to_string();
        } else if let Some(data) = line.strip_prefix("data: ") {
            event.data = serde_json::from_str(data).expect("Event data is not JSON");
        }
    }
    event
}
