//! HTTP transport from the client to the relay route.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use shaman_core::{RelayReply, RelayTransport, TurnPayload};

/// Reaches the relay over HTTP.
pub struct HttpRelayTransport {
    client: Client,
    relay_url: String,
}

impl HttpRelayTransport {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            relay_url: relay_url.into(),
        }
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, payload: &TurnPayload) -> Result<RelayReply> {
        debug!(relay = %self.relay_url, model = %payload.model, "Sending turn to relay");

        let response = self
            .client
            .post(&self.relay_url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .context("Relay HTTP request failed")?;

        let status = response.status().as_u16();
        // Error statuses are reported by status alone; their body may not be JSON.
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status, body = %body, "Relay returned an error status");
            return Ok(RelayReply { status, body: serde_json::Value::Null });
        }

        let body = response
            .json()
            .await
            .context("Failed to parse relay response")?;

        Ok(RelayReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn spawn_relay(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/api/proxy",
            post(move |Json(_payload): Json<Value>| async move { (status, body) }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/proxy")
    }

    fn payload() -> TurnPayload {
        TurnPayload { model: "m".into(), messages: vec![], temperature: 0.7 }
    }

    #[tokio::test]
    async fn test_success_body_is_parsed() {
        let url = spawn_relay(StatusCode::OK, r#"{"choices":[{"message":{"content":"hi"}}]}"#).await;
        let reply = HttpRelayTransport::new(url).send(&payload()).await.unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.body, json!({"choices": [{"message": {"content": "hi"}}]}));
    }

    #[tokio::test]
    async fn test_error_status_does_not_need_json() {
        let url = spawn_relay(StatusCode::METHOD_NOT_ALLOWED, "Only POST allowed").await;
        let reply = HttpRelayTransport::new(url).send(&payload()).await.unwrap();
        assert_eq!(reply.status, 405);
        assert!(!reply.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_an_error() {
        let result = HttpRelayTransport::new("http://127.0.0.1:1/api/proxy").send(&payload()).await;
        assert!(result.is_err());
    }
}
