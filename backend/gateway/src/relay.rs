//! Chat-completion relay.
//!
//! Accepts only POST. The body must be a JSON object; it is forwarded as-is
//! with the configured credential, and the provider's status code and JSON
//! body are returned untouched. Nothing is kept between calls.

use std::time::Instant;

use axum::{
    Json,
    body::{self, Body},
    extract::{Request, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use reqwest::Client;
use serde_json::{Value, json};
use shaman_config::RelayConfig;
use shaman_core::{RelayReply, ShamanError};
use shaman_logging::{EventLogger, TurnEvent};
use tracing::{debug, info, warn};

use crate::server::GatewayState;

/// Largest request body the relay will read (inline images are base64).
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Forwards requests to one upstream endpoint.
pub struct Relay {
    client: Client,
    upstream_url: String,
    api_key: String,
    referer: String,
    title: String,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            client: Client::new(),
            upstream_url: config.upstream_url.clone(),
            api_key: config.api_key.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        }
    }

    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    /// Parse `body` and forward it upstream.
    ///
    /// Any upstream status is a success here; only parse and network
    /// failures are errors.
    pub async fn forward(&self, body: &[u8]) -> Result<RelayReply, ShamanError> {
        let payload: Value =
            serde_json::from_slice(body).map_err(|e| ShamanError::Relay(e.to_string()))?;
        if !payload.is_object() {
            return Err(ShamanError::Relay("request body must be a JSON object".into()));
        }

        debug!(upstream = %self.upstream_url, "Forwarding request upstream");

        let response = self
            .client
            .post(&self.upstream_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ShamanError::Relay(e.to_string()))?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ShamanError::Relay(format!("upstream returned non-JSON body: {e}")))?;

        Ok(RelayReply { status, body })
    }
}

/// HTTP mapping of relay failures.
#[derive(Debug)]
pub struct ApiError(pub ShamanError);

impl From<ShamanError> for ApiError {
    fn from(err: ShamanError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ShamanError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "Only POST allowed",
            )
                .into_response(),
            ShamanError::Relay(message) => proxy_failed(message),
            other => proxy_failed(other.to_string()),
        }
    }
}

fn proxy_failed(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Proxy failed", "message": message })),
    )
        .into_response()
}

/// Handler mounted on the relay route for every method.
pub async fn relay_handler(State(state): State<GatewayState>, request: Request) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    if request.method() != Method::POST {
        debug!(method = %request.method(), "Rejected non-POST relay call");
        return ApiError(ShamanError::MethodNotAllowed).into_response();
    }

    let start = Instant::now();
    match relay_post(&state, request.into_body()).await {
        Ok(reply) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            info!(status = reply.status, latency_ms, "Relayed request");
            EventLogger::log_event(
                &request_id,
                TurnEvent::RelayCall { status: reply.status, latency_ms },
            );
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(reply.body)).into_response()
        }
        Err(err) => {
            warn!(error = %shaman_logging::redact_sensitive_data(&err.to_string()), "Relay failed");
            EventLogger::log_event(&request_id, TurnEvent::Error { error_msg: err.to_string() });
            ApiError(err).into_response()
        }
    }
}

async fn relay_post(state: &GatewayState, body: Body) -> Result<RelayReply, ShamanError> {
    let bytes = body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ShamanError::Relay(format!("failed to read request body: {e}")))?;
    state.relay.forward(&bytes).await
}
