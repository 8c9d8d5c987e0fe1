//! Outbound HTTP transport.
//!
//! The transport only moves bytes: it posts a JSON body and hands back the
//! status code and raw response text. Interpreting the response is the
//! forwarder's job, which keeps it testable with a fake transport.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

/// Raw response from the CRM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// The request never produced a response.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends a JSON payload to a URL.
#[async_trait]
pub trait LeadTransport: Send + Sync {
    async fn send(&self, url: &str, payload: &Value) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport.
///
/// Each call builds its own client, so connections are never reused across
/// requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransport;

#[async_trait]
impl LeadTransport for HttpTransport {
    async fn send(&self, url: &str, payload: &Value) -> Result<TransportResponse, TransportError> {
        let body = serde_json::to_vec(payload).map_err(|e| TransportError(e.to_string()))?;

        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError(e.to_string()))?;

        info!(body_length = body.len(), "crm_request_starting");

        let response = client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(error = %e, "crm_request_timeout");
                } else {
                    error!(error = %e, "crm_request_error");
                }
                TransportError(e.to_string())
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))?;

        info!(
            status_code = status,
            body_length = text.len(),
            "crm_request_complete"
        );

        Ok(TransportResponse { status, body: text })
    }
}
