//! Webhook endpoint handlers.
//!
//! Each handler runs one linear pass:
//! 1. Reject anything but POST
//! 2. Verify the signature (signed Webflow route only)
//! 3. Extract and validate lead fields
//! 4. Forward the lead to Pabau
//!
//! Failures short-circuit through [`RelayError`], which turns them into
//! plain-text responses.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::crm::{forward_lead, LeadTransport};
use crate::lead::{extract_form_lead, extract_json_lead, PabauLead};
use crate::web::error::RelayError;
use crate::web::signature::{
    is_signature_verification_enabled, verify_webflow_signature, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
use crate::Config;

/// Trigger type Webflow sends for form submissions.
pub const FORM_SUBMISSION_TRIGGER: &str = "form_submission";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub transport: Arc<dyn LeadTransport>,
}

impl AppState {
    pub fn new(config: Config, transport: impl LeadTransport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Form-encoded Webhook
// =============================================================================

/// Plain Webflow form post (`application/x-www-form-urlencoded`).
///
/// First name, last name and email are all required. Responds `200 OK`
/// once Pabau accepts the lead.
pub async fn form_lead_webhook(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<impl IntoResponse, RelayError> {
    if method != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    info!(body_length = body.len(), "form_webhook_received");

    let lead = extract_form_lead(&body);
    if !lead.has_full_contact() {
        return Err(RelayError::MissingFields);
    }

    let endpoint = state.config.lead_endpoint().ok_or(RelayError::MissingApiKey)?;
    let payload = PabauLead::with_message_field(lead, &state.config.message_field);

    forward_lead(state.transport.as_ref(), &endpoint, &payload).await?;

    info!(email = %payload.email, "form_lead_created");

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "OK"))
}

// =============================================================================
// Signed Webflow Webhook
// =============================================================================

/// Webflow webhook envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebflowEnvelope {
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub payload: WebflowSubmission,
}

/// Form submission carried in a Webflow envelope.
#[derive(Debug, Default, Deserialize)]
pub struct WebflowSubmission {
    /// Form name as configured in Webflow
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Signed Webflow webhook (JSON).
///
/// Only email is required. Responds `204 No Content` once Pabau accepts
/// the lead.
pub async fn webflow_lead_webhook(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, RelayError> {
    if method != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    let config = &state.config;
    if !is_signature_verification_enabled(&config.webflow_signing_secret) {
        return Err(RelayError::MissingSigningSecret);
    }
    let secret = config.webflow_signing_secret.as_deref().unwrap_or_default();

    let timestamp = header_str(&headers, TIMESTAMP_HEADER);
    let signature = header_str(&headers, SIGNATURE_HEADER);

    info!(
        body_length = body.len(),
        has_signature = !signature.is_empty(),
        has_timestamp = !timestamp.is_empty(),
        "webflow_webhook_received"
    );

    if !verify_webflow_signature(
        secret,
        timestamp,
        &body,
        signature,
        config.signature_max_age_ms,
    ) {
        warn!("webflow_signature_invalid");
        return Err(RelayError::Unauthorized);
    }

    let envelope: WebflowEnvelope =
        serde_json::from_slice(&body).map_err(|e| RelayError::InvalidPayload(e.to_string()))?;

    if let Some(trigger) = envelope.trigger_type {
        if trigger != FORM_SUBMISSION_TRIGGER {
            return Err(RelayError::UnexpectedTrigger(trigger));
        }
    }

    let lead = extract_json_lead(&envelope.payload.data);
    if !lead.has_email() {
        return Err(RelayError::MissingFields);
    }

    let endpoint = config.lead_endpoint().ok_or(RelayError::MissingApiKey)?;
    let payload = PabauLead::with_description(lead, config.default_lead_owner.as_deref());

    forward_lead(state.transport.as_ref(), &endpoint, &payload).await?;

    info!(
        email = %payload.email,
        form_name = envelope.payload.name.as_deref().unwrap_or(""),
        "webflow_lead_created"
    );

    Ok(StatusCode::NO_CONTENT)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
