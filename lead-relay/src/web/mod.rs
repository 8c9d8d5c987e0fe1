//! Web server module for handling inbound webhooks.
//!
//! This module provides a small web server that:
//! - Receives Webflow form submissions (form-encoded or signed JSON)
//! - Verifies authentication where the route requires it
//! - Forwards a normalized lead to Pabau
//! - Answers with a bare status code and plain-text body

pub mod error;
pub mod handlers;
pub mod signature;

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::RelayError;
pub use handlers::{
    form_lead_webhook, health, webflow_lead_webhook, AppState, HealthResponse, WebflowEnvelope,
    WebflowSubmission, FORM_SUBMISSION_TRIGGER,
};
pub use signature::{
    is_signature_verification_enabled, sign_webflow_payload, verify_signature_at,
    verify_webflow_signature,
};

/// Build the application router.
///
/// Webhook routes accept every method so the handlers can answer non-POST
/// requests with a plain-text 405.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/form", any(form_lead_webhook))
        .route("/webhooks/webflow", any(webflow_lead_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
