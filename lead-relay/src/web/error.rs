//! Mapping of webhook outcomes to HTTP responses.
//!
//! Callers only ever see a status code and a short plain-text body. Detail
//! about configuration or CRM failures stays in the server logs.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::crm::ForwardError;

/// Ways a webhook request can end without delivering a lead.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("webhook signing secret is not configured")]
    MissingSigningSecret,

    #[error("webhook signature rejected")]
    Unauthorized,

    #[error("payload is not valid JSON: {0}")]
    InvalidPayload(String),

    #[error("unexpected trigger type `{0}`")]
    UnexpectedTrigger(String),

    #[error("missing required fields")]
    MissingFields,

    #[error("no lead destination configured")]
    MissingApiKey,

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::InvalidPayload(_)
            | RelayError::UnexpectedTrigger(_)
            | RelayError::MissingFields => StatusCode::BAD_REQUEST,
            RelayError::MissingSigningSecret
            | RelayError::MissingApiKey
            | RelayError::Forward(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text returned to the caller.
    fn public_message(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "Method Not Allowed",
            RelayError::Unauthorized => "Unauthorized",
            RelayError::InvalidPayload(_) => "Invalid payload",
            RelayError::UnexpectedTrigger(_) => "Unsupported trigger type",
            RelayError::MissingFields => "Missing required fields",
            RelayError::MissingSigningSecret | RelayError::MissingApiKey => {
                "Server misconfigured"
            }
            RelayError::Forward(_) => "Error",
        }
    }

    fn log(&self) {
        match self {
            RelayError::MissingSigningSecret => error!("webflow_signing_secret_missing"),
            RelayError::MissingApiKey => error!("pabau_api_key_missing"),
            RelayError::Forward(e) => error!(
                error = %e,
                upstream_status = ?e.status(),
                upstream_body = %e.body().map(|b| b.to_string()).unwrap_or_default(),
                "lead_forward_failed"
            ),
            RelayError::InvalidPayload(detail) => {
                warn!(error = %detail, "webhook_payload_invalid")
            }
            RelayError::UnexpectedTrigger(trigger) => {
                warn!(trigger_type = %trigger, "webhook_trigger_unexpected")
            }
            RelayError::MissingFields => warn!("webhook_missing_required_fields"),
            RelayError::MethodNotAllowed | RelayError::Unauthorized => {}
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        self.log();

        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain")],
            self.public_message(),
        )
            .into_response()
    }
}
