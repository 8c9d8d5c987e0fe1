//! Lead forwarding and response interpretation.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::crm::transport::{LeadTransport, TransportResponse};

/// Response body attached to a forwarding error.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(v) => write!(f, "{}", v),
            ResponseBody::Text(s) => f.write_str(s),
        }
    }
}

/// Why a lead could not be delivered.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to encode lead payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request to CRM failed: {0}")]
    Transport(String),

    #[error("CRM response was not valid JSON (status {status})")]
    InvalidJson { status: u16, raw: String },

    #[error("CRM returned an error (status {status})")]
    Upstream { status: u16, body: Value },
}

impl ForwardError {
    /// HTTP status from the CRM, if a response arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForwardError::InvalidJson { status, .. } | ForwardError::Upstream { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Response body from the CRM, parsed when possible.
    pub fn body(&self) -> Option<ResponseBody> {
        match self {
            ForwardError::InvalidJson { raw, .. } => Some(ResponseBody::Text(raw.clone())),
            ForwardError::Upstream { body, .. } => Some(ResponseBody::Json(body.clone())),
            _ => None,
        }
    }
}

/// Post a lead and interpret the CRM's answer.
///
/// Makes exactly one request. Resolves to the parsed response body on a 2xx
/// status; an empty body parses as `null`.
pub async fn forward_lead<T: Serialize>(
    transport: &dyn LeadTransport,
    url: &str,
    payload: &T,
) -> Result<Value, ForwardError> {
    let payload = serde_json::to_value(payload)?;

    let response = transport
        .send(url, &payload)
        .await
        .map_err(|e| ForwardError::Transport(e.0))?;

    let parsed = interpret_response(response)?;

    info!("lead_forwarded");

    Ok(parsed)
}

/// Turn a raw CRM response into a parsed body or an error.
///
/// A body that is not JSON is an error even on a 2xx status.
pub fn interpret_response(response: TransportResponse) -> Result<Value, ForwardError> {
    let TransportResponse { status, body } = response;

    let parsed = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(_) => return Err(ForwardError::InvalidJson { status, raw: body }),
        }
    };

    if !(200..300).contains(&status) {
        return Err(ForwardError::Upstream {
            status,
            body: parsed,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::transport::TransportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays a canned result and records what was sent.
    struct CannedTransport {
        result: Mutex<Option<Result<TransportResponse, TransportError>>>,
        sent: Mutex<Vec<(String, Value)>>,
    }

    impl CannedTransport {
        fn new(result: Result<TransportResponse, TransportError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn respond(status: u16, body: &str) -> Self {
            Self::new(Ok(TransportResponse {
                status,
                body: body.to_string(),
            }))
        }
    }

    #[async_trait]
    impl LeadTransport for CannedTransport {
        async fn send(&self, url: &str, payload: &Value) -> Result<TransportResponse, TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((url.to_string(), payload.clone()));
            self.result.lock().unwrap().take().expect("single call")
        }
    }

    #[tokio::test]
    async fn test_forward_success_returns_parsed_body() {
        let transport = CannedTransport::respond(200, r#"{"success":true,"lead_id":7}"#);
        let payload = json!({"email": "jane@x.com"});

        let result = forward_lead(&transport, "https://crm.test/leads", &payload)
            .await
            .unwrap();

        assert_eq!(result, json!({"success": true, "lead_id": 7}));

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://crm.test/leads");
        assert_eq!(sent[0].1, payload);
    }

    #[tokio::test]
    async fn test_forward_empty_body_is_null() {
        let transport = CannedTransport::respond(201, "");

        let result = forward_lead(&transport, "https://crm.test", &json!({})).await.unwrap();

        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_forward_error_status_carries_body() {
        let transport = CannedTransport::respond(500, r#"{"error":"bad"}"#);

        let err = forward_lead(&transport, "https://crm.test", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ForwardError::Upstream { status: 500, .. }));
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some(ResponseBody::Json(json!({"error": "bad"}))));
    }

    #[tokio::test]
    async fn test_forward_invalid_json_carries_raw_text() {
        let transport = CannedTransport::respond(200, "<html>gateway</html>");

        let err = forward_lead(&transport, "https://crm.test", &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(200));
        assert_eq!(
            err.body(),
            Some(ResponseBody::Text("<html>gateway</html>".to_string()))
        );
    }

    #[tokio::test]
    async fn test_forward_invalid_json_on_error_status() {
        let transport = CannedTransport::respond(502, "Bad Gateway");

        let err = forward_lead(&transport, "https://crm.test", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ForwardError::InvalidJson { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_forward_transport_failure() {
        let transport = CannedTransport::new(Err(TransportError("connection refused".to_string())));

        let err = forward_lead(&transport, "https://crm.test", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, ForwardError::Transport(_)));
        assert_eq!(err.status(), None);
        assert_eq!(err.body(), None);
    }

    #[test]
    fn test_interpret_boundary_statuses() {
        let ok = |status| {
            interpret_response(TransportResponse {
                status,
                body: "{}".to_string(),
            })
            .is_ok()
        };

        assert!(!ok(199));
        assert!(ok(200));
        assert!(ok(299));
        assert!(!ok(300));
        assert!(!ok(404));
    }
}
