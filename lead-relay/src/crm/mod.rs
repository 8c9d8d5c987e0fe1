//! Pabau CRM integration.
//!
//! This module provides:
//! - A narrow transport trait for the single outbound POST
//! - Lead forwarding with status/body interpretation
//! - Pipeline listing for the operator CLI

pub mod forwarder;
pub mod pipelines;
pub mod transport;

pub use forwarder::{forward_lead, interpret_response, ForwardError, ResponseBody};
pub use transport::{HttpTransport, LeadTransport, TransportError, TransportResponse};
