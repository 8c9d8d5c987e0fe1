//! Lead Relay - forwards Webflow form submissions to Pabau as leads.
//!
//! This library backs two binaries:
//! - `lead-relay`: Web server receiving form webhooks
//! - `lead-relay-pipelines`: Operator tool listing Pabau pipelines and stages
//!
//! ## Architecture
//!
//! ```text
//! Webflow → Web Server → verify → extract → Pabau /leads
//! ```

pub mod config;
pub mod crm;
pub mod lead;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use crm::{forward_lead, ForwardError, HttpTransport, LeadTransport};
pub use lead::{NormalizedLead, PabauLead};
pub use web::{router, AppState};
