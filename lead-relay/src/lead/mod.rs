//! Lead extraction and normalization.
//!
//! ## Flow
//!
//! ```text
//! form body / Webflow JSON → extract_*_lead() → NormalizedLead → PabauLead
//! ```

pub mod extract;
pub mod types;

pub use extract::{extract_form_lead, extract_json_lead};
pub use types::{NormalizedLead, PabauLead};
