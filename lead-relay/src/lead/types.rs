//! Lead record types.
//!
//! - [`NormalizedLead`]: what the extractors produce from any inbound format
//! - [`PabauLead`]: the JSON body posted to the Pabau lead endpoint

use std::collections::BTreeMap;

use serde::Serialize;

/// Lead fields extracted from a form submission.
///
/// Absent fields are empty strings; validation happens in the handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

impl NormalizedLead {
    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }

    /// First name, last name and email are all present.
    pub fn has_full_contact(&self) -> bool {
        !self.first_name.is_empty() && !self.last_name.is_empty() && self.has_email()
    }
}

/// Lead payload in the shape Pabau expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PabauLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Account-specific `custom_field_*` entries
    #[serde(flatten)]
    pub custom_fields: BTreeMap<String, String>,
}

impl PabauLead {
    /// Keys the payload always sets itself; custom fields must not reuse them.
    pub const RESERVED_KEYS: &'static [&'static str] =
        &["first_name", "last_name", "email", "owner", "description"];

    /// Build the payload used for plain form posts.
    ///
    /// The message lands in a Pabau custom field.
    pub fn with_message_field(lead: NormalizedLead, message_field: &str) -> Self {
        let mut custom_fields = BTreeMap::new();
        custom_fields.insert(message_field.to_string(), lead.message);

        Self {
            first_name: lead.first_name,
            last_name: lead.last_name,
            email: lead.email,
            owner: None,
            description: None,
            custom_fields,
        }
    }

    /// Build the payload used for signed Webflow submissions.
    ///
    /// The message becomes the lead description, and the owner is set when
    /// a default owner is configured.
    pub fn with_description(lead: NormalizedLead, owner: Option<&str>) -> Self {
        Self {
            first_name: lead.first_name,
            last_name: lead.last_name,
            email: lead.email,
            owner: owner.map(str::to_string),
            description: Some(lead.message).filter(|m| !m.is_empty()),
            custom_fields: BTreeMap::new(),
        }
    }
}
