//! Field extraction for the two inbound formats.
//!
//! Extraction never fails: missing values become empty strings and the
//! handlers decide what is required.

use serde_json::Value;
use tracing::{debug, warn};

use crate::lead::NormalizedLead;

const FIRST_NAME_KEYS: &[&str] = &["First Name", "first_name", "firstName", "First name", "Name"];
const LAST_NAME_KEYS: &[&str] = &["Last Name", "last_name", "lastName", "Last name"];
const EMAIL_KEYS: &[&str] = &["Email", "email", "Email Address", "email_address"];
const MESSAGE_KEYS: &[&str] = &["Message", "message", "Comments", "comments"];

/// Webflow's default label for a form input that was never renamed.
const GENERIC_FIELD_KEY: &str = "Field";

/// Extract a lead from an `application/x-www-form-urlencoded` body.
///
/// Repeated `field` values map positionally to first name, last name and
/// email. Named keys fill in whatever the positional values leave empty.
pub fn extract_form_lead(body: &[u8]) -> NormalizedLead {
    let mut positional: Vec<String> = Vec::new();
    let mut first_name = None;
    let mut last_name = None;
    let mut email = None;
    let mut message_upper = None;
    let mut message_lower = None;

    for (key, value) in url::form_urlencoded::parse(body) {
        let slot = match &*key {
            "field" => {
                positional.push(value.into_owned());
                continue;
            }
            "first_name" => &mut first_name,
            "last_name" => &mut last_name,
            "email" => &mut email,
            "Message" => &mut message_upper,
            "message" => &mut message_lower,
            _ => continue,
        };

        // First occurrence wins for named keys.
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    let pick = |index: usize, named: Option<String>| -> String {
        positional
            .get(index)
            .filter(|v| !v.is_empty())
            .cloned()
            .or(named)
            .unwrap_or_default()
    };

    let lead = NormalizedLead {
        first_name: pick(0, first_name),
        last_name: pick(1, last_name),
        email: pick(2, email),
        message: message_upper
            .filter(|m| !m.is_empty())
            .or(message_lower)
            .unwrap_or_default(),
    };

    debug!(
        positional_fields = positional.len(),
        has_email = lead.has_email(),
        "form_lead_extracted"
    );

    lead
}

/// Extract a lead from the `data` object of a Webflow form submission.
///
/// When no recognised email key exists, the generic `Field` value is used
/// as the email. That can pick up an unrelated input, so it is logged.
pub fn extract_json_lead(data: &Value) -> NormalizedLead {
    let mut email = first_present(data, EMAIL_KEYS);

    if email.is_empty() {
        let fallback = string_value(data.get(GENERIC_FIELD_KEY));
        if !fallback.is_empty() {
            warn!(key = GENERIC_FIELD_KEY, "webflow_email_from_generic_field");
            email = fallback;
        }
    }

    let lead = NormalizedLead {
        first_name: first_present(data, FIRST_NAME_KEYS),
        last_name: first_present(data, LAST_NAME_KEYS),
        email,
        message: first_present(data, MESSAGE_KEYS),
    };

    debug!(has_email = lead.has_email(), "webflow_lead_extracted");

    lead
}

/// Return the first non-empty value among the accepted spellings.
fn first_present(data: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| string_value(data.get(*key)))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Stringify scalar JSON values; everything else reads as empty.
fn string_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
