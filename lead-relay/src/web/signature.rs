//! Webflow webhook signature verification.
//!
//! Webflow signs webhook requests with HMAC-SHA256 over `"<timestamp>:<body>"`,
//! where the timestamp is milliseconds since the Unix epoch. The hex digest is
//! sent in `x-webflow-signature` and the timestamp in `x-webflow-timestamp`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-webflow-signature";

/// Header carrying the signing timestamp in milliseconds.
pub const TIMESTAMP_HEADER: &str = "x-webflow-timestamp";

/// Verify a Webflow webhook signature against the current clock.
///
/// # Arguments
///
/// * `secret` - The webhook signing secret
/// * `timestamp` - The `x-webflow-timestamp` header value
/// * `body` - The raw request body, exactly as received
/// * `signature` - The `x-webflow-signature` header value
/// * `max_age_ms` - Maximum allowed age of the timestamp
///
/// # Returns
///
/// `true` if the signature is valid and not stale, `false` otherwise.
pub fn verify_webflow_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    max_age_ms: u64,
) -> bool {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    verify_signature_at(secret, timestamp, body, signature, now_ms, max_age_ms)
}

/// Verify a Webflow webhook signature at a fixed point in time.
pub fn verify_signature_at(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now_ms: u64,
    max_age_ms: u64,
) -> bool {
    if secret.is_empty() || timestamp.is_empty() || signature.is_empty() {
        warn!(
            has_secret = !secret.is_empty(),
            has_timestamp = !timestamp.is_empty(),
            has_signature = !signature.is_empty(),
            "webflow_signature_missing_fields"
        );
        return false;
    }

    let webhook_time: u64 = match timestamp.trim().parse() {
        Ok(t) => t,
        Err(_) => {
            warn!(timestamp = %timestamp, "webflow_signature_invalid_timestamp");
            return false;
        }
    };

    // Timestamps ahead of the local clock count as age zero.
    let age_ms = now_ms.saturating_sub(webhook_time);
    if age_ms > max_age_ms {
        warn!(
            webhook_time = webhook_time,
            current_time = now_ms,
            age_ms = age_ms,
            max_age_ms = max_age_ms,
            "webflow_signature_stale"
        );
        return false;
    }

    let provided = match hex::decode(signature.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "webflow_signature_malformed_hex");
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("webflow_signature_invalid_key");
            return false;
        }
    };

    mac.update(webhook_time.to_string().as_bytes());
    mac.update(b":");
    mac.update(body);

    // verify_slice compares in constant time and rejects length mismatches.
    let valid = mac.verify_slice(&provided).is_ok();

    if !valid {
        warn!(provided_length = provided.len(), "webflow_signature_mismatch");
    }

    valid
}

/// Compute the hex signature Webflow would send for a timestamp and body.
pub fn sign_webflow_payload(secret: &str, timestamp: u64, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}:", timestamp).as_bytes());
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Check if a signing secret is configured.
pub fn is_signature_verification_enabled(secret: &Option<String>) -> bool {
    secret
        .as_ref()
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret";
    const NOW: u64 = 1_700_000_000_000;
    const BODY: &[u8] = br#"{"triggerType":"form_submission","payload":{"data":{}}}"#;

    fn sign(timestamp: u64, body: &[u8]) -> String {
        sign_webflow_payload(SECRET, timestamp, body).unwrap()
    }

    #[test]
    fn test_verify_signature_valid() {
        let signature = sign(NOW, BODY);
        assert!(verify_signature_at(
            SECRET,
            &NOW.to_string(),
            BODY,
            &signature,
            NOW + 1_000,
            300_000
        ));
    }

    #[test]
    fn test_verify_signature_against_clock() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let signature = sign(now, BODY);

        assert!(verify_webflow_signature(
            SECRET,
            &now.to_string(),
            BODY,
            &signature,
            300_000
        ));
    }

    #[test]
    fn test_verify_signature_missing_fields() {
        let ts = NOW.to_string();
        assert!(!verify_signature_at("", &ts, BODY, "ab", NOW, 300_000));
        assert!(!verify_signature_at(SECRET, "", BODY, "ab", NOW, 300_000));
        assert!(!verify_signature_at(SECRET, &ts, BODY, "", NOW, 300_000));
    }

    #[test]
    fn test_verify_signature_invalid_timestamp() {
        let signature = sign(NOW, BODY);
        assert!(!verify_signature_at(
            SECRET,
            "not-a-number",
            BODY,
            &signature,
            NOW,
            300_000
        ));
    }

    #[test]
    fn test_verify_signature_stale() {
        let signature = sign(NOW, BODY);
        assert!(!verify_signature_at(
            SECRET,
            &NOW.to_string(),
            BODY,
            &signature,
            NOW + 300_001,
            300_000
        ));
    }

    #[test]
    fn test_verify_signature_at_window_edge() {
        let signature = sign(NOW, BODY);
        assert!(verify_signature_at(
            SECRET,
            &NOW.to_string(),
            BODY,
            &signature,
            NOW + 300_000,
            300_000
        ));
    }

    #[test]
    fn test_verify_signature_bit_flip_in_signature() {
        let signature = sign(NOW, BODY);
        let mut bytes = hex::decode(&signature).unwrap();

        for i in 0..bytes.len() {
            for bit in 0..8 {
                bytes[i] ^= 1 << bit;
                let mutated = hex::encode(&bytes);
                assert!(!verify_signature_at(
                    SECRET,
                    &NOW.to_string(),
                    BODY,
                    &mutated,
                    NOW,
                    300_000
                ));
                bytes[i] ^= 1 << bit;
            }
        }
    }

    #[test]
    fn test_verify_signature_bit_flip_in_body() {
        let signature = sign(NOW, BODY);
        let mut body = BODY.to_vec();

        for i in 0..body.len() {
            for bit in 0..8 {
                body[i] ^= 1 << bit;
                assert!(!verify_signature_at(
                    SECRET,
                    &NOW.to_string(),
                    &body,
                    &signature,
                    NOW,
                    300_000
                ));
                body[i] ^= 1 << bit;
            }
        }
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let signature = sign_webflow_payload("other-secret", NOW, BODY).unwrap();
        assert!(!verify_signature_at(
            SECRET,
            &NOW.to_string(),
            BODY,
            &signature,
            NOW,
            300_000
        ));
    }

    #[test]
    fn test_verify_signature_malformed_hex() {
        assert!(!verify_signature_at(
            SECRET,
            &NOW.to_string(),
            BODY,
            "zz-not-hex",
            NOW,
            300_000
        ));
    }

    #[test]
    fn test_verify_signature_truncated() {
        let signature = sign(NOW, BODY);
        assert!(!verify_signature_at(
            SECRET,
            &NOW.to_string(),
            BODY,
            &signature[..32],
            NOW,
            300_000
        ));
    }

    #[test]
    fn test_verify_signature_uppercase_hex_accepted() {
        let signature = sign(NOW, BODY).to_uppercase();
        assert!(verify_signature_at(
            SECRET,
            &NOW.to_string(),
            BODY,
            &signature,
            NOW,
            300_000
        ));
    }

    #[test]
    fn test_is_signature_verification_enabled() {
        assert!(!is_signature_verification_enabled(&None));
        assert!(!is_signature_verification_enabled(&Some("".to_string())));
        assert!(!is_signature_verification_enabled(&Some("   ".to_string())));
        assert!(is_signature_verification_enabled(&Some("key123".to_string())));
    }
}
