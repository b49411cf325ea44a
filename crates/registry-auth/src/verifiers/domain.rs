//! Shared domain-ownership proof handling.
//!
//! Both domain verifiers accept the same proof: a detached Ed25519
//! signature over an RFC3339 timestamp, checked against keys the domain's
//! controller published under a fixed marker grammar
//! (`v=MCPv1; k=ed25519; p=<base64 key>`). Everything here is pure --
//! syntax validation runs before any network call, and candidate-key
//! extraction tolerates malformed entries so key rotation never breaks a
//! proof that one valid key can still verify.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

use crate::error::{AuthError, AuthResult};

/// Acceptance window around "now" for the proof timestamp, inclusive.
pub(crate) const PROOF_WINDOW_MS: i64 = 15_000;

/// Maximum total domain length per RFC 1035.
const MAX_DOMAIN_LENGTH: usize = 253;

/// Maximum label length per RFC 1035.
const MAX_LABEL_LENGTH: usize = 63;

/// Validate domain syntax: lowercase labels of letters, digits, and
/// hyphens, no edge hyphens, at least two labels.
pub(crate) fn validate_domain(domain: &str) -> AuthResult<()> {
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LENGTH {
        return Err(AuthError::MalformedInput(format!(
            "Invalid domain '{}'",
            domain
        )));
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(AuthError::MalformedInput(format!(
            "Invalid domain '{}'",
            domain
        )));
    }
    for label in labels {
        let valid = !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid {
            return Err(AuthError::MalformedInput(format!(
                "Invalid domain '{}'",
                domain
            )));
        }
    }
    Ok(())
}

/// Reverse the labels of a domain (`example.com` -> `com.example`).
pub(crate) fn reverse_domain_labels(domain: &str) -> String {
    domain.split('.').rev().collect::<Vec<_>>().join(".")
}

/// Parse the proof timestamp.
pub(crate) fn parse_timestamp(timestamp: &str) -> AuthResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            AuthError::MalformedInput("Timestamp is not valid RFC3339".to_string())
        })
}

/// Decode the hex signature and enforce its length.
pub(crate) fn decode_signature(signature_hex: &str) -> AuthResult<Signature> {
    let bytes = hex::decode(signature_hex)
        .map_err(|_| AuthError::MalformedInput("Signature is not valid hex".to_string()))?;
    let bytes: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| {
        AuthError::MalformedInput(format!("Signature must be {} bytes", SIGNATURE_LENGTH))
    })?;
    Ok(Signature::from_bytes(&bytes))
}

/// Enforce the proof timestamp window against the injected clock.
pub(crate) fn check_window(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> AuthResult<()> {
    let skew_ms = (now - timestamp).num_milliseconds().abs();
    if skew_ms > PROOF_WINDOW_MS {
        return Err(AuthError::ProofRejected(
            "Proof timestamp is outside the acceptance window".to_string(),
        ));
    }
    Ok(())
}

/// Extract every well-formed verification key from the published records.
///
/// Records that do not carry the marker grammar, or whose key material is
/// not a valid Ed25519 public key, are skipped rather than fatal.
pub(crate) fn candidate_keys<'a, I>(records: I) -> Vec<VerifyingKey>
where
    I: IntoIterator<Item = &'a str>,
{
    records
        .into_iter()
        .filter_map(parse_proof_record)
        .collect()
}

fn parse_proof_record(record: &str) -> Option<VerifyingKey> {
    let mut version = None;
    let mut key_type = None;
    let mut key_material = None;

    for field in record.split(';') {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        let (name, value) = field.split_once('=')?;
        match name {
            "v" => version = Some(value),
            "k" => key_type = Some(value),
            "p" => key_material = Some(value),
            _ => {}
        }
    }

    if version != Some("MCPv1") || key_type != Some("ed25519") {
        return None;
    }
    let decoded = BASE64_STANDARD.decode(key_material?).ok()?;
    let bytes: [u8; PUBLIC_KEY_LENGTH] = decoded.try_into().ok()?;
    VerifyingKey::from_bytes(&bytes).ok()
}

/// Check whether any candidate key verifies the signature over `message`.
pub(crate) fn any_key_verifies(
    keys: &[VerifyingKey],
    message: &[u8],
    signature: &Signature,
) -> bool {
    keys.iter().any(|key| key.verify(message, signature).is_ok())
}
