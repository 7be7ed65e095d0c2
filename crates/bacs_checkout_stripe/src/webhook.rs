// --- File: crates/bacs_checkout_stripe/src/webhook.rs ---
//! Verification of the `Stripe-Signature` header.
//!
//! The header looks like `t=1492774577,v1=5257a8...,v0=6ffbb5...`. The
//! expected `v1` value is the hex HMAC-SHA256 of `"{t}.{raw body}"` keyed
//! with the endpoint's signing secret. Several `v1` entries may be present
//! while a secret is being rolled; any one matching is enough.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::error::StripeError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Parsed form of the signature header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader<'a> {
    timestamp: i64,
    timestamp_raw: &'a str,
    v1_signatures: Vec<&'a str>,
}

fn parse_signature_header(header: &str) -> Result<SignatureHeader<'_>, StripeError> {
    let mut timestamp_raw: Option<&str> = None;
    let mut v1_signatures: Vec<&str> = Vec::new();

    for item in header.split(',') {
        if let Some((key, value)) = item.trim().split_once('=') {
            match key {
                "t" => timestamp_raw = Some(value),
                "v1" => v1_signatures.push(value),
                _ => {} // v0 and future schemes are ignored
            }
        }
    }

    let timestamp_raw = timestamp_raw.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing timestamp 't' in Stripe-Signature".to_string())
    })?;
    let timestamp = timestamp_raw.parse::<i64>().map_err(|_| {
        StripeError::WebhookSignatureError("Invalid timestamp format in Stripe-Signature".to_string())
    })?;

    if v1_signatures.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        timestamp_raw,
        v1_signatures,
    })
}

fn mac_for(secret: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, StripeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verifies the signature of an incoming Stripe webhook request.
///
/// # Arguments
/// * `payload` - The raw request body bytes.
/// * `sig_header` - The value of the `Stripe-Signature` header.
/// * `secret` - The webhook signing secret (whsec_...).
/// * `tolerance_secs` - Maximum age of the signature; `0` disables the check.
/// * `now` - Current unix time in seconds.
pub fn verify_stripe_signature(
    payload: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_secs: u64,
    now: i64,
) -> Result<(), StripeError> {
    let sig_header = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;
    let header = parse_signature_header(sig_header)?;
    debug!(
        "Stripe-Signature t={} with {} v1 signature(s)",
        header.timestamp,
        header.v1_signatures.len()
    );

    // `t` is attacker-controlled; an age that does not fit counts as stale.
    let age = now.checked_sub(header.timestamp).map(i64::unsigned_abs);
    if tolerance_secs > 0 && age.map_or(true, |age| age > tolerance_secs) {
        warn!(
            "Stripe signature timestamp outside tolerance. Now: {}, Event: {}",
            now, header.timestamp
        );
        return Err(StripeError::WebhookSignatureError(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    let mac = mac_for(secret, header.timestamp_raw, payload)?;
    let matched = header.v1_signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        warn!("Stripe signature mismatch: no v1 signature matched the payload");
        Err(StripeError::WebhookSignatureError(
            "No signatures found matching the expected signature for payload".to_string(),
        ))
    }
}

/// Builds a `Stripe-Signature` header value the way Stripe does.
///
/// Used by tests and by local tooling that replays events.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, StripeError> {
    let timestamp = timestamp.to_string();
    let signature = mac_for(secret, &timestamp, payload)?.finalize().into_bytes();
    Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"mandate.updated","data":{"object":{}}}"#;

    #[test]
    fn test_valid_signature() {
        let header = signature_header(SECRET, NOW, PAYLOAD).unwrap();
        assert!(verify_stripe_signature(PAYLOAD, Some(&header), SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn test_missing_header() {
        let err = verify_stripe_signature(PAYLOAD, None, SECRET, 300, NOW).unwrap_err();
        assert!(matches!(err, StripeError::WebhookSignatureError(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = signature_header("whsec_other", NOW, PAYLOAD).unwrap();
        assert!(verify_stripe_signature(PAYLOAD, Some(&header), SECRET, 300, NOW).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = signature_header(SECRET, NOW, PAYLOAD).unwrap();
        let tampered = br#"{"id":"evt_2","type":"mandate.updated","data":{"object":{}}}"#;
        assert!(verify_stripe_signature(tampered, Some(&header), SECRET, 300, NOW).is_err());
    }

    #[test]
    fn test_any_v1_signature_may_match() {
        let good = signature_header(SECRET, NOW, PAYLOAD).unwrap();
        let good_sig = good.split_once(",v1=").unwrap().1;
        let header = format!("t={},v1={},v1={},v0=deadbeef", NOW, "00".repeat(32), good_sig);
        assert!(verify_stripe_signature(PAYLOAD, Some(&header), SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        let header = format!("t={},v1=not-hex", NOW);
        assert!(verify_stripe_signature(PAYLOAD, Some(&header), SECRET, 300, NOW).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let header = signature_header(SECRET, NOW - 301, PAYLOAD).unwrap();
        assert!(verify_stripe_signature(PAYLOAD, Some(&header), SECRET, 300, NOW).is_err());
        // Zero tolerance turns the age check off.
        assert!(verify_stripe_signature(PAYLOAD, Some(&header), SECRET, 0, NOW).is_ok());
    }

    #[test]
    fn test_extreme_timestamps_are_stale_not_fatal() {
        for t in [i64::MIN, i64::MAX, -1] {
            let header = format!("t={},v1=00", t);
            let err = verify_stripe_signature(b"{}", Some(&header), SECRET, 300, NOW).unwrap_err();
            assert!(err.to_string().contains("tolerance"), "t={t}: {err}");
        }

        // Without the age check the header still has to carry a matching signature.
        let header = format!("t={},v1=00", i64::MIN);
        assert!(verify_stripe_signature(b"{}", Some(&header), SECRET, 0, NOW).is_err());
    }

    #[test]
    fn test_header_without_timestamp_or_v1() {
        assert!(parse_signature_header("v1=abcd").is_err());
        assert!(parse_signature_header("t=abc,v1=abcd").is_err());
        assert!(parse_signature_header("t=123,v0=abcd").is_err());

        let parsed = parse_signature_header(" t=123 , v1=ab ,v1=cd").unwrap();
        assert_eq!(parsed.timestamp, 123);
        assert_eq!(parsed.v1_signatures, vec!["ab", "cd"]);
    }
}
