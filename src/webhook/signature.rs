//! Verifies the svix signatures the identity provider attaches to webhook requests.
//!
//! The signed content is `"{svix-id}.{svix-timestamp}.{body}"`, signed with
//! HMAC-SHA256 using the base64 decoded part of the `whsec_` secret. The
//! `svix-signature` header holds one or more space separated `v1,<base64>`
//! signatures, and the request is accepted if any of them match.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::{Duration, OffsetDateTime};

use crate::Error;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// How far the webhook timestamp may be from the current time.
pub const TIMESTAMP_TOLERANCE: Duration = Duration::minutes(5);

/// The svix headers sent with each webhook.
#[derive(Debug, Clone, Copy)]
pub struct WebhookHeaders<'a> {
    /// The unique message ID, `svix-id`.
    pub id: &'a str,
    /// Seconds since the Unix epoch, `svix-timestamp`.
    pub timestamp: &'a str,
    /// The space separated signatures, `svix-signature`.
    pub signature: &'a str,
}

/// Decode the HMAC key from a `whsec_` prefixed secret.
///
/// The prefix is optional.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, Error> {
    let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);

    STANDARD
        .decode(encoded)
        .map_err(|error| Error::InvalidWebhookSecret(error.to_string()))
}

fn new_mac(key: &[u8], headers: &WebhookHeaders, payload: &str) -> Result<HmacSha256, Error> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|error| Error::InvalidWebhookSecret(error.to_string()))?;

    mac.update(headers.id.as_bytes());
    mac.update(b".");
    mac.update(headers.timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());

    Ok(mac)
}

/// Sign `payload` the way the identity provider does, returning the base64 signature.
pub fn sign(key: &[u8], headers: &WebhookHeaders, payload: &str) -> Result<String, Error> {
    let mac = new_mac(key, headers, payload)?;

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Check that the webhook was signed with `secret` and was sent close to `now`.
///
/// # Errors
/// Returns [Error::InvalidWebhookSecret] if `secret` cannot be decoded, or
/// [Error::InvalidWebhookSignature] if the timestamp is out of range or no
/// signature matches.
pub fn verify(
    secret: &str,
    headers: &WebhookHeaders,
    payload: &str,
    now: OffsetDateTime,
) -> Result<(), Error> {
    let key = decode_secret(secret)?;

    let timestamp = headers
        .timestamp
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .ok_or_else(|| {
            Error::InvalidWebhookSignature(format!("invalid timestamp \"{}\"", headers.timestamp))
        })?;

    if (now - timestamp).abs() > TIMESTAMP_TOLERANCE {
        return Err(Error::InvalidWebhookSignature(format!(
            "timestamp {timestamp} is too far from the current time"
        )));
    }

    let is_match = headers
        .signature
        .split_whitespace()
        .filter_map(|entry| entry.split_once(','))
        .filter(|(version, _)| *version == SIGNATURE_VERSION)
        .filter_map(|(_, signature)| STANDARD.decode(signature).ok())
        .any(|signature| {
            // `verify_slice` compares in constant time.
            new_mac(&key, headers, payload)
                .map(|mac| mac.verify_slice(&signature).is_ok())
                .unwrap_or(false)
        });

    if is_match {
        Ok(())
    } else {
        Err(Error::InvalidWebhookSignature(
            "no matching signature".to_owned(),
        ))
    }
}
