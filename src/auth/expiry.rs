// JWT expiry evaluation
//
// Only the `exp` claim is interpreted here; no signature verification and no
// other claim is ever read. An undecodable token is treated as expired.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};

/// Decode the expiration time from a JWT access token.
///
/// Extracts the middle segment of the dot-delimited token, decodes it as
/// base64url and reads the `exp` claim (Unix seconds). Returns `None` if the
/// token is malformed in any way: wrong number of segments, invalid base64,
/// invalid JSON, or missing `exp`. Malformation is a recoverable condition,
/// not an error.
pub fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let payload = general_purpose::URL_SAFE_NO_PAD.decode(segments[1]).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&payload).ok()?;
    let exp = claims.get("exp")?.as_i64()?;

    Utc.timestamp_opt(exp, 0).single()
}

/// Check whether a token is expired or will expire within the threshold.
///
/// The threshold (300 seconds by default) avoids issuing a request with a
/// token that expires while the request is in flight. Undecodable tokens are
/// reported as expiring so the caller is forced through a refresh.
pub fn is_expiring_soon(token: &str, threshold_secs: i64) -> bool {
    match decode_expiry(token) {
        None => true,
        Some(exp) => exp - Utc::now() < chrono::Duration::seconds(threshold_secs),
    }
}
