//! Slack request signature verification.
//!
//! Slack signs every callback with HMAC-SHA256 over `v0:<timestamp>:<body>`,
//! keyed by the app's signing secret. Comparisons are constant-time.
//!
//! See: <https://api.slack.com/authentication/verifying-requests-from-slack>

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::AppError;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Oldest request accepted, in seconds.
pub const MAX_REQUEST_AGE_SECS: i64 = 5 * 60;

/// Largest body buffered for verification.
const MAX_BODY_BYTES: usize = 1024 * 1024;

const VERSION: &str = "v0";

type HmacSha256 = Hmac<Sha256>;

/// Check `signature` (`v0=<hex>`) against the body signed at `timestamp`.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
) -> Result<(), AppError> {
    let provided = signature
        .strip_prefix("v0=")
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or_else(|| AppError::Unauthorized("Malformed request signature".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid signing secret: {}", e)))?;
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    if constant_time_compare(&expected, &provided) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "Request signature mismatch".to_string(),
        ))
    }
}

/// Verify the Slack headers of a request whose raw body is `body`.
///
/// `now` is the current unix time in seconds.
pub fn verify_request(
    headers: &HeaderMap,
    body: &[u8],
    secret: &str,
    now: i64,
) -> Result<(), AppError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", name)))
    };

    let timestamp = header(TIMESTAMP_HEADER)?;
    let signature = header(SIGNATURE_HEADER)?;

    let sent_at: i64 = timestamp
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid request timestamp".to_string()))?;
    if (now - sent_at).abs() > MAX_REQUEST_AGE_SECS {
        return Err(AppError::Unauthorized(
            "Request timestamp outside the allowed window".to_string(),
        ));
    }

    verify_signature(secret, timestamp, body, signature)
}

/// Middleware rejecting `/slack` requests that are not signed by Slack.
///
/// The body is read to verify it and handed on unchanged.
pub async fn slack_signature_layer(secret: String, request: Request, next: Next) -> Response {
    if !is_slack_path(request.uri().path()) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "failed_to_read_body");
            return AppError::BadRequest("Unable to read request body".to_string()).into_response();
        }
    };

    let now = chrono::Utc::now().timestamp();
    if let Err(e) = verify_request(&parts.headers, &bytes, &secret, now) {
        tracing::warn!(path = %parts.uri.path(), error = %e, "failed_to_verify_request_signature");
        return e.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Whether `path` lives under `/slack` once empty and dot segments are resolved.
fn is_slack_path(path: &str) -> bool {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.first().is_some_and(|s| s.starts_with("slack"))
}

/// Perform constant-time byte comparison.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
