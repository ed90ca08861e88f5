//! Provider API clients
//!
//! Two endpoints matter for liveness checking: `/share/verify` exchanges
//! an extraction code for a short-lived session token, and `/share/list`
//! is the authoritative "does this share still resolve" probe. Both mimic
//! the requests a browser issues from the share page, including the
//! referrer the provider's anti-hotlinking check requires.

use crate::checker::CheckFailure;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Fixed query-parameter set the listing endpoint expects: pagination,
/// ordering, view-mode flags, and API version markers. The `web` key is
/// genuinely sent twice.
const LISTING_PARAMS: &[(&str, &str)] = &[
    ("web", "5"),
    ("app_id", "250528"),
    ("desc", "1"),
    ("showempty", "0"),
    ("page", "1"),
    ("num", "20"),
    ("order", "time"),
    ("root", "1"),
    ("view_mode", "1"),
    ("channel", "chunlei"),
    ("web", "1"),
    ("clienttype", "0"),
];

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE_VALUE: &str = "zh,en-GB;q=0.9,en-US;q=0.8,en;q=0.7,zh-CN;q=0.6";

/// Loosely-typed provider response; `code == 0` means success, everything
/// else is a provider-defined failure class
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderResponse {
    pub errno: i64,

    /// The provider is inconsistent about which field name carries the
    /// message
    #[serde(default, alias = "err_msg")]
    pub errmsg: String,
}

/// Exchanges an extraction code for a session token.
///
/// Sends the form-encoded verification request with the original share URL
/// as referrer. A numeric `errno` of zero with a non-empty `randsk` field
/// is the only success shape; a successful code without the token is a
/// distinct failure, and the listing call is never attempted with a
/// substitute token.
pub async fn verify_extraction_code(
    client: &Client,
    origin: &str,
    share_url: &Url,
    short_id: &str,
    code: &str,
) -> Result<String, CheckFailure> {
    let endpoint = format!("{}/share/verify", origin);
    let response = client
        .post(&endpoint)
        .query(&[("surl", short_id), ("pwd", code)])
        .header(header::ACCEPT, ACCEPT_VALUE)
        .header(header::REFERER, share_url.as_str())
        .form(&[("pwd", code), ("vcode", ""), ("vcode_str", "")])
        .send()
        .await
        .map_err(transport_failure)?;

    let body = response.bytes().await.map_err(transport_failure)?;
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| CheckFailure::VerificationFailed(format!("invalid response body: {}", e)))?;

    // Any non-zero, missing, or non-numeric code is a rejection
    let errno = value.get("errno").and_then(Value::as_i64);
    if errno != Some(0) {
        let code_text = errno.map_or_else(|| "missing".to_string(), |n| n.to_string());
        return Err(CheckFailure::VerificationFailed(format!(
            "errno {}: {}",
            code_text,
            provider_message(&value)
        )));
    }

    match value.get("randsk").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(CheckFailure::MalformedVerificationResponse),
    }
}

/// Issues the authoritative listing probe.
///
/// The session token, when present, rides along as the `BDCLND` cookie the
/// provider expects for password-gated shares.
pub async fn fetch_share_listing(
    client: &Client,
    origin: &str,
    share_url: &Url,
    short_id: &str,
    session_token: Option<&str>,
) -> Result<ProviderResponse, CheckFailure> {
    let endpoint = format!("{}/share/list", origin);
    let mut request = client
        .get(&endpoint)
        .query(LISTING_PARAMS)
        .query(&[("shorturl", short_id)])
        .header(header::ACCEPT, ACCEPT_VALUE)
        .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
        .header(header::CONNECTION, "keep-alive")
        .header(header::REFERER, share_url.as_str());

    if let Some(token) = session_token {
        request = request.header(header::COOKIE, format!("BDCLND={}", token));
    }

    let response = request.send().await.map_err(transport_failure)?;
    let body = response.bytes().await.map_err(transport_failure)?;
    decode_provider_response(&body)
}

/// Decodes a listing body as two ordered attempts: a strict decode into
/// [`ProviderResponse`], then a permissive object decode that projects
/// only the `errno`/`errmsg` fields, defaulting each to empty/zero.
///
/// The provider returns partial or oddly-typed JSON under load; a body
/// that still carries a readable code should not count as a dead link.
fn decode_provider_response(body: &[u8]) -> Result<ProviderResponse, CheckFailure> {
    if let Ok(response) = serde_json::from_slice::<ProviderResponse>(body) {
        return Ok(response);
    }

    let object: serde_json::Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| CheckFailure::UnparsableResponse(e.to_string()))?;

    Ok(ProviderResponse {
        errno: object.get("errno").and_then(Value::as_i64).unwrap_or(0),
        errmsg: object
            .get("errmsg")
            .and_then(Value::as_str)
            .or_else(|| object.get("err_msg").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string(),
    })
}

/// Picks the message out of a loosely-typed body, whichever field carries it
fn provider_message(value: &Value) -> &str {
    value
        .get("errmsg")
        .and_then(Value::as_str)
        .or_else(|| value.get("err_msg").and_then(Value::as_str))
        .unwrap_or("unknown error")
}

/// Classifies a reqwest transport error
fn transport_failure(error: reqwest::Error) -> CheckFailure {
    let detail = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };
    CheckFailure::NetworkFailure(detail)
}
