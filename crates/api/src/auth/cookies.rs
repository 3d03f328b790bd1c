//! Session cookies.
//!
//! A token is handed to the browser split in two: `jwt.header.payload`
//! (readable by scripts, so the client can show who is logged in) and
//! `jwt.signature` (`HttpOnly`). A request then authenticates with
//! `Authorization: Bearer <header>.<payload>` and the server reattaches the
//! signature from the cookie.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use inkwell_core::error::CoreError;

use super::jwt::JwtConfig;

/// Cookie holding the first two token segments.
pub const PAYLOAD_COOKIE: &str = "jwt.header.payload";

/// `HttpOnly` cookie holding the token signature.
pub const SIGNATURE_COOKIE: &str = "jwt.signature";

/// Find a cookie value in the request's `Cookie` headers.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Build the two `Set-Cookie` values for a freshly issued token.
pub fn session_cookies(token: &str, config: &JwtConfig) -> Result<[String; 2], CoreError> {
    let (header_payload, signature) = token
        .rsplit_once('.')
        .ok_or_else(|| CoreError::Internal("Issued token has no signature segment".into()))?;

    let mut attributes = format!(
        "Path=/; Max-Age={}; SameSite=Strict",
        config.lifetime_secs()
    );
    if config.cookie_secure {
        attributes.push_str("; Secure");
    }

    Ok([
        format!("{PAYLOAD_COOKIE}={header_payload}; {attributes}"),
        format!("{SIGNATURE_COOKIE}={signature}; {attributes}; HttpOnly"),
    ])
}
