//! Owner-token cookies.
//!
//! Each browser session gets an opaque token `hex(id):hex(sig)` where
//! `sig = HMAC-SHA256(key, id)`. The token only correlates records to a
//! session; it carries no identity and equality is the whole auth model.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_COOKIE: &str = "token";

// Fixed signing key; rotating it orphans every session's links.
const SIGNING_KEY: &[u8] = b"shortwave owner token key";

/// Mints a fresh signed owner token.
pub fn issue_token() -> String {
    let id: [u8; 16] = rand::random();
    let id = hex::encode(id);
    let sig = sign(&id);
    format!("{id}:{sig}")
}

/// Checks that a token's signature matches its id part.
pub fn verify_token(value: &str) -> bool {
    let Some((id, sig)) = value.split_once(':') else {
        return false;
    };
    let Ok(raw) = hex::decode(sig) else {
        return false;
    };

    let mut mac = mac();
    mac.update(id.as_bytes());
    mac.verify_slice(&raw).is_ok()
}

/// Extracts the verified owner token from the request cookies, if any.
pub fn owner_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == TOKEN_COOKIE && verify_token(value)).then(|| value.to_owned())
    })
}

/// Renders a token as a `Set-Cookie` value. Tokens are hex-and-colon
/// strings, so the conversion cannot fail in practice.
pub fn token_cookie(token: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{TOKEN_COOKIE}={token}; Path=/")).ok()
}

fn sign(id: &str) -> String {
    let mut mac = mac();
    mac.update(id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn mac() -> HmacSha256 {
    // HMAC accepts keys of any length.
    HmacSha256::new_from_slice(SIGNING_KEY).expect("static hmac key")
}
