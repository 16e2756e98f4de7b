//! Opaque session ids and the session-cookie extractor.

use std::fmt;

use axum::extract::FromRequestParts;
use axum_extra::extract::cookie::CookieJar;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use http::StatusCode;
use http::request::Parts;
use rand::RngExt;

use crate::cookie::session_id_from_jar;

/// Random bytes per session id (256 bits).
const SESSION_ID_BYTES: usize = 32;

/// Encoded length of a session id: 32 bytes in unpadded base64url.
const SESSION_ID_LEN: usize = 43;

/// Opaque, unguessable session identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let bytes: [u8; SESSION_ID_BYTES] = rand::rng().random();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Accepts only values this module could have produced.
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = value.len() == SESSION_ID_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        well_formed.then(|| Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session id read from the `matrimony_sid` cookie.
///
/// Returns 401 if the cookie is absent or malformed. Whether the session is
/// authenticated is decided by the auth service, not by this extractor.
#[derive(Debug, Clone)]
pub struct SessionCookie(pub SessionId);

impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 declares `fn -> impl Future + Send`; read the headers synchronously
    // and hand back a 'static future.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let id = session_id_from_jar(&CookieJar::from_headers(&parts.headers));

        async move { id.map(Self).ok_or(StatusCode::UNAUTHORIZED) }
    }
}
