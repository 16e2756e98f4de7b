//! Cookie builders for the server-side session id.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::session::SessionId;

/// Cookie name for the session id.
pub const MATRIMONY_SESSION: &str = "matrimony_sid";

/// Session lifetime in seconds (7 days). Used for both the cookie Max-Age and the
/// server-side session row expiry.
pub const SESSION_TTL_SECS: i64 = 604800;

/// Attributes applied to every session cookie this service writes.
#[derive(Debug, Clone)]
pub struct SessionCookieConfig {
    /// Domain attribute. `None` leaves the cookie host-only.
    pub domain: Option<String>,
    pub secure: bool,
    pub ttl_secs: i64,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            domain: None,
            secure: true,
            ttl_secs: SESSION_TTL_SECS,
        }
    }
}

impl SessionCookieConfig {
    fn build_cookie(&self, value: String, max_age: Duration) -> Cookie<'static> {
        let builder = Cookie::build((MATRIMONY_SESSION, value))
            .path("/")
            .max_age(max_age)
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax);
        match &self.domain {
            Some(domain) => builder.domain(domain.clone()).build(),
            None => builder.build(),
        }
    }
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use matrimony_auth_types::cookie::{set_session_cookie, SessionCookieConfig, MATRIMONY_SESSION};
/// use matrimony_auth_types::session::SessionId;
///
/// let config = SessionCookieConfig {
///     domain: Some("example.com".to_string()),
///     ..SessionCookieConfig::default()
/// };
/// let id = SessionId::generate();
/// let jar = set_session_cookie(CookieJar::new(), &id, &config);
/// let cookie = jar.get(MATRIMONY_SESSION).unwrap();
/// assert_eq!(cookie.value(), id.as_str());
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(
    jar: CookieJar,
    id: &SessionId,
    config: &SessionCookieConfig,
) -> CookieJar {
    let max_age = Duration::seconds(config.ttl_secs);
    let cookie = config.build_cookie(id.as_str().to_owned(), max_age);
    jar.add(cookie)
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use matrimony_auth_types::cookie::{
///     clear_session_cookie, set_session_cookie, SessionCookieConfig, MATRIMONY_SESSION,
/// };
/// use matrimony_auth_types::session::SessionId;
///
/// let config = SessionCookieConfig::default();
/// let jar = set_session_cookie(CookieJar::new(), &SessionId::generate(), &config);
/// let jar = clear_session_cookie(jar, &config);
/// let cookie = jar.get(MATRIMONY_SESSION).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookie(jar: CookieJar, config: &SessionCookieConfig) -> CookieJar {
    let cookie = config.build_cookie(String::new(), Duration::ZERO);
    jar.add(cookie)
}

/// Read a well-formed session id from the jar, if any.
pub fn session_id_from_jar(jar: &CookieJar) -> Option<SessionId> {
    jar.get(MATRIMONY_SESSION)
        .and_then(|c| SessionId::parse(c.value()))
}

/// Reuse the caller's session id or mint a new one, and (re)issue the cookie so its
/// Max-Age slides forward.
pub fn ensure_session(jar: CookieJar, config: &SessionCookieConfig) -> (CookieJar, SessionId) {
    let id = session_id_from_jar(&jar).unwrap_or_else(SessionId::generate);
    let jar = set_session_cookie(jar, &id, config);
    (jar, id)
}
