//! Anonymous session identity carried in a cookie.
//!
//! Every decision about trusting the session cookie lives in this module.
//! A session is just an opaque token: the server never stores it apart from
//! the `session_id` column on transactions, and the mere presence of the
//! cookie is enough to act as that session. The client is trusted to expire
//! the cookie after [SESSION_DURATION].

use std::fmt::Display;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::Error;

/// The name of the cookie holding the session token.
pub const COOKIE_SESSION_ID: &str = "sessionId";

/// How long the client should keep the session cookie.
pub const SESSION_DURATION: Duration = Duration::days(7);

/// The opaque token identifying an anonymous session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session ID from a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Mint a new, random session ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Get the session ID from the session cookie in `jar`, if there is one.
///
/// A cookie with an empty value is treated as absent.
pub fn resolve_session(jar: &CookieJar) -> Option<SessionId> {
    jar.get(COOKIE_SESSION_ID)
        .map(|cookie| cookie.value_trimmed())
        .filter(|token| !token.is_empty())
        .map(SessionId::new)
}

/// Start a new session by minting a session ID and adding its cookie to `jar`.
///
/// Returns the updated cookie jar and the new session ID.
pub fn start_session(jar: CookieJar) -> (CookieJar, SessionId) {
    let session_id = SessionId::generate();

    let jar = jar.add(
        Cookie::build((COOKIE_SESSION_ID, session_id.to_string()))
            .path("/")
            .max_age(SESSION_DURATION)
            .http_only(true)
            .same_site(SameSite::Lax),
    );

    (jar, session_id)
}

/// Get the caller's session, starting a new one if the request did not carry
/// a session cookie.
///
/// Returns the cookie jar, with the new session cookie added if one was
/// started, and the session ID.
pub fn resolve_or_start_session(jar: CookieJar) -> (CookieJar, SessionId) {
    match resolve_session(&jar) {
        Some(session_id) => (jar, session_id),
        None => {
            let (jar, session_id) = start_session(jar);
            tracing::debug!("Started new session.");
            (jar, session_id)
        }
    }
}

/// Middleware function that requires a session cookie.
///
/// The session ID is placed into the request extensions and the request
/// executed normally if the cookie is present, otherwise a 401 Unauthorized
/// response is returned and the route handler is never called.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session_id): Extension<SessionId>` to receive the session ID.
pub async fn session_guard(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let Some(session_id) = resolve_session(&jar) else {
        tracing::debug!(
            "Rejected request to {} without a session cookie.",
            request.uri().path()
        );
        return Error::MissingSession.into_response();
    };

    request.extensions_mut().insert(session_id);

    next.run(request).await
}
