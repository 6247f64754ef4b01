//! Cookie-backed sessions.
//!
//! [`session_middleware`] makes sure every request carries a [`SessionId`]:
//! it accepts a correctly signed `tunecraft_session` cookie, and otherwise
//! mints a new session and sets the cookie on the response. Handlers read
//! the id with the [`CurrentSession`] extractor.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use tunecraft_core::SessionId;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "tunecraft_session";

/// Resolve or create the request's session.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.signer.verify(cookie.value()));

    let (session, is_new) = match existing {
        Some(session) => (session, false),
        None => (SessionId::generate(), true),
    };

    if is_new {
        tracing::debug!(session = %session, "Issuing new session");
    }

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    if !is_new {
        return response;
    }

    let cookie = Cookie::build((SESSION_COOKIE, state.signer.token_for(&session)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (jar.add(cookie), response).into_response()
}

/// The session attached to the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentSession(pub SessionId);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionId>()
            .copied()
            .map(Self)
            .ok_or_else(|| ApiError::Internal("session middleware not installed".into()))
    }
}
