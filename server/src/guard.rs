//! Session guard: the per-request gate in front of every protected route.
//!
//! DESIGN
//! ======
//! Each request moves `Unchecked → {Allowed, Denied}`. Paths on the static
//! allow-list pass without consulting the store. Everything else needs a
//! token — the session cookie, or a fallback header for service-to-service
//! calls — validated against the session store. A valid session attaches
//! `CurrentUser` to the request for downstream handlers.
//!
//! The denial shape is declared where the guard layer is constructed: the
//! API router denies with a 401 JSON body, the page router with a redirect
//! to the login entry point. Storage failure denies too — never fail open.

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::routes::auth::cookie_secure;
use crate::services::session::AuthError;
use crate::state::AppState;

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "session_id";

/// Fallback header for service-to-service calls.
pub const SESSION_HEADER: &str = "x-session-token";

/// Where denied page navigation is sent.
pub const LOGIN_PATH: &str = "/login";

// =============================================================================
// ALLOW-LIST
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum MatchKind {
    Exact,
    Prefix,
}

struct AllowRule {
    pattern: &'static str,
    kind: MatchKind,
}

/// Ordered allow-list: first match wins, default deny. Login, logout, and
/// session-check must stay reachable without a session, as must the login
/// page and static assets.
const ALLOW_LIST: &[AllowRule] = &[
    AllowRule { pattern: "/api/auth/login", kind: MatchKind::Exact },
    AllowRule { pattern: "/api/auth/logout", kind: MatchKind::Exact },
    AllowRule { pattern: "/api/auth/check", kind: MatchKind::Exact },
    AllowRule { pattern: "/login", kind: MatchKind::Prefix },
    AllowRule { pattern: "/healthz", kind: MatchKind::Exact },
    AllowRule { pattern: "/favicon.ico", kind: MatchKind::Exact },
    AllowRule { pattern: "/assets/", kind: MatchKind::Prefix },
];

/// Whether `path` passes the gate without a session.
#[must_use]
pub fn is_public(path: &str) -> bool {
    ALLOW_LIST.iter().any(|rule| match rule.kind {
        MatchKind::Exact => path == rule.pattern,
        MatchKind::Prefix => path.starts_with(rule.pattern),
    })
}

// =============================================================================
// GUARD
// =============================================================================

/// How a denied request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    /// Page navigation: redirect to the login entry point.
    Page,
    /// API call: 401 with a JSON error body.
    Api,
}

/// State handed to the guard layer: the app state plus the declared
/// interface kind of the router the layer wraps.
#[derive(Clone)]
pub struct GuardContext {
    pub state: AppState,
    pub kind: InterfaceKind,
}

impl GuardContext {
    #[must_use]
    pub fn page(state: AppState) -> Self {
        Self { state, kind: InterfaceKind::Page }
    }

    #[must_use]
    pub fn api(state: AppState) -> Self {
        Self { state, kind: InterfaceKind::Api }
    }
}

/// Identity attached to the request after successful validation.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// The middleware itself. Applied per router via
/// `axum::middleware::from_fn_with_state(GuardContext::…, session_guard)`.
pub async fn session_guard(
    State(ctx): State<GuardContext>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = extract_token(&jar, request.headers()) else {
        return denied(ctx.kind, "No session found", false);
    };

    match ctx.state.sessions.validate(&token).await {
        Ok(record) => {
            request
                .extensions_mut()
                .insert(CurrentUser { user_id: record.user_id, username: record.username });
            next.run(request).await
        }
        Err(e) => {
            if matches!(e, AuthError::Unavailable(_)) {
                tracing::error!(error = %e, "session store unavailable; denying request");
            }
            denied(ctx.kind, &e.to_string(), true)
        }
    }
}

/// Pull the session token from the cookie, falling back to the header.
/// Empty values count as absent.
pub(crate) fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_owned());
        }
    }
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// A cookie that instructs the client to drop its session token.
pub(crate) fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

fn denied(kind: InterfaceKind, message: &str, clear_token: bool) -> Response {
    let jar = if clear_token {
        CookieJar::new().add(expired_session_cookie())
    } else {
        CookieJar::new()
    };
    match kind {
        InterfaceKind::Api => (
            StatusCode::UNAUTHORIZED,
            jar,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        InterfaceKind::Page => (jar, Redirect::temporary(LOGIN_PATH)).into_response(),
    }
}
