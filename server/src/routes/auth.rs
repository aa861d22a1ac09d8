//! Auth routes — login, logout, session check.
//!
//! These three endpoints are on the guard's allow-list, so each does its
//! own token handling: login issues the cookie, logout revokes and clears
//! it unconditionally, and check validates whatever token the client
//! still carries, clearing it when it is no longer good.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use time::Duration;
use tracing::{error, warn};

use crate::guard;
use crate::services::session::AuthError;
use crate::state::AppState;

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((guard::SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(cookie_secure())
        .max_age(max_age)
        .build()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/auth/login` — check credentials, set the session cookie.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    if body.username.is_empty() || body.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Username and password are required" })),
        )
            .into_response();
    }

    match state.sessions.authenticate(&body.username, &body.password).await {
        Ok(record) => {
            let jar = CookieJar::new().add(session_cookie(record.token, state.sessions.ttl()));
            (jar, Json(json!({ "success": true, "username": record.username }))).into_response()
        }
        Err(e @ AuthError::Unavailable(_)) => {
            error!(error = %e, "login failed: session store unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
        // The store's message is surfaced verbatim.
        Err(e) => (StatusCode::UNAUTHORIZED, Json(json!({ "error": e.to_string() }))).into_response(),
    }
}

/// `POST /api/auth/logout` — revoke the session, clear the cookie. Always
/// succeeds, even when no session existed.
pub async fn logout(State(state): State<AppState>, jar: CookieJar, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = guard::extract_token(&jar, &headers) {
        if let Err(e) = state.sessions.revoke(&token).await {
            warn!(error = %e, "logout revoke failed; clearing cookie anyway");
        }
    }
    let jar = CookieJar::new().add(guard::expired_session_cookie());
    (jar, Json(json!({ "success": true })))
}

/// `GET /api/auth/check` — report whether the carried token is still a
/// live session, clearing it client-side when it is not.
pub async fn check(State(state): State<AppState>, jar: CookieJar, headers: HeaderMap) -> Response {
    let Some(token) = guard::extract_token(&jar, &headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "No session found" })),
        )
            .into_response();
    };

    match state.sessions.validate(&token).await {
        Ok(record) => Json(json!({
            "authenticated": true,
            "username": record.username,
            "userId": record.user_id,
        }))
        .into_response(),
        Err(e @ AuthError::Unavailable(_)) => {
            error!(error = %e, "session check failed: session store unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
        Err(e) => {
            let jar = CookieJar::new().add(guard::expired_session_cookie());
            (StatusCode::UNAUTHORIZED, jar, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
