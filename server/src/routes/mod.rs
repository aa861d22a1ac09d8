//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two routers share one guard middleware with different denial shapes:
//! the `/api` router answers denied requests with 401 JSON, while the
//! static page fallback redirects to the login entry point. The guard's
//! allow-list keeps login/logout/session-check and the login page open.

pub mod auth;
pub mod records;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::guard::{self, GuardContext};
use crate::state::AppState;

/// Resolve the directory of static page assets.
fn web_dir() -> PathBuf {
    std::env::var("WEB_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("web"))
}

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/check", get(auth::check))
        .route(
            "/api/patients",
            get(records::list_patients).post(records::create_patient),
        )
        .route(
            "/api/patients/{id}",
            get(records::get_patient)
                .put(records::update_patient)
                .delete(records::delete_patient),
        )
        .route("/api/patients/{id}/medicines", post(records::assign_medicine))
        .route(
            "/api/patients/{id}/medicines/{assignment_id}",
            delete(records::remove_assignment),
        )
        .route("/api/patients/{id}/notes", post(records::add_note))
        .route(
            "/api/patients/{id}/notes/{note_id}",
            patch(records::update_note).delete(records::delete_note),
        )
        .route(
            "/api/patients/{id}/handwritten-notes",
            put(records::set_handwritten_notes),
        )
        .route(
            "/api/medicines",
            get(records::list_medicines).post(records::create_medicine),
        )
        .route("/api/medicines/{id}", delete(records::delete_medicine))
        .route("/healthz", get(healthz))
        .layer(axum::middleware::from_fn_with_state(
            GuardContext::api(state.clone()),
            guard::session_guard,
        ))
        .with_state(state.clone());

    let pages = Router::new()
        .fallback_service(ServeDir::new(web_dir()).append_index_html_on_directories(true))
        .layer(axum::middleware::from_fn_with_state(
            GuardContext::page(state),
            guard::session_guard,
        ));

    api.merge(pages).layer(cors).layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
