mod db;
mod guard;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::services::records::RecordStore;
use crate::services::session::{MemorySessionBackend, SessionBackend, SessionStore, spawn_sweep_task};
use crate::services::users::UserDirectory;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    // Session backend: Postgres when configured, in-memory otherwise.
    let backend: Arc<dyn SessionBackend> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = db::init_pool(&url).await.expect("database init failed");
            tracing::info!("sessions backed by postgres");
            Arc::new(db::PgSessionBackend::new(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; sessions are in-memory and lost on restart");
            Arc::new(MemorySessionBackend::new())
        }
    };

    let users = Arc::new(UserDirectory::from_env());
    let sessions = SessionStore::new(backend, users);
    let records = RecordStore::with_default_medicines();
    let state = state::AppState::new(sessions.clone(), records);

    // Background sweep bounds session-table growth; validation does not
    // depend on it (expiry is checked lazily per request).
    let _sweeper = spawn_sweep_task(sessions);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "medtrack listening");
    axum::serve(listener, app).await.expect("server failed");
}
