//! Session lifecycle: issuance, validation, lazy expiry, revocation.
//!
//! ARCHITECTURE
//! ============
//! `SessionStore` is an explicit instance passed to the guard and the auth
//! handlers; the backing table lives behind the injected [`SessionBackend`]
//! (in-memory for tests and DB-less deployments, Postgres in production).
//! Each backend call is an independent transaction — no multi-step
//! operation holds locks across requests.
//!
//! TRADE-OFFS
//! ==========
//! Expiry is lazy: `validate` deletes an expired record when it meets one,
//! and a periodic sweep bounds table growth. A record swept between a read
//! and its use is simply "no longer valid" — callers re-validate on every
//! request and never cache a session across requests.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::Rng;
use time::{Duration, OffsetDateTime};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::services::users::CredentialLookup;

const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Server-side proof of a successful login. Immutable once created:
/// expiry is a deletion, never a field update.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Opaque unguessable token, unique among live records.
    pub token: String,
    pub username: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Backing-store failure. The guard treats this as Denied (fail closed).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Session-level failures. All recoverable at the request level: they map
/// to a 401 or a redirect, never a crash.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("No session found")]
    NoSession,
    #[error("Invalid session")]
    NotFound,
    #[error("Session expired")]
    Expired,
    #[error("session store unavailable: {0}")]
    Unavailable(#[from] StorageError),
}

// =============================================================================
// BACKEND
// =============================================================================

/// Storage operations behind the session store. Implementations must keep
/// concurrent calls safe without corrupting token uniqueness; `sweep` may
/// run concurrently with any other operation.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn insert(&self, record: SessionRecord) -> Result<(), StorageError>;
    async fn fetch(&self, token: &str) -> Result<Option<SessionRecord>, StorageError>;
    /// Remove a record; `Ok(false)` when it was already gone.
    async fn remove(&self, token: &str) -> Result<bool, StorageError>;
    /// Delete every record with `expires_at < cutoff`, returning the count.
    async fn sweep(&self, cutoff: OffsetDateTime) -> Result<u64, StorageError>;
}

/// Mutex-guarded map backend for tests and DB-less deployments.
pub struct MemorySessionBackend {
    records: Mutex<HashMap<String, SessionRecord>>,
}

impl MemorySessionBackend {
    #[must_use]
    pub fn new() -> Self {
        Self { records: Mutex::new(HashMap::new()) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for MemorySessionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn insert(&self, record: SessionRecord) -> Result<(), StorageError> {
        self.lock().insert(record.token.clone(), record);
        Ok(())
    }

    async fn fetch(&self, token: &str) -> Result<Option<SessionRecord>, StorageError> {
        Ok(self.lock().get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<bool, StorageError> {
        Ok(self.lock().remove(token).is_some())
    }

    async fn sweep(&self, cutoff: OffsetDateTime) -> Result<u64, StorageError> {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|_, record| record.expires_at >= cutoff);
        Ok((before - records.len()) as u64)
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Issues, validates, and expires session records.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    users: Arc<dyn CredentialLookup>,
    ttl: Duration,
}

impl SessionStore {
    /// Build a store with the TTL from `SESSION_TTL_SECS` (default 24 h).
    #[must_use]
    pub fn new(backend: Arc<dyn SessionBackend>, users: Arc<dyn CredentialLookup>) -> Self {
        let ttl_secs = env_parse("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS);
        Self::with_ttl(backend, users, Duration::seconds(ttl_secs))
    }

    #[must_use]
    pub fn with_ttl(backend: Arc<dyn SessionBackend>, users: Arc<dyn CredentialLookup>, ttl: Duration) -> Self {
        Self { backend, users, ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check credentials and issue a session.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` on any mismatch; `Unavailable` when the
    /// credential or session backend fails.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SessionRecord, AuthError> {
        self.authenticate_at(username, password, OffsetDateTime::now_utc()).await
    }

    /// Internal: authenticate with an explicit clock (for testing).
    pub(crate) async fn authenticate_at(
        &self,
        username: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<SessionRecord, AuthError> {
        let Some(credential) = self.users.find_by_username(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if credential.password != password {
            return Err(AuthError::InvalidCredentials);
        }

        let record = SessionRecord {
            token: generate_token(),
            username: credential.username,
            user_id: credential.id,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.backend.insert(record.clone()).await?;
        info!(username = %record.username, "session created");
        Ok(record)
    }

    /// Look up a token and check expiry. An expired record is deleted on
    /// sight (lazy expiry).
    ///
    /// # Errors
    ///
    /// `NoSession` for an empty token, `NotFound` for an unknown one,
    /// `Expired` past the deadline, `Unavailable` on backend failure.
    pub async fn validate(&self, token: &str) -> Result<SessionRecord, AuthError> {
        self.validate_at(token, OffsetDateTime::now_utc()).await
    }

    /// Internal: validate with an explicit clock (for testing).
    pub(crate) async fn validate_at(&self, token: &str, now: OffsetDateTime) -> Result<SessionRecord, AuthError> {
        if token.is_empty() {
            return Err(AuthError::NoSession);
        }
        let Some(record) = self.backend.fetch(token).await? else {
            return Err(AuthError::NotFound);
        };
        if now > record.expires_at {
            self.backend.remove(token).await?;
            info!(username = %record.username, "expired session discarded");
            return Err(AuthError::Expired);
        }
        Ok(record)
    }

    /// Delete a session. Idempotent: revoking an absent token succeeds.
    ///
    /// # Errors
    ///
    /// Only on backend failure.
    pub async fn revoke(&self, token: &str) -> Result<(), StorageError> {
        self.backend.remove(token).await?;
        Ok(())
    }

    /// Delete every expired record, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Only on backend failure.
    pub async fn sweep_expired(&self) -> Result<u64, StorageError> {
        self.sweep_expired_at(OffsetDateTime::now_utc()).await
    }

    /// Internal: sweep with an explicit clock (for testing).
    pub(crate) async fn sweep_expired_at(&self, now: OffsetDateTime) -> Result<u64, StorageError> {
        self.backend.sweep(now).await
    }
}

// =============================================================================
// SWEEP TASK
// =============================================================================

/// Spawn the periodic expiry sweep. Returns a handle for shutdown.
pub fn spawn_sweep_task(store: SessionStore) -> JoinHandle<()> {
    let interval_secs: u64 = env_parse("SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS);
    info!(interval_secs, "session sweep configured");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(interval_secs)).await;
            match store.sweep_expired().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "swept expired sessions"),
                Err(e) => error!(error = %e, "session sweep failed"),
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
