//! Credential lookup collaborator.
//!
//! Credentials are a small read-only directory: the built-in seed list,
//! optionally replaced by a JSON file named in `USERS_FILE`. Passwords are
//! stored and compared as plaintext exact matches — a known weak point of
//! the system this preserves deliberately (see DESIGN.md); upgrading to
//! hashed storage would change observable error and timing behavior.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::services::session::StorageError;

/// One user the store can authenticate against.
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub username: String,
    pub password: String,
}

/// Read-only username lookup. The core never writes through this trait.
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UserFileError {
    #[error("cannot read users file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse users file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory user directory.
#[derive(Debug)]
pub struct UserDirectory {
    users: Vec<Credential>,
}

impl UserDirectory {
    /// The seeded clinic accounts.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            users: vec![
                Credential { id: 1, username: "admin".into(), password: "password123".into() },
                Credential { id: 2, username: "doctor".into(), password: "medic2024".into() },
            ],
        }
    }

    /// Load a directory from a JSON array of credentials.
    ///
    /// # Errors
    ///
    /// `UserFileError` when the file is unreadable or not valid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self, UserFileError> {
        let raw = std::fs::read_to_string(path)?;
        let users: Vec<Credential> = serde_json::from_str(&raw)?;
        Ok(Self { users })
    }

    /// Directory from `USERS_FILE` if set and loadable, the built-in seed
    /// otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var("USERS_FILE") else {
            return Self::builtin();
        };
        match Self::from_json_file(Path::new(&path)) {
            Ok(directory) => directory,
            Err(e) => {
                warn!(error = %e, path, "users file unusable; falling back to built-in accounts");
                Self::builtin()
            }
        }
    }
}

#[async_trait]
impl CredentialLookup for UserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StorageError> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
