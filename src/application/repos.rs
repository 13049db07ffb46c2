//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::keys::KeyWithRelations;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait KeysRepo: Send + Sync {
    /// Load a live (not soft-deleted) key together with its workspace, key-auth
    /// namespace and API in a single round trip.
    ///
    /// Performs no tenant filtering; callers authorize against the returned workspace.
    async fn find_live_key(&self, key_id: &str) -> Result<Option<KeyWithRelations>, RepoError>;
}
