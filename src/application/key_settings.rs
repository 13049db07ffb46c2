//! Tenant-scoped loading of a single key for its settings page.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::repos::{KeysRepo, RepoError};
use crate::domain::keys::KeyWithRelations;
use crate::domain::tenant::TenantContext;

const LOAD_METRIC: &str = "keydash_key_settings_load_total";

#[derive(Debug, Error)]
pub enum KeyAccessError {
    /// Unknown, soft-deleted or owned by another tenant. Callers must not tell these apart.
    #[error("key not found")]
    NotFound,
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for KeyAccessError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound,
            other => Self::Repo(other),
        }
    }
}

#[derive(Clone)]
pub struct KeySettingsService {
    repo: Arc<dyn KeysRepo>,
}

impl KeySettingsService {
    pub fn new(repo: Arc<dyn KeysRepo>) -> Self {
        Self { repo }
    }

    /// Load a live key owned by `tenant`.
    ///
    /// Missing keys, soft-deleted keys and keys belonging to other tenants all fail
    /// with [`KeyAccessError::NotFound`].
    pub async fn load(
        &self,
        tenant: &TenantContext,
        key_id: &str,
    ) -> Result<KeyWithRelations, KeyAccessError> {
        let outcome = self.load_inner(tenant, key_id).await;

        match &outcome {
            Ok(_) => {
                counter!(LOAD_METRIC, "outcome" => "found").increment(1);
                debug!(
                    target = "keydash::key_settings",
                    key_id = key_id,
                    "key settings loaded"
                );
            }
            Err(KeyAccessError::NotFound) => {
                counter!(LOAD_METRIC, "outcome" => "not_found").increment(1);
                debug!(
                    target = "keydash::key_settings",
                    key_id = key_id,
                    "key settings unavailable"
                );
            }
            Err(KeyAccessError::Repo(err)) => {
                counter!(LOAD_METRIC, "outcome" => "error").increment(1);
                warn!(
                    target = "keydash::key_settings",
                    key_id = key_id,
                    error = %err,
                    "key settings lookup failed"
                );
            }
        }

        outcome
    }

    async fn load_inner(
        &self,
        tenant: &TenantContext,
        key_id: &str,
    ) -> Result<KeyWithRelations, KeyAccessError> {
        if !is_well_formed_key_id(key_id) {
            return Err(KeyAccessError::NotFound);
        }

        let Some(found) = self.repo.find_live_key(key_id).await? else {
            return Err(KeyAccessError::NotFound);
        };

        // The repository filters deleted rows already; re-checking keeps this closed
        // against adapters that do not.
        if !found.key.is_live() || !found.workspace.is_owned_by(tenant.tenant_id()) {
            return Err(KeyAccessError::NotFound);
        }

        Ok(found)
    }
}

/// Blank ids and ids with control characters (NUL included) can never name a stored key.
fn is_well_formed_key_id(key_id: &str) -> bool {
    !key_id.trim().is_empty() && !key_id.chars().any(char::is_control)
}
