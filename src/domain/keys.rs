//! Domain types for keys and the ownership chain they hang off.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;
use time::OffsetDateTime;

/// How often a key's remaining quota is topped back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillInterval {
    Daily,
    Monthly,
}

impl RefillInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Monthly => "Monthly",
        }
    }

    pub fn all() -> &'static [RefillInterval] {
        &[Self::Daily, Self::Monthly]
    }
}

impl Display for RefillInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown refill interval `{0}`")]
pub struct UnknownRefillInterval(pub String);

impl FromStr for RefillInterval {
    type Err = UnknownRefillInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            other => Err(UnknownRefillInterval(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRefill {
    pub interval: RefillInterval,
    pub amount: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRatelimit {
    pub limit: i32,
    pub duration_ms: i64,
    /// Async limits are enforced on a best-effort basis at the edge.
    pub asynchronous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyRecord {
    pub id: String,
    pub key_auth_id: String,
    pub workspace_id: String,
    /// Visible prefix of the secret, shown so operators can recognise a key.
    pub start: String,
    pub name: Option<String>,
    pub owner_id: Option<String>,
    /// Raw metadata document as stored; usually JSON.
    pub meta: Option<String>,
    pub created_at: OffsetDateTime,
    pub expires: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
    pub enabled: bool,
    pub remaining: Option<i32>,
    pub refill: Option<KeyRefill>,
    pub ratelimit: Option<KeyRatelimit>,
}

impl KeyRecord {
    /// A key is live until it is soft-deleted.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        matches!(self.expires, Some(expires) if expires <= now)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceRecord {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
}

impl WorkspaceRecord {
    pub fn is_owned_by(&self, tenant_id: &str) -> bool {
        self.tenant_id == tenant_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyAuthRecord {
    pub id: String,
    pub api: ApiRecord,
}

/// A key hydrated with its workspace and its key-auth namespace (and that namespace's API).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyWithRelations {
    pub key: KeyRecord,
    pub workspace: WorkspaceRecord,
    pub key_auth: KeyAuthRecord,
}
