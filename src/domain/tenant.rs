//! Authenticated tenant identity, passed explicitly into every tenant-scoped read.

use std::fmt::{Display, Formatter};

use super::error::DomainError;

const MAX_TENANT_ID_LEN: usize = 256;

/// The tenant the current request was authenticated as.
///
/// Only the authentication layer constructs this; handlers receive it from request
/// extensions and never from route or query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantContext {
    tenant_id: String,
}

impl TenantContext {
    pub fn new(tenant_id: impl Into<String>) -> Result<Self, DomainError> {
        let tenant_id = tenant_id.into();
        if tenant_id.trim().is_empty() {
            return Err(DomainError::validation("tenant id must not be empty"));
        }
        if tenant_id.len() > MAX_TENANT_ID_LEN {
            return Err(DomainError::validation(format!(
                "tenant id exceeds {MAX_TENANT_ID_LEN} bytes"
            )));
        }
        if tenant_id.chars().any(char::is_control) {
            return Err(DomainError::validation(
                "tenant id must not contain control characters",
            ));
        }
        Ok(Self { tenant_id })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

impl Display for TenantContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tenant_id)
    }
}
