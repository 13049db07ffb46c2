//! Tenant resolution for dashboard routes.
//!
//! The dashboard sits behind an authenticating proxy that writes the signed-in tenant
//! into a request header after stripping any client-supplied copy. This middleware turns
//! that header into a [`TenantContext`] extension for handlers; route parameters and
//! query strings are never consulted.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, Request, StatusCode, header::InvalidHeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{application::error::HttpError, domain::tenant::TenantContext};

const SOURCE: &str = "infra::http::tenant::resolve_tenant";

#[derive(Debug, Clone)]
pub struct TenantResolver {
    header: HeaderName,
}

impl TenantResolver {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    pub fn from_header_name(name: &str) -> Result<Self, InvalidHeaderName> {
        HeaderName::from_bytes(name.as_bytes()).map(Self::new)
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Returns `None` unless exactly one well-formed tenant value is present.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<TenantContext> {
        let mut values = headers.get_all(&self.header).iter();
        let value = values.next()?;
        if values.next().is_some() {
            return None;
        }
        let raw = value.to_str().ok()?;
        match TenantContext::new(raw) {
            Ok(tenant) => Some(tenant),
            Err(err) => {
                debug!(target = "keydash::http::tenant", error = %err, "tenant header rejected");
                None
            }
        }
    }
}

pub async fn resolve_tenant(
    State(resolver): State<TenantResolver>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(tenant) = resolver.resolve(request.headers()) else {
        debug!(
            target = "keydash::http::tenant",
            header = %resolver.header(),
            "request carried no usable tenant"
        );
        return HttpError::new(
            SOURCE,
            StatusCode::UNAUTHORIZED,
            "Authentication required",
            "missing or malformed authenticated tenant header",
        )
        .into_response();
    };

    request.extensions_mut().insert(tenant.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(tenant);
    response
}
