//! Header-based tenant resolution for unauthenticated endpoints (the
//! login path, where no token exists yet).
//!
//! Reads `X-COMPANY-CODE`, resolves the tenant database through the
//! registry, and runs the remainder of the request inside a tenant
//! context scope. The scope ends when the response future completes,
//! so the context cannot leak into the next request on the same worker.

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::context::TenantContext;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::registry::registry;

pub const COMPANY_CODE_HEADER: &str = "X-COMPANY-CODE";

pub async fn resolve_tenant_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let company_code = headers
        .get(COMPANY_CODE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|code| !code.is_empty());

    let Some(company_code) = company_code else {
        // No header: request proceeds without a tenant scope and data
        // access falls back to the master database
        return Ok(next.run(request).await);
    };

    // An unknown code is rejected before any handler logic runs
    let config = registry()?
        .find_tenant_database(company_code)
        .await
        .map_err(|err| match err {
            DatabaseError::NotFound(_) => ApiError::unauthorized("Invalid company code"),
            other => other.into(),
        })?;

    tracing::debug!(
        "Resolved company code '{}' to database '{}'",
        company_code,
        config.db_name
    );

    Ok(TenantContext::scope(Some(config.db_name), next.run(request)).await)
}
