pub mod master;
pub mod models;
pub mod resolver;
pub mod router;

use sqlx::PgPool;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::registry::TenantRegistry;
use self::resolver::PoolResolver;
use self::router::DataSourceRouter;

/// Errors from the connection management layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("No database configuration for: {0}")]
    TenantConfigNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Tenant database names are derived from company codes and must stay
/// within a strict character set to be safe as SQL identifiers.
pub(crate) const TENANT_DB_PREFIX: &str = "tenant_";

pub fn is_valid_tenant_db_name(name: &str) -> bool {
    match name.strip_prefix(TENANT_DB_PREFIX) {
        Some(rest) => {
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

/// Quote a SQL identifier to prevent injection in DDL statements
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

static RESOLVER: OnceLock<Arc<PoolResolver>> = OnceLock::new();
static ROUTER: OnceLock<DataSourceRouter> = OnceLock::new();

/// Process-wide pool resolver, created on first use
pub fn resolver() -> Result<Arc<PoolResolver>, DatabaseError> {
    if let Some(resolver) = RESOLVER.get() {
        return Ok(resolver.clone());
    }
    let registry = TenantRegistry::new(master::master_pool()?);
    let resolver = Arc::new(PoolResolver::new(Arc::new(registry)));
    Ok(RESOLVER.get_or_init(|| resolver).clone())
}

/// Process-wide routing datasource, created on first use
pub fn router() -> Result<DataSourceRouter, DatabaseError> {
    if let Some(router) = ROUTER.get() {
        return Ok(router.clone());
    }
    let router = DataSourceRouter::new(master::master_pool()?, resolver()?);
    Ok(ROUTER.get_or_init(|| router).clone())
}

/// Pool for whatever database the current request is routed to:
/// the active tenant's database, or the master as fallback.
pub async fn active_pool() -> Result<PgPool, DatabaseError> {
    router()?.active_pool().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_tenant_db_names() {
        assert!(is_valid_tenant_db_name("tenant_acme"));
        assert!(is_valid_tenant_db_name("tenant_123_abc"));
        assert!(!is_valid_tenant_db_name("tenant_"));
        assert!(!is_valid_tenant_db_name("hive_master"));
        assert!(!is_valid_tenant_db_name("tenant-acme"));
        assert!(!is_valid_tenant_db_name("tenant_acme; DROP DATABASE"));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_identifier("tenant_acme"), "\"tenant_acme\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
