//! Lazy per-tenant connection pool cache.
//!
//! One small pool per tenant database, created on first access and kept
//! for the life of the process. Reads take a shared lock only; creation
//! is serialized per database name, never across names, so two tenants
//! can warm up concurrently while N racing first-accesses for the same
//! name still produce exactly one pool.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};
use tracing::info;

use super::models::TenantDbConfig;
use super::{is_valid_tenant_db_name, DatabaseError};
use crate::config;

/// Where the resolver looks up connection metadata on a cache miss.
/// Implemented by the tenant registry; test doubles stand in for it.
#[async_trait]
pub trait DbConfigSource: Send + Sync {
    async fn db_config_by_name(&self, db_name: &str) -> Result<TenantDbConfig, DatabaseError>;
}

pub struct PoolResolver {
    configs: Arc<dyn DbConfigSource>,
    pools: RwLock<HashMap<String, Arc<OnceCell<PgPool>>>>,
}

impl PoolResolver {
    pub fn new(configs: Arc<dyn DbConfigSource>) -> Self {
        Self {
            configs,
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the pooled connection source for `db_name`, creating and
    /// caching it on first use. An empty name resolves to `None` without
    /// consulting the registry or the cache (caller falls back to master).
    /// A name with no registry config is an error and is never cached, so
    /// a tenant provisioned later resolves normally.
    pub async fn resolve(&self, db_name: &str) -> Result<Option<PgPool>, DatabaseError> {
        if db_name.trim().is_empty() {
            return Ok(None);
        }
        if !is_valid_tenant_db_name(db_name) {
            return Err(DatabaseError::InvalidDatabaseName(db_name.to_string()));
        }

        // Fast path: shared lock only
        let cell = {
            let pools = self.pools.read().await;
            pools.get(db_name).cloned()
        };

        let cell = match cell {
            Some(cell) => cell,
            None => {
                let mut pools = self.pools.write().await;
                pools
                    .entry(db_name.to_string())
                    .or_insert_with(|| Arc::new(OnceCell::new()))
                    .clone()
            }
        };

        // The cell serializes racing initializers for this name; losers
        // wait and receive the winner's pool. No lock is held while the
        // registry is consulted.
        let pool = cell
            .get_or_try_init(|| async {
                let config = self.configs.db_config_by_name(db_name).await?;
                info!("Created connection pool for tenant database: {}", db_name);
                Ok::<PgPool, DatabaseError>(Self::build_pool(&config))
            })
            .await?;

        Ok(Some(pool.clone()))
    }

    /// Drops and closes the cached pool for `db_name`, if any. Only the
    /// onboarding compensation path uses this; routine operation never
    /// evicts.
    pub async fn evict(&self, db_name: &str) {
        let cell = {
            let mut pools = self.pools.write().await;
            pools.remove(db_name)
        };
        if let Some(cell) = cell {
            if let Some(pool) = cell.get() {
                pool.close().await;
                info!("Closed connection pool for tenant database: {}", db_name);
            }
        }
    }

    /// Number of cached pools (created or pending)
    pub async fn cached_count(&self) -> usize {
        self.pools.read().await.len()
    }

    fn build_pool(config: &TenantDbConfig) -> PgPool {
        let mut options = PgConnectOptions::new()
            .host(&config.db_host)
            .port(config.db_port as u16)
            .database(&config.db_name);
        if let Some(username) = &config.db_username {
            options = options.username(username);
        }
        if let Some(password) = &config.db_password {
            options = options.password(password);
        }

        let db = &config::config().database;
        // Pools stay small: tenants are numerous and individually
        // low-traffic, and the aggregate connection count is what
        // actually bounds the server.
        PgPoolOptions::new()
            .max_connections(db.tenant_max_connections)
            .min_connections(db.tenant_min_connections)
            .acquire_timeout(Duration::from_secs(db.acquire_timeout_secs))
            .connect_lazy_with(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Config source that counts lookups and never needs a live server
    /// (pools connect lazily).
    struct StubConfigs {
        lookups: AtomicUsize,
        known: Vec<String>,
    }

    impl StubConfigs {
        fn with(known: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                lookups: AtomicUsize::new(0),
                known: known.iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    #[async_trait]
    impl DbConfigSource for StubConfigs {
        async fn db_config_by_name(&self, db_name: &str) -> Result<TenantDbConfig, DatabaseError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            // Simulate a registry round-trip so racing callers overlap
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            if !self.known.iter().any(|k| k == db_name) {
                return Err(DatabaseError::TenantConfigNotFound(db_name.to_string()));
            }
            let now = Utc::now();
            Ok(TenantDbConfig {
                id: 1,
                tenant_id: Uuid::new_v4(),
                db_name: db_name.to_string(),
                db_host: "localhost".to_string(),
                db_port: 5432,
                db_username: Some("hive".to_string()),
                db_password: Some("secret".to_string()),
                created_at: now,
                updated_at: now,
            })
        }
    }

    #[tokio::test]
    async fn empty_name_resolves_to_none_without_lookup() {
        let configs = StubConfigs::with(&["tenant_acme"]);
        let resolver = PoolResolver::new(configs.clone());

        assert!(resolver.resolve("").await.unwrap().is_none());
        assert!(resolver.resolve("   ").await.unwrap().is_none());
        assert_eq!(configs.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.cached_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_name_is_rejected_before_lookup() {
        let configs = StubConfigs::with(&[]);
        let resolver = PoolResolver::new(configs.clone());

        let err = resolver.resolve("tenant_acme; DROP").await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidDatabaseName(_)));
        assert_eq!(configs.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_creates_exactly_one_pool() {
        let configs = StubConfigs::with(&["tenant_acme"]);
        let resolver = Arc::new(PoolResolver::new(configs.clone()));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve("tenant_acme").await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap().expect("pool");
        }

        // One registry lookup, one cache entry: the cell handed every
        // racing caller a clone of the single pool it initialized
        assert_eq!(configs.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_count().await, 1);
    }

    #[tokio::test]
    async fn missing_config_is_not_cached_negatively() {
        let configs = StubConfigs::with(&[]);
        let resolver = PoolResolver::new(configs.clone());

        let err = resolver.resolve("tenant_ghost").await.unwrap_err();
        assert!(matches!(err, DatabaseError::TenantConfigNotFound(_)));

        // A second attempt consults the registry again (the tenant may
        // have been onboarded in between)
        let err = resolver.resolve("tenant_ghost").await.unwrap_err();
        assert!(matches!(err, DatabaseError::TenantConfigNotFound(_)));
        assert_eq!(configs.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_names_get_distinct_pools() {
        let configs = StubConfigs::with(&["tenant_acme", "tenant_globex"]);
        let resolver = PoolResolver::new(configs);

        resolver.resolve("tenant_acme").await.unwrap().unwrap();
        resolver.resolve("tenant_globex").await.unwrap().unwrap();
        assert_eq!(resolver.cached_count().await, 2);
    }

    #[tokio::test]
    async fn evict_removes_the_cached_pool() {
        let configs = StubConfigs::with(&["tenant_acme"]);
        let resolver = PoolResolver::new(configs.clone());

        resolver.resolve("tenant_acme").await.unwrap().unwrap();
        assert_eq!(resolver.cached_count().await, 1);

        resolver.evict("tenant_acme").await;
        assert_eq!(resolver.cached_count().await, 0);

        // Next resolve goes back to the registry
        resolver.resolve("tenant_acme").await.unwrap().unwrap();
        assert_eq!(configs.lookups.load(Ordering::SeqCst), 2);
    }
}
