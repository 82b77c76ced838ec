//! Routing datasource: the single entry point data-access code uses to
//! obtain a connection pool. Routing is an explicit function of the
//! tenant context value — `route(tenant_db)` — so the decision is
//! testable without ambient state; `active_pool` is the convenience
//! that reads the current [`TenantContext`].

use sqlx::PgPool;
use std::sync::Arc;

use super::resolver::PoolResolver;
use super::DatabaseError;
use crate::context::TenantContext;

#[derive(Clone)]
pub struct DataSourceRouter {
    master: PgPool,
    resolver: Arc<PoolResolver>,
}

impl DataSourceRouter {
    pub fn new(master: PgPool, resolver: Arc<PoolResolver>) -> Self {
        Self { master, resolver }
    }

    /// Picks the pool for the given tenant database name. `None` (or a
    /// name the resolver maps to none) falls back to the master pool,
    /// which must stay reachable even when no tenant is active —
    /// registry lookups themselves go through here.
    ///
    /// Read-only with respect to the tenant context.
    pub async fn route(&self, tenant_db: Option<&str>) -> Result<PgPool, DatabaseError> {
        if let Some(db_name) = tenant_db {
            if let Some(pool) = self.resolver.resolve(db_name).await? {
                return Ok(pool);
            }
        }
        Ok(self.master.clone())
    }

    /// Pool for the tenant bound to the current request scope, master
    /// pool when none is bound
    pub async fn active_pool(&self) -> Result<PgPool, DatabaseError> {
        let current = TenantContext::current();
        self.route(current.as_deref()).await
    }

    pub fn master_pool(&self) -> &PgPool {
        &self.master
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::resolver::DbConfigSource;
    use crate::database::models::TenantDbConfig;
    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    struct OneTenant;

    #[async_trait]
    impl DbConfigSource for OneTenant {
        async fn db_config_by_name(&self, db_name: &str) -> Result<TenantDbConfig, DatabaseError> {
            if db_name != "tenant_acme" {
                return Err(DatabaseError::TenantConfigNotFound(db_name.to_string()));
            }
            let now = Utc::now();
            Ok(TenantDbConfig {
                id: 1,
                tenant_id: Uuid::new_v4(),
                db_name: db_name.to_string(),
                db_host: "localhost".to_string(),
                db_port: 5432,
                db_username: None,
                db_password: None,
                created_at: now,
                updated_at: now,
            })
        }
    }

    fn lazy_master() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://hive@localhost:5432/hive_master")
            .expect("lazy pool")
    }

    fn router() -> DataSourceRouter {
        DataSourceRouter::new(
            lazy_master(),
            Arc::new(PoolResolver::new(Arc::new(OneTenant))),
        )
    }

    #[tokio::test]
    async fn routes_to_master_when_no_tenant_is_active() {
        let router = router();
        // No scope in effect: both calls land on the master pool
        router.route(None).await.unwrap();
        router.active_pool().await.unwrap();
    }

    #[tokio::test]
    async fn routes_to_tenant_pool_inside_a_scope() {
        let router = router();
        let result = TenantContext::scope(Some("tenant_acme".into()), async {
            router.active_pool().await
        })
        .await;
        result.unwrap();
    }

    #[tokio::test]
    async fn unknown_tenant_propagates_instead_of_falling_back() {
        let router = router();
        let err = TenantContext::scope(Some("tenant_ghost".into()), async {
            router.active_pool().await
        })
        .await
        .unwrap_err();
        assert!(matches!(err, DatabaseError::TenantConfigNotFound(_)));
    }
}
