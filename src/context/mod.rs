//! Request-scoped tenant context.
//!
//! Holds the database name of the tenant the current request is acting
//! for. The value is carried in a tokio task-local, so it is visible to
//! everything awaited within the scope and to nothing else: other
//! requests multiplexed onto the same worker thread, or tasks spawned
//! with `tokio::spawn`, never observe it.
//!
//! There is deliberately no `set`/`clear` pair. The only way to install
//! a tenant is [`TenantContext::scope`], which releases the value when
//! the wrapped future completes, on success and on error alike.

use std::future::Future;

tokio::task_local! {
    static ACTIVE_TENANT_DB: Option<String>;
}

pub struct TenantContext;

impl TenantContext {
    /// Runs `fut` with the given tenant database bound as the active
    /// tenant. Nested scopes shadow the outer value until they finish.
    pub async fn scope<F>(db_name: Option<String>, fut: F) -> F::Output
    where
        F: Future,
    {
        ACTIVE_TENANT_DB.scope(db_name, fut).await
    }

    /// Returns the active tenant database name, or `None` when called
    /// outside any scope (master-database fallback applies).
    pub fn current() -> Option<String> {
        ACTIVE_TENANT_DB
            .try_with(|db| db.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn current_is_none_outside_any_scope() {
        assert_eq!(TenantContext::current(), None);
    }

    #[tokio::test]
    async fn scope_binds_and_releases() {
        let seen = TenantContext::scope(Some("tenant_acme".into()), async {
            TenantContext::current()
        })
        .await;
        assert_eq!(seen.as_deref(), Some("tenant_acme"));
        // Released once the scoped future completes
        assert_eq!(TenantContext::current(), None);
    }

    #[tokio::test]
    async fn scope_releases_on_error_paths() {
        let result: Result<(), &str> = TenantContext::scope(Some("tenant_acme".into()), async {
            Err("boom")
        })
        .await;
        assert!(result.is_err());
        assert_eq!(TenantContext::current(), None);
    }

    #[tokio::test]
    async fn nested_scope_shadows_then_restores() {
        TenantContext::scope(Some("tenant_outer".into()), async {
            assert_eq!(TenantContext::current().as_deref(), Some("tenant_outer"));
            TenantContext::scope(Some("tenant_inner".into()), async {
                assert_eq!(TenantContext::current().as_deref(), Some("tenant_inner"));
            })
            .await;
            assert_eq!(TenantContext::current().as_deref(), Some("tenant_outer"));
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_tasks_never_observe_each_other() {
        // Two request-like tasks interleaving on a shared worker pool;
        // each must only ever see its own tenant.
        let a = tokio::spawn(TenantContext::scope(Some("tenant_a".into()), async {
            for _ in 0..50 {
                assert_eq!(TenantContext::current().as_deref(), Some("tenant_a"));
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }));
        let b = tokio::spawn(TenantContext::scope(Some("tenant_b".into()), async {
            for _ in 0..50 {
                assert_eq!(TenantContext::current().as_deref(), Some("tenant_b"));
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }));
        a.await.unwrap();
        b.await.unwrap();
    }

    #[tokio::test]
    async fn spawned_tasks_do_not_inherit_the_scope() {
        TenantContext::scope(Some("tenant_acme".into()), async {
            let handle = tokio::spawn(async { TenantContext::current() });
            assert_eq!(handle.await.unwrap(), None);
        })
        .await;
    }
}
