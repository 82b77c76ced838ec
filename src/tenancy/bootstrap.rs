//! Initial administrator account for a freshly provisioned tenant.

use crate::context::TenantContext;
use crate::database::models::user::{role, status};
use crate::database::router::DataSourceRouter;
use crate::database::DatabaseError;

/// Inserts the tenant's first user. `password_hash` must already be a
/// bcrypt hash; plaintext never reaches this layer.
pub async fn create_admin_user(
    router: &DataSourceRouter,
    db_name: &str,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<(), DatabaseError> {
    TenantContext::scope(Some(db_name.to_string()), async {
        let pool = router.active_pool().await?;
        sqlx::query(
            r#"
            INSERT INTO users (email, username, password, role, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(role::ADMIN)
        .bind(status::ACTIVE)
        .execute(&pool)
        .await?;
        Ok(())
    })
    .await
}
