//! Tenant-local schema initialization. Runs with the tenant context
//! scoped to the new database so the statements flow through the same
//! routing datasource as normal request traffic.

use crate::context::TenantContext;
use crate::database::router::DataSourceRouter;
use crate::database::DatabaseError;

pub async fn init_tenant_schema(
    router: &DataSourceRouter,
    db_name: &str,
) -> Result<(), DatabaseError> {
    TenantContext::scope(Some(db_name.to_string()), async {
        let pool = router.active_pool().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                email VARCHAR(150) UNIQUE NOT NULL,
                username VARCHAR(50) UNIQUE NOT NULL,
                password TEXT NOT NULL,
                role VARCHAR(30) NOT NULL,
                status VARCHAR(20) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                id BIGSERIAL PRIMARY KEY,
                first_name VARCHAR(50) NOT NULL,
                last_name VARCHAR(50) NOT NULL,
                date_of_birth DATE,
                age SMALLINT,
                gender SMALLINT,
                mobile VARCHAR(20) NOT NULL UNIQUE,
                email VARCHAR(150) NOT NULL UNIQUE,
                address1 VARCHAR(255) NOT NULL,
                address2 VARCHAR(255),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(())
    })
    .await
}
