//! Physical tenant database provisioning. These statements run against
//! the database *server* through the admin pool, not against any
//! application schema.

use tracing::info;

use crate::database::{is_valid_tenant_db_name, master, quote_identifier, DatabaseError};

/// Creates the tenant database if it does not exist yet
pub async fn create_database(db_name: &str) -> Result<(), DatabaseError> {
    if !is_valid_tenant_db_name(db_name) {
        return Err(DatabaseError::InvalidDatabaseName(db_name.to_string()));
    }
    let admin = master::admin_pool()?;

    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&admin)
            .await?;
    if exists {
        info!("Tenant database already exists: {}", db_name);
        return Ok(());
    }

    let statement = format!("CREATE DATABASE {}", quote_identifier(db_name));
    sqlx::query(&statement).execute(&admin).await?;

    info!("Created tenant database: {}", db_name);
    Ok(())
}

/// Drops the tenant database. Compensation path only.
pub async fn drop_database(db_name: &str) -> Result<(), DatabaseError> {
    if !is_valid_tenant_db_name(db_name) {
        return Err(DatabaseError::InvalidDatabaseName(db_name.to_string()));
    }
    let admin = master::admin_pool()?;

    let statement = format!("DROP DATABASE IF EXISTS {}", quote_identifier(db_name));
    sqlx::query(&statement).execute(&admin).await?;

    info!("Dropped tenant database: {}", db_name);
    Ok(())
}
