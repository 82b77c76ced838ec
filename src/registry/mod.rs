//! Master-database tenant registry: tenant identity records and their
//! database connection metadata. Every query here runs against the
//! master pool directly — the registry must stay usable when no tenant
//! context is bound.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{tenant::status, Tenant, TenantDbConfig};
use crate::database::resolver::DbConfigSource;
use crate::database::{master, DatabaseError};

#[derive(Clone)]
pub struct TenantRegistry {
    pool: PgPool,
}

/// Connection metadata recorded for a newly provisioned tenant database
#[derive(Debug, Clone)]
pub struct NewDbConfig {
    pub db_name: String,
    pub db_host: String,
    pub db_port: i32,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
}

/// Registry handle on the master pool
pub fn registry() -> Result<TenantRegistry, DatabaseError> {
    Ok(TenantRegistry::new(master::master_pool()?))
}

impl TenantRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the master tables if they do not exist yet. Run once at
    /// startup.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tenants (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                company_code VARCHAR(50) NOT NULL UNIQUE,
                company_name VARCHAR(150) NOT NULL,
                company_email VARCHAR(150) NOT NULL UNIQUE,
                status VARCHAR(20) NOT NULL DEFAULT 'PROVISIONING',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tenant_db_config (
                id BIGSERIAL PRIMARY KEY,
                tenant_id UUID NOT NULL UNIQUE REFERENCES tenants(id) ON DELETE CASCADE,
                db_name VARCHAR(100) NOT NULL UNIQUE,
                db_host VARCHAR(255) NOT NULL,
                db_port INTEGER NOT NULL,
                db_username VARCHAR(100),
                db_password VARCHAR(255),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn company_code_exists(&self, company_code: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tenants WHERE company_code = $1)",
        )
        .bind(company_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn company_email_exists(&self, company_email: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tenants WHERE company_email = $1)",
        )
        .bind(company_email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Inserts the tenant identity row in PROVISIONING state
    pub async fn create_tenant(
        &self,
        company_code: &str,
        company_name: &str,
        company_email: &str,
    ) -> Result<Tenant, DatabaseError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (company_code, company_name, company_email, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_code, company_name, company_email, status, created_at, updated_at
            "#,
        )
        .bind(company_code)
        .bind(company_name)
        .bind(company_email)
        .bind(status::PROVISIONING)
        .fetch_one(&self.pool)
        .await?;
        Ok(tenant)
    }

    pub async fn tenant_by_code(&self, company_code: &str) -> Result<Tenant, DatabaseError> {
        sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, company_code, company_name, company_email, status, created_at, updated_at
            FROM tenants
            WHERE company_code = $1
            "#,
        )
        .bind(company_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Invalid company code".to_string()))
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, DatabaseError> {
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, company_code, company_name, company_email, status, created_at, updated_at
            FROM tenants
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tenants)
    }

    pub async fn update_status(&self, tenant_id: Uuid, status: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE tenants SET status = $2, updated_at = now() WHERE id = $1")
            .bind(tenant_id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes the tenant row; the db config row follows via cascade.
    /// Compensation path only.
    pub async fn delete_tenant(&self, tenant_id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn save_db_config(
        &self,
        tenant_id: Uuid,
        config: NewDbConfig,
    ) -> Result<TenantDbConfig, DatabaseError> {
        let saved = sqlx::query_as::<_, TenantDbConfig>(
            r#"
            INSERT INTO tenant_db_config (tenant_id, db_name, db_host, db_port, db_username, db_password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, tenant_id, db_name, db_host, db_port, db_username, db_password,
                      created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(&config.db_name)
        .bind(&config.db_host)
        .bind(config.db_port)
        .bind(&config.db_username)
        .bind(&config.db_password)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    pub async fn db_config_by_tenant_id(
        &self,
        tenant_id: Uuid,
    ) -> Result<TenantDbConfig, DatabaseError> {
        sqlx::query_as::<_, TenantDbConfig>(
            r#"
            SELECT id, tenant_id, db_name, db_host, db_port, db_username, db_password,
                   created_at, updated_at
            FROM tenant_db_config
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Tenant database configuration not found".to_string()))
    }

    /// Resolution entry point used by the request boundary: company
    /// code in, connection metadata out.
    pub async fn find_tenant_database(
        &self,
        company_code: &str,
    ) -> Result<TenantDbConfig, DatabaseError> {
        let tenant = self.tenant_by_code(company_code).await?;
        self.db_config_by_tenant_id(tenant.id).await
    }
}

#[async_trait]
impl DbConfigSource for TenantRegistry {
    /// Cache-miss lookup for the pool resolver, keyed by database name
    async fn db_config_by_name(&self, db_name: &str) -> Result<TenantDbConfig, DatabaseError> {
        sqlx::query_as::<_, TenantDbConfig>(
            r#"
            SELECT id, tenant_id, db_name, db_host, db_port, db_username, db_password,
                   created_at, updated_at
            FROM tenant_db_config
            WHERE db_name = $1
            "#,
        )
        .bind(db_name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::TenantConfigNotFound(db_name.to_string()))
    }
}
