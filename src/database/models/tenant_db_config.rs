use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Connection metadata for one tenant database, one-to-one with
/// [`super::Tenant`]. `db_name` is the routing key used everywhere
/// downstream; the human-facing company code never reaches the
/// connection layer.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TenantDbConfig {
    pub id: i64,
    pub tenant_id: Uuid,
    pub db_name: String,
    pub db_host: String,
    pub db_port: i32,
    pub db_username: Option<String>,
    #[serde(skip_serializing)]
    pub db_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
