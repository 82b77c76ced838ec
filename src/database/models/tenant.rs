use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant (company) identity record in the master database.
/// `company_code` and `company_email` are the immutable uniqueness keys.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub company_code: String,
    pub company_name: String,
    pub company_email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant lifecycle states recorded on the master row
pub mod status {
    pub const PROVISIONING: &str = "PROVISIONING";
    pub const ACTIVE: &str = "ACTIVE";
    pub const FAILED: &str = "FAILED";
}
