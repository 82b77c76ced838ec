use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Application user stored inside a tenant database
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub mod role {
    pub const ADMIN: &str = "ADMIN";
    pub const USER: &str = "USER";
}

pub mod status {
    pub const ACTIVE: &str = "ACTIVE";
    pub const INACTIVE: &str = "INACTIVE";
}
