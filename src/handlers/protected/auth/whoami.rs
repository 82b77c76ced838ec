// GET /api/auth/whoami - echo the authenticated principal

use axum::{response::Json, Extension};
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoamiResponse {
    pub username: String,
    pub company_code: String,
    pub database: String,
    pub role: String,
}

pub async fn whoami_get(
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<WhoamiResponse>, ApiError> {
    Ok(Json(WhoamiResponse {
        username: auth_user.username,
        company_code: auth_user.tenant,
        database: auth_user.database,
        role: auth_user.role,
    }))
}
