// POST /auth/login - authenticate against a tenant database and issue a token

use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, password, Claims};
use crate::context::TenantContext;
use crate::database::models::user::status;
use crate::database::models::User;
use crate::database::{self, DatabaseError};
use crate::error::ApiError;
use crate::registry::registry;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub company_code: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub company_code: String,
    pub username: String,
    pub role: String,
}

/// Tenant and credential failures share one message so login cannot be
/// used to probe which tenants or usernames exist.
const INVALID_LOGIN: &str = "Invalid company code or credentials";

pub async fn login_post(Json(payload): Json<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
    if payload.company_code.trim().is_empty()
        || payload.username.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::bad_request(
            "companyCode, username and password are required",
        ));
    }

    let config = registry()?
        .find_tenant_database(&payload.company_code)
        .await
        .map_err(|err| match err {
            DatabaseError::NotFound(_) => ApiError::unauthorized(INVALID_LOGIN),
            other => other.into(),
        })?;

    // Everything from credential check to token issue runs routed at
    // the tenant's database; the scope ends before the response leaves
    let response = TenantContext::scope(Some(config.db_name), async {
        let pool = database::active_pool().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password, role, status, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(&payload.username)
        .fetch_optional(&pool)
        .await
        .map_err(DatabaseError::from)?
        .filter(|user| user.status == status::ACTIVE)
        .ok_or_else(|| ApiError::unauthorized(INVALID_LOGIN))?;

        let password_matches = password::verify_password(&payload.password, &user.password)
            .await
            .map_err(|err| {
                tracing::error!("Password verification failed: {}", err);
                ApiError::internal_server_error("Authentication failed")
            })?;
        if !password_matches {
            return Err(ApiError::unauthorized(INVALID_LOGIN));
        }

        let claims = Claims::new(
            user.username.clone(),
            payload.company_code.clone(),
            user.role.clone(),
        );
        let token = generate_jwt(&claims)?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            company_code: payload.company_code.clone(),
            username: user.username,
            role: user.role,
        })
    })
    .await?;

    Ok(Json(response))
}
