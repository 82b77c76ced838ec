// /api/users - user administration inside the active tenant database.
// All data access goes through the routing datasource; the tenant was
// already bound by the authentication middleware.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::auth::password;
use crate::database::models::user::{role, status};
use crate::database::models::User;
use crate::database::{self, DatabaseError};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

pub async fn users_get() -> Result<Json<Vec<User>>, ApiError> {
    let pool = database::active_pool().await?;
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password, role, status, created_at, updated_at
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(DatabaseError::from)?;
    Ok(Json(users))
}

pub async fn user_get(Path(id): Path<i64>) -> Result<Json<User>, ApiError> {
    let pool = database::active_pool().await?;
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password, role, status, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}

pub async fn users_post(
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if payload.email.trim().is_empty()
        || payload.username.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::bad_request(
            "email, username and password are required",
        ));
    }

    let pool = database::active_pool().await?;

    let email_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&payload.email)
            .fetch_one(&pool)
            .await
            .map_err(DatabaseError::from)?;
    if email_taken {
        return Err(ApiError::duplicate("Email already registered", "email"));
    }

    let username_taken =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&payload.username)
            .fetch_one(&pool)
            .await
            .map_err(DatabaseError::from)?;
    if username_taken {
        return Err(ApiError::duplicate("Username already taken", "username"));
    }

    let password_hash = password::hash_password(&payload.password)
        .await
        .map_err(|err| {
            tracing::error!("Password hashing failed: {}", err);
            ApiError::internal_server_error("Failed to create user")
        })?;

    let user_role = payload.role.as_deref().unwrap_or(role::USER);

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, password, role, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, username, password, role, status, created_at, updated_at
        "#,
    )
    .bind(&payload.email)
    .bind(&payload.username)
    .bind(&password_hash)
    .bind(user_role)
    .bind(status::ACTIVE)
    .fetch_one(&pool)
    .await
    .map_err(DatabaseError::from)?;

    Ok((StatusCode::CREATED, Json(user)))
}
