//! Token-based tenant resolution and authentication for protected
//! endpoints.
//!
//! The chain is: validate the bearer token, resolve the tenant claim to
//! a database, then load the user from that database to build the
//! authenticated principal. Any failure leaves the request
//! unauthenticated instead of aborting it; [`require_auth`] then turns
//! the missing principal into one uniform 401. Collapsing every failure
//! into the same response keeps callers from probing which stage broke
//! (tenant/user enumeration).
//!
//! The tenant scope spans the whole downstream span — user lookup,
//! handler, response generation — and is released when the response
//! future completes.

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, Claims};
use crate::context::TenantContext;
use crate::database::models::user::status;
use crate::database::models::User;
use crate::database;
use crate::error::ApiError;
use crate::registry::registry;

/// Authenticated principal, loaded from the tenant's users table
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub tenant: String,
    pub database: String,
    pub role: String,
}

pub async fn jwt_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    match resolve_bearer(&headers).await {
        Some((claims, db_name)) => {
            TenantContext::scope(Some(db_name.clone()), async move {
                if let Some(auth_user) = load_principal(&claims, &db_name).await {
                    request.extensions_mut().insert(auth_user);
                }
                next.run(request).await
            })
            .await
        }
        None => next.run(request).await,
    }
}

/// Rejects requests that carry no authenticated principal. Placed on
/// every protected route so all resolution failures surface as the same
/// response.
pub async fn require_auth(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<AuthUser>().is_none() {
        return Err(ApiError::unauthorized("Unauthorized"));
    }
    Ok(next.run(request).await)
}

/// Token validation plus tenant resolution. Returns `None` on any
/// failure; the reasons are only logged.
async fn resolve_bearer(headers: &HeaderMap) -> Option<(Claims, String)> {
    let token = bearer_token(headers)?;

    let claims = match validate_jwt(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!("Rejected bearer token: {}", err);
            return None;
        }
    };

    let registry = match registry() {
        Ok(registry) => registry,
        Err(err) => {
            tracing::error!("Registry unavailable during token resolution: {}", err);
            return None;
        }
    };

    match registry.find_tenant_database(&claims.tenant).await {
        Ok(config) => Some((claims, config.db_name)),
        Err(err) => {
            tracing::debug!(
                "Token carried unresolvable tenant '{}': {}",
                claims.tenant,
                err
            );
            None
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Loads the subject from the now-active tenant database. Runs inside
/// the tenant scope set by the caller.
async fn load_principal(claims: &Claims, db_name: &str) -> Option<AuthUser> {
    let pool = match database::active_pool().await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::debug!("No pool for tenant database '{}': {}", db_name, err);
            return None;
        }
    };

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password, role, status, created_at, updated_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(&claims.sub)
    .fetch_optional(&pool)
    .await;

    match user {
        Ok(Some(user)) if user.status == status::ACTIVE => Some(AuthUser {
            user_id: user.id,
            username: user.username,
            tenant: claims.tenant.clone(),
            database: db_name.to_string(),
            role: user.role,
        }),
        Ok(_) => {
            tracing::debug!("Token subject '{}' not active in '{}'", claims.sub, db_name);
            None
        }
        Err(err) => {
            tracing::debug!("User lookup failed in '{}': {}", db_name, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[test]
    fn rejects_non_bearer_schemes_and_empty_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
