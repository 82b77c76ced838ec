mod common;

use anyhow::Result;
use reqwest::StatusCode;

use hive_api::auth::{generate_jwt_with_secret, Claims};

// The test server runs in development mode unless JWT_SECRET is set
const DEV_SECRET: &str = "hive-dev-secret-do-not-use-in-production";

async fn assert_uniform_unauthorized(res: reqwest::Response, path: &str) -> Result<()> {
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "UNAUTHORIZED", "body: {}", body);
    assert_eq!(body["message"], "Unauthorized", "body: {}", body);
    assert_eq!(body["path"], path, "body: {}", body);
    assert!(body.get("timestamp").is_some(), "body: {}", body);
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_tokens() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/customers", server.base_url))
        .send()
        .await?;
    assert_uniform_unauthorized(res, "/api/customers").await
}

#[tokio::test]
async fn protected_routes_reject_garbage_tokens() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .header("Authorization", "Bearer not.a.token")
        .send()
        .await?;
    assert_uniform_unauthorized(res, "/api/auth/whoami").await
}

#[tokio::test]
async fn tokens_for_unresolvable_tenants_get_the_same_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Well-formed, correctly signed token naming a tenant that cannot
    // be resolved. The failure must collapse into the uniform 401, not
    // surface as a 500 or leak which stage failed.
    let claims = Claims {
        sub: "alice".to_string(),
        tenant: "no_such_tenant".to_string(),
        role: "ADMIN".to_string(),
        iat: chrono::Utc::now().timestamp(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    let token = generate_jwt_with_secret(&claims, DEV_SECRET)?;

    let res = client
        .get(format!("{}/api/users", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    assert_uniform_unauthorized(res, "/api/users").await
}

#[tokio::test]
async fn expired_tokens_are_rejected_uniformly() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let claims = Claims {
        sub: "alice".to_string(),
        tenant: "acme".to_string(),
        role: "ADMIN".to_string(),
        iat: chrono::Utc::now().timestamp() - 7200,
        exp: chrono::Utc::now().timestamp() - 3600,
    };
    let token = generate_jwt_with_secret(&claims, DEV_SECRET)?;

    let res = client
        .get(format!("{}/api/customers", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;
    assert_uniform_unauthorized(res, "/api/customers").await
}
