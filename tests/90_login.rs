mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn login_requires_all_fields() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({
            "companyCode": "",
            "username": "alice",
            "password": "Passw0rd!"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "BAD_REQUEST", "body: {}", body);
    assert_eq!(body["path"], "/auth/login", "body: {}", body);

    Ok(())
}

#[tokio::test]
async fn login_with_unknown_tenant_yields_structured_error() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({
            "companyCode": "no_such_tenant",
            "username": "alice",
            "password": "Passw0rd!"
        }))
        .send()
        .await?;

    // 401 with a live master database; 5xx structured error without one
    assert!(
        res.status() == StatusCode::UNAUTHORIZED || res.status().is_server_error(),
        "unexpected status {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert!(body.get("error").is_some(), "body: {}", body);
    assert!(body.get("message").is_some(), "body: {}", body);
    assert_eq!(body["path"], "/auth/login", "body: {}", body);

    Ok(())
}

#[tokio::test]
async fn login_endpoint_rejects_missing_body() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .send()
        .await?;

    assert!(
        res.status().is_client_error(),
        "expected client error, got {}",
        res.status()
    );

    Ok(())
}

#[tokio::test]
async fn unknown_company_code_header_fails_before_the_handler() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .header("X-COMPANY-CODE", "no_such_tenant")
        .json(&json!({
            "companyCode": "no_such_tenant",
            "username": "alice",
            "password": "Passw0rd!"
        }))
        .send()
        .await?;

    // 401 with a live master database; 5xx structured error without one
    assert!(
        res.status() == StatusCode::UNAUTHORIZED || res.status().is_server_error(),
        "unexpected status {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    assert!(body.get("error").is_some(), "body: {}", body);
    assert_eq!(body["path"], "/auth/login", "body: {}", body);

    Ok(())
}
