mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn registration_rejects_missing_fields_before_any_provisioning() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/tenants/register", server.base_url))
        .json(&json!({
            "companyCode": "acme",
            "companyName": "",
            "companyEmail": "not-an-email",
            "adminEmail": "alice@acme.test",
            "adminUsername": "alice",
            "adminPassword": ""
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "VALIDATION_ERROR", "body: {}", body);
    assert_eq!(body["path"], "/tenants/register", "body: {}", body);
    assert!(body.get("timestamp").is_some(), "body: {}", body);

    let field_errors = body["fieldErrors"].as_object().expect("fieldErrors");
    assert!(field_errors.contains_key("companyName"));
    assert!(field_errors.contains_key("companyEmail"));
    assert!(field_errors.contains_key("adminPassword"));

    Ok(())
}

#[tokio::test]
async fn registration_rejects_unsafe_company_codes() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/tenants/register", server.base_url))
        .json(&json!({
            "companyCode": "acme corp; drop",
            "companyName": "Acme Corp",
            "companyEmail": "hello@acme.test",
            "adminEmail": "alice@acme.test",
            "adminUsername": "alice",
            "adminPassword": "Passw0rd!"
        }))
        .send()
        .await?;

    // Rejected by the code format rule before any registry access
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "BAD_REQUEST", "body: {}", body);
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("Company code"),
        "body: {}",
        body
    );

    Ok(())
}

#[tokio::test]
async fn registration_endpoint_answers_with_structured_errors() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/tenants/register", server.base_url))
        .json(&json!({
            "companyCode": "acme",
            "companyName": "Acme Corp",
            "companyEmail": "hello@acme.test",
            "adminEmail": "alice@acme.test",
            "adminUsername": "alice",
            "adminPassword": "Passw0rd!"
        }))
        .send()
        .await?;

    // 201 with a live master database; a structured error without one.
    // Either way no stack trace and no unstructured body.
    if res.status() != StatusCode::CREATED {
        assert!(
            res.status().is_client_error() || res.status().is_server_error(),
            "unexpected status {}",
            res.status()
        );
        let body = res.json::<serde_json::Value>().await?;
        assert!(body.get("error").is_some(), "body: {}", body);
        assert!(body.get("message").is_some(), "body: {}", body);
        assert_eq!(body["path"], "/tenants/register", "body: {}", body);
    }

    Ok(())
}
