// POST /tenants/register - onboard a new tenant
// GET  /tenants          - list registered tenants

use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use std::collections::HashMap;

use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::registry::registry;
use crate::tenancy::{OnboardingOrchestrator, TenantSignup};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenantRequest {
    pub company_code: String,
    pub company_name: String,
    pub company_email: String,
    pub admin_email: String,
    pub admin_username: String,
    pub admin_password: String,
}

impl RegisterTenantRequest {
    /// Presence checks only; the orchestrator owns the company-code
    /// format rule.
    fn validate(&self) -> Result<(), ApiError> {
        let mut field_errors = HashMap::new();
        let required = [
            ("companyCode", &self.company_code),
            ("companyName", &self.company_name),
            ("companyEmail", &self.company_email),
            ("adminEmail", &self.admin_email),
            ("adminUsername", &self.admin_username),
            ("adminPassword", &self.admin_password),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                field_errors.insert(name.to_string(), "This field is required".to_string());
            }
        }
        for (name, value) in [
            ("companyEmail", &self.company_email),
            ("adminEmail", &self.admin_email),
        ] {
            if !value.trim().is_empty() && !value.contains('@') {
                field_errors.insert(name.to_string(), "Invalid email address".to_string());
            }
        }
        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Validation failed", field_errors))
        }
    }
}

pub async fn tenants_register_post(
    Json(payload): Json<RegisterTenantRequest>,
) -> Result<StatusCode, ApiError> {
    payload.validate()?;

    let orchestrator = OnboardingOrchestrator::from_process()?;
    orchestrator
        .onboard(TenantSignup {
            company_code: payload.company_code,
            company_name: payload.company_name,
            company_email: payload.company_email,
            admin_email: payload.admin_email,
            admin_username: payload.admin_username,
            admin_password: payload.admin_password,
        })
        .await?;

    Ok(StatusCode::CREATED)
}

pub async fn tenants_get() -> Result<Json<Vec<Tenant>>, ApiError> {
    let tenants = registry()?.list_tenants().await?;
    Ok(Json(tenants))
}
