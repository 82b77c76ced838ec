//! Tenant onboarding workflow.
//!
//! A linear saga across two stores that cannot share a transaction: the
//! master registry and the physical tenant database. Every step after
//! the registry row exists has a compensating action; on failure the
//! orchestrator drops whatever was built, in reverse, and removes the
//! row. If compensation itself fails the row is marked FAILED so the
//! partial state is visible to operators instead of silently wrong.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::{bootstrap, provision, schema, OnboardingError, Step};
use crate::auth::password;
use crate::config;
use crate::database::models::{tenant::status, Tenant};
use crate::database::resolver::PoolResolver;
use crate::database::router::DataSourceRouter;
use crate::database::{self, master, DatabaseError, TENANT_DB_PREFIX};
use crate::registry::{registry, NewDbConfig, TenantRegistry};

/// Everything needed to bring a new tenant online
#[derive(Debug, Clone)]
pub struct TenantSignup {
    pub company_code: String,
    pub company_name: String,
    pub company_email: String,
    pub admin_email: String,
    pub admin_username: String,
    pub admin_password: String,
}

pub struct OnboardingOrchestrator {
    registry: TenantRegistry,
    router: DataSourceRouter,
    resolver: Arc<PoolResolver>,
    step_timeout: Duration,
}

/// Tenant database names derive deterministically from the company
/// code, so code uniqueness guarantees database uniqueness.
pub fn tenant_db_name(company_code: &str) -> String {
    format!("{}{}", TENANT_DB_PREFIX, company_code.to_lowercase())
}

/// Company codes become SQL identifiers, so the character set is strict
pub fn validate_company_code(code: &str) -> Result<(), OnboardingError> {
    if code.len() < 2 || code.len() > 50 {
        return Err(OnboardingError::InvalidCompanyCode(
            "Company code must be between 2 and 50 characters".to_string(),
        ));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(OnboardingError::InvalidCompanyCode(
            "Company code may only contain letters, digits, and underscore".to_string(),
        ));
    }
    Ok(())
}

impl OnboardingOrchestrator {
    pub fn new(
        registry: TenantRegistry,
        router: DataSourceRouter,
        resolver: Arc<PoolResolver>,
    ) -> Self {
        Self {
            registry,
            router,
            resolver,
            step_timeout: Duration::from_secs(config::config().onboarding.step_timeout_secs),
        }
    }

    /// Orchestrator wired to the process-wide pools
    pub fn from_process() -> Result<Self, DatabaseError> {
        Ok(Self::new(
            registry()?,
            database::router()?,
            database::resolver()?,
        ))
    }

    /// Runs the full provisioning sequence for one new tenant.
    pub async fn onboard(&self, signup: TenantSignup) -> Result<Tenant, OnboardingError> {
        validate_company_code(&signup.company_code)?;

        // Uniqueness gate: nothing is created past this point unless
        // both keys are free
        let code_taken = self
            .run_step(
                Step::ValidateUniqueness,
                self.registry.company_code_exists(&signup.company_code),
            )
            .await?;
        if code_taken {
            return Err(OnboardingError::Duplicate {
                message: "Company code already exists".to_string(),
                field: "companyCode".to_string(),
            });
        }
        let email_taken = self
            .run_step(
                Step::ValidateUniqueness,
                self.registry.company_email_exists(&signup.company_email),
            )
            .await?;
        if email_taken {
            return Err(OnboardingError::Duplicate {
                message: "Company email already exists".to_string(),
                field: "companyEmail".to_string(),
            });
        }

        let tenant = self
            .run_step(
                Step::RegisterTenant,
                self.registry.create_tenant(
                    &signup.company_code,
                    &signup.company_name,
                    &signup.company_email,
                ),
            )
            .await?;

        let db_name = tenant_db_name(&tenant.company_code);
        info!(
            "Onboarding tenant '{}' into database '{}'",
            tenant.company_code, db_name
        );

        match self.provision(&tenant, &db_name, &signup).await {
            Ok(()) => {
                info!("Tenant '{}' onboarded", tenant.company_code);
                Ok(tenant)
            }
            Err(err) => {
                warn!(
                    "Onboarding of tenant '{}' failed ({}); compensating",
                    tenant.company_code, err
                );
                self.compensate(&tenant, &db_name).await;
                Err(err)
            }
        }
    }

    /// Steps 3-7: everything that touches the physical tenant database
    /// or depends on it. Any error here triggers compensation.
    async fn provision(
        &self,
        tenant: &Tenant,
        db_name: &str,
        signup: &TenantSignup,
    ) -> Result<(), OnboardingError> {
        self.run_step(Step::CreateDatabase, provision::create_database(db_name))
            .await?;

        let db_config = self
            .connection_defaults(db_name)
            .map_err(|source| OnboardingError::Step {
                step: Step::SaveDbConfig,
                source,
            })?;
        self.run_step(
            Step::SaveDbConfig,
            self.registry.save_db_config(tenant.id, db_config),
        )
        .await?;

        self.run_step(
            Step::InitSchema,
            schema::init_tenant_schema(&self.router, db_name),
        )
        .await?;

        let password_hash = password::hash_password(&signup.admin_password)
            .await
            .map_err(OnboardingError::PasswordHash)?;
        self.run_step(
            Step::BootstrapAdmin,
            bootstrap::create_admin_user(
                &self.router,
                db_name,
                &signup.admin_email,
                &signup.admin_username,
                &password_hash,
            ),
        )
        .await?;

        self.run_step(
            Step::ActivateTenant,
            self.registry.update_status(tenant.id, status::ACTIVE),
        )
        .await?;

        Ok(())
    }

    /// Reverse compensation: close the cached pool, drop the physical
    /// database, remove the registry rows. Runs best-effort; a failure
    /// here leaves the tenant row marked FAILED for operators.
    async fn compensate(&self, tenant: &Tenant, db_name: &str) {
        self.resolver.evict(db_name).await;

        if let Err(drop_err) = provision::drop_database(db_name).await {
            error!(
                "Compensation could not drop database '{}': {}",
                db_name, drop_err
            );
            self.mark_failed(tenant).await;
            return;
        }

        if let Err(delete_err) = self.registry.delete_tenant(tenant.id).await {
            error!(
                "Compensation could not delete tenant '{}': {}",
                tenant.company_code, delete_err
            );
            self.mark_failed(tenant).await;
            return;
        }

        info!(
            "Compensated failed onboarding of tenant '{}'",
            tenant.company_code
        );
    }

    async fn mark_failed(&self, tenant: &Tenant) {
        if let Err(err) = self.registry.update_status(tenant.id, status::FAILED).await {
            error!(
                "Could not mark tenant '{}' as failed: {}",
                tenant.company_code, err
            );
        }
    }

    /// The tenant database lives on the same server as the master in
    /// the base deployment, so its connection defaults come from the
    /// master URL.
    fn connection_defaults(&self, db_name: &str) -> Result<NewDbConfig, DatabaseError> {
        let url = master::master_url()?;
        Ok(NewDbConfig {
            db_name: db_name.to_string(),
            db_host: url.host_str().unwrap_or("localhost").to_string(),
            db_port: i32::from(url.port().unwrap_or(5432)),
            db_username: (!url.username().is_empty()).then(|| url.username().to_string()),
            db_password: url.password().map(str::to_string),
        })
    }

    async fn run_step<T, F>(&self, step: Step, fut: F) -> Result<T, OnboardingError>
    where
        F: Future<Output = Result<T, DatabaseError>>,
    {
        match timeout(self.step_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(OnboardingError::Step { step, source }),
            Err(_) => Err(OnboardingError::StepTimeout { step }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_database_name_from_company_code() {
        assert_eq!(tenant_db_name("acme"), "tenant_acme");
        assert_eq!(tenant_db_name("ACME"), "tenant_acme");
        assert_eq!(tenant_db_name("Globex_2"), "tenant_globex_2");
    }

    #[test]
    fn company_code_character_set_is_strict() {
        assert!(validate_company_code("acme").is_ok());
        assert!(validate_company_code("ACME_2").is_ok());
        assert!(validate_company_code("a").is_err());
        assert!(validate_company_code("acme corp").is_err());
        assert!(validate_company_code("acme;drop").is_err());
        assert!(validate_company_code(&"x".repeat(51)).is_err());
    }

    #[test]
    fn steps_report_stable_names() {
        assert_eq!(Step::CreateDatabase.to_string(), "create-database");
        assert_eq!(Step::BootstrapAdmin.to_string(), "bootstrap-admin");
    }
}
