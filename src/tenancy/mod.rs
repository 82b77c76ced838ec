pub mod bootstrap;
pub mod onboarding;
pub mod provision;
pub mod schema;

pub use onboarding::{OnboardingOrchestrator, TenantSignup};

use thiserror::Error;

use crate::database::DatabaseError;

/// Provisioning steps, in execution order. Failures and timeouts are
/// reported against the step they happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ValidateUniqueness,
    RegisterTenant,
    CreateDatabase,
    SaveDbConfig,
    InitSchema,
    BootstrapAdmin,
    ActivateTenant,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::ValidateUniqueness => "validate-uniqueness",
            Step::RegisterTenant => "register-tenant",
            Step::CreateDatabase => "create-database",
            Step::SaveDbConfig => "save-db-config",
            Step::InitSchema => "init-schema",
            Step::BootstrapAdmin => "bootstrap-admin",
            Step::ActivateTenant => "activate-tenant",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("{message}")]
    Duplicate { message: String, field: String },

    #[error("{0}")]
    InvalidCompanyCode(String),

    #[error("onboarding step '{step}' timed out")]
    StepTimeout { step: Step },

    #[error("onboarding step '{step}' failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: DatabaseError,
    },

    #[error("password hashing failed")]
    PasswordHash(#[source] bcrypt::BcryptError),
}
