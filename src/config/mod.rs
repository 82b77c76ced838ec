use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub onboarding: OnboardingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Pool size for the master (registry) database
    pub master_max_connections: u32,
    /// Per-tenant pool sizing. Tenants are numerous and individually
    /// low-traffic, so these stay small to bound total connection count.
    pub tenant_max_connections: u32,
    pub tenant_min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingConfig {
    /// Applied to each provisioning step individually, so a stuck
    /// step reports which one timed out.
    pub step_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MASTER_MAX_CONNECTIONS") {
            self.database.master_max_connections =
                v.parse().unwrap_or(self.database.master_max_connections);
        }
        if let Ok(v) = env::var("DATABASE_TENANT_MAX_CONNECTIONS") {
            self.database.tenant_max_connections =
                v.parse().unwrap_or(self.database.tenant_max_connections);
        }
        if let Ok(v) = env::var("DATABASE_TENANT_MIN_CONNECTIONS") {
            self.database.tenant_min_connections =
                v.parse().unwrap_or(self.database.tenant_min_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Onboarding overrides
        if let Ok(v) = env::var("ONBOARDING_STEP_TIMEOUT_SECS") {
            self.onboarding.step_timeout_secs =
                v.parse().unwrap_or(self.onboarding.step_timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                master_max_connections: 10,
                tenant_max_connections: 5,
                tenant_min_connections: 1,
                acquire_timeout_secs: 30,
            },
            security: SecurityConfig {
                // Development fallback only; JWT_SECRET must be set outside dev
                jwt_secret: "hive-dev-secret-do-not-use-in-production".to_string(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            onboarding: OnboardingConfig {
                step_timeout_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                master_max_connections: 20,
                tenant_max_connections: 5,
                tenant_min_connections: 1,
                acquire_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 12,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            onboarding: OnboardingConfig {
                step_timeout_secs: 20,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                master_max_connections: 50,
                tenant_max_connections: 5,
                tenant_min_connections: 1,
                acquire_timeout_secs: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            onboarding: OnboardingConfig {
                step_timeout_secs: 15,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_keep_tenant_pools_small() {
        let config = AppConfig::development();
        assert_eq!(config.database.tenant_max_connections, 5);
        assert_eq!(config.database.tenant_min_connections, 1);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn production_defaults_tighten_timeouts() {
        let config = AppConfig::production();
        assert_eq!(config.database.acquire_timeout_secs, 5);
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert!(config.security.jwt_secret.is_empty());
    }
}
