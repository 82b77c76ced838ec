pub mod customer;
pub mod tenant;
pub mod tenant_db_config;
pub mod user;

pub use customer::Customer;
pub use tenant::Tenant;
pub use tenant_db_config::TenantDbConfig;
pub use user::User;
