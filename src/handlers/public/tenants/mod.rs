pub mod register;

pub use register::{tenants_get, tenants_register_post};
