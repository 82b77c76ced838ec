pub mod auth;
pub mod resolve_tenant;
pub mod response;

pub use auth::{jwt_auth_middleware, require_auth, AuthUser};
pub use resolve_tenant::{resolve_tenant_middleware, COMPANY_CODE_HEADER};
pub use response::error_response_middleware;
