use axum::http::HeaderValue;
use axum::{
    middleware as layers,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use hive_api::config::{config, Environment};
use hive_api::handlers::{protected, public};
use hive_api::middleware::{
    error_response_middleware, jwt_auth_middleware, require_auth, resolve_tenant_middleware,
};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config();
    tracing::info!("Starting Hive API in {:?} mode", config.environment);

    // Master tables must exist before the first request arrives
    match hive_api::registry::registry() {
        Ok(registry) => {
            if let Err(e) = registry.ensure_schema().await {
                tracing::warn!("Could not ensure master schema at startup: {}", e);
            }
        }
        Err(e) => tracing::warn!("Master database not configured: {}", e),
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("HIVE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Hive API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(tenant_routes())
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(layers::from_fn(error_response_middleware))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Login path: tenant resolution comes from the X-COMPANY-CODE header
/// because no token exists yet
fn auth_public_routes() -> Router {
    Router::new()
        .route("/auth/login", post(public::auth::login_post))
        .layer(layers::from_fn(resolve_tenant_middleware))
}

fn tenant_routes() -> Router {
    use public::tenants;

    Router::new()
        .route("/tenants/register", post(tenants::tenants_register_post))
        .route("/tenants", get(tenants::tenants_get))
}

/// Authenticated API: the JWT middleware binds the tenant scope for the
/// whole request span, and the guard collapses every resolution failure
/// into one uniform 401
fn api_routes() -> Router {
    use protected::{auth, customers, users};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/api/users", get(users::users_get).post(users::users_post))
        .route("/api/users/:id", get(users::user_get))
        .route(
            "/api/customers",
            get(customers::customers_get).post(customers::customers_post),
        )
        .route(
            "/api/customers/:id",
            get(customers::customer_get)
                .put(customers::customer_put)
                .delete(customers::customer_delete),
        )
        .route_layer(layers::from_fn(require_auth))
        .layer(layers::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let security = &config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    match config().environment {
        Environment::Development => CorsLayer::permissive(),
        _ => {
            let origins: Vec<HeaderValue> = security
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Hive API",
        "version": version,
        "description": "Multi-tenant SaaS backend with per-tenant database routing",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "/auth/login (public - token acquisition, X-COMPANY-CODE header)",
            "tenants": "/tenants/register, /tenants (public - onboarding)",
            "whoami": "/api/auth/whoami (protected)",
            "users": "/api/users[/:id] (protected)",
            "customers": "/api/customers[/:id] (protected)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match hive_api::database::master::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
