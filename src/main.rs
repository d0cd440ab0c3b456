use axum::{
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use cqams_api::handlers::{protected, public};
use cqams_api::middleware::auth::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = cqams_api::config::config();
    tracing::info!("Starting CQAMS API in {:?} mode", config.environment);

    if config.database.run_migrations {
        if let Err(e) = cqams_api::database::DatabaseManager::migrate().await {
            // Keep serving: health reports unhealthy until the DB is back
            tracing::warn!("startup migration failed: {}", e);
        }
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("CQAMS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("CQAMS API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/auth/login", post(public::auth::login))
        // Protected API behind JWT auth
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn protected_routes() -> Router {
    use protected::employees::{
        addresses, bank_accounts, compensation, crud, documents, employment, onboarding,
    };

    Router::new()
        // Session introspection and UI configuration
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route("/api/navigation", get(protected::navigation::get))
        // Admin users
        .route(
            "/api/admin/admins",
            get(protected::admins::list).post(protected::admins::create),
        )
        // Employees
        .route(
            "/api/admin/employees",
            get(crud::list).post(crud::create),
        )
        .route(
            "/api/admin/employees/:id",
            get(crud::get).put(crud::update).delete(crud::delete),
        )
        // Per-employee child resources
        .route(
            "/api/admin/employees/:id/addresses",
            get(addresses::list)
                .post(addresses::create)
                .put(addresses::replace_all)
                .delete(addresses::delete_all),
        )
        .route(
            "/api/admin/employees/:id/bank-accounts",
            get(bank_accounts::list)
                .post(bank_accounts::create)
                .put(bank_accounts::replace_all)
                .delete(bank_accounts::delete_all),
        )
        .route(
            "/api/admin/employees/:id/compensation",
            get(compensation::get)
                .post(compensation::create)
                .put(compensation::upsert)
                .delete(compensation::delete),
        )
        .route(
            "/api/admin/employees/:id/documents",
            get(documents::list)
                .post(documents::create)
                .put(documents::replace_all)
                .delete(documents::delete),
        )
        .route(
            "/api/admin/employees/:id/employment",
            get(employment::get)
                .post(employment::create)
                .put(employment::upsert)
                .delete(employment::delete),
        )
        // Onboarding wizard
        .route("/api/admin/employees/:id/onboarding", get(onboarding::get))
        .route(
            "/api/admin/employees/:id/onboarding/review",
            post(onboarding::skip_to_review),
        )
        .route(
            "/api/admin/employees/:id/onboarding/complete",
            post(onboarding::complete),
        )
        .route(
            "/api/admin/employees/:id/onboarding/:step",
            put(onboarding::save_step),
        )
        // Roles and permissions
        .route(
            "/api/roles",
            get(protected::roles::list).post(protected::roles::create),
        )
        .route("/api/permissions", get(protected::permissions::list))
        .route_layer(from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "CQAMS API",
            "version": version,
            "description": "Employee management backend with role/permission access control",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "health": "/api/health (public)",
                "auth": "/api/auth/whoami (protected)",
                "admins": "/api/admin/admins (protected)",
                "employees": "/api/admin/employees[/:id[/:child]] (protected)",
                "onboarding": "/api/admin/employees/:id/onboarding (protected)",
                "roles": "/api/roles (protected)",
                "permissions": "/api/permissions (protected)",
                "navigation": "/api/navigation (protected)",
            }
        }
    }))
}

/// GET /api/health - database connectivity probe
async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match cqams_api::database::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "healthy",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "unhealthy",
                    "timestamp": now,
                    "error": e.to_string()
                }
            })),
        ),
    }
}
