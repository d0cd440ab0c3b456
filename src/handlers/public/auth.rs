use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::{self, password, Claims};
use crate::config;
use crate::database::models::Permission;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct LoginRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    role_name: String,
}

/// POST /auth/login - authenticate and issue a JWT carrying the role and
/// permissions snapshot.
pub async fn login(Json(payload): Json<Value>) -> ApiResult<LoginResponse> {
    let payload: LoginRequest = serde_json::from_value(payload)
        .map_err(|_| ApiError::bad_request("Request body must include email and password"))?;

    if payload.email.trim().is_empty() {
        return Err(ApiError::field_error("email", "Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::field_error("password", "Password is required"));
    }

    let pool = DatabaseManager::pool().await?;

    let row: Option<LoginRow> = sqlx::query_as(
        r#"
        SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name, r.name AS role_name
        FROM users u
        JOIN roles r ON r.id = u.role_id
        WHERE u.email = $1
        "#,
    )
    .bind(payload.email.trim())
    .fetch_optional(&pool)
    .await?;

    // Same message for unknown email and bad password
    let user = row.ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let valid = password::verify_password(&payload.password, &user.password_hash).map_err(|e| {
        tracing::error!("Stored password hash is malformed for {}: {}", user.id, e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    if !valid {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let permissions: Vec<Permission> = sqlx::query_as(
        r#"
        SELECT p.id, p.module, p.resource, p.action
        FROM permissions p
        JOIN role_permissions rp ON rp.permission_id = p.id
        JOIN users u ON u.role_id = rp.role_id
        WHERE u.id = $1
        "#,
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await?;

    let flattened: Vec<String> = permissions.iter().map(Permission::flatten).collect();

    let claims = Claims::new(
        user.email.clone(),
        user.id,
        user.role_name.clone(),
        flattened.clone(),
    );
    let token = auth::generate_jwt(claims).map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal_server_error("Failed to create session")
    })?;

    let expires_in = config::config().security.jwt_expiry_hours as i64 * 3600;

    tracing::info!(user = %user.email, role = %user.role_name, "login succeeded");

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in,
        user: SessionUser {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role_name,
            permissions: flattened,
        },
    }))
}
