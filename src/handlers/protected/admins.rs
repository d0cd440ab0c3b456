use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::password;
use crate::database::models::user::{User, USER_TYPE_ADMIN};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role_id: Uuid,
}

/// GET /api/admin/admins - list admin users
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<User>> {
    auth.require("admin", "admin", "read")?;

    let pool = DatabaseManager::pool().await?;
    let admins: Vec<User> = sqlx::query_as(
        "SELECT * FROM users WHERE user_type = $1 ORDER BY created_at",
    )
    .bind(USER_TYPE_ADMIN)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(admins))
}

/// POST /api/admin/admins - create an admin user
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<Value>,
) -> ApiResult<User> {
    auth.require("admin", "admin", "create")?;

    let payload: CreateAdminRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;
    validate(&payload)?;

    let pool = DatabaseManager::pool().await?;

    // Role must exist before we hand it to the FK
    let role_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM roles WHERE id = $1")
        .bind(payload.role_id)
        .fetch_optional(&pool)
        .await?;
    if role_exists.is_none() {
        return Err(ApiError::field_error("role_id", "Role does not exist"));
    }

    let password_hash = password::hash_password(&payload.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    let admin: User = sqlx::query_as(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, phone, user_type, role_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(payload.email.trim().to_lowercase())
    .bind(&password_hash)
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(&payload.phone)
    .bind(USER_TYPE_ADMIN)
    .bind(payload.role_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::field_error("email", "An account with this email already exists")
        }
        _ => e.into(),
    })?;

    tracing::info!(admin = %admin.email, created_by = %auth.email, "admin created");
    Ok(ApiResponse::created(admin))
}

fn validate(payload: &CreateAdminRequest) -> Result<(), ApiError> {
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::field_error("email", "A valid email is required"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::field_error(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if payload.first_name.trim().is_empty() {
        return Err(ApiError::field_error("first_name", "First name is required"));
    }
    if payload.last_name.trim().is_empty() {
        return Err(ApiError::field_error("last_name", "Last name is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateAdminRequest {
        CreateAdminRequest {
            email: "ops@example.com".to_string(),
            password: "long-enough".to_string(),
            first_name: "Ops".to_string(),
            last_name: "Admin".to_string(),
            phone: None,
            role_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn accepts_valid_request() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        let mut r = request();
        r.email = "not-an-email".to_string();
        assert!(validate(&r).is_err());

        let mut r = request();
        r.password = "short".to_string();
        assert!(validate(&r).is_err());
    }
}
