use axum::{
    extract::Path,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::password;
use crate::database::models::user::{User, USER_TYPE_EMPLOYEE};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub employment_status: Option<String>,
}

/// GET /api/admin/employees
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<User>> {
    auth.require("admin", "employee", "read")?;

    let pool = DatabaseManager::pool().await?;
    let employees: Vec<User> =
        sqlx::query_as("SELECT * FROM users WHERE user_type = $1 ORDER BY created_at")
            .bind(USER_TYPE_EMPLOYEE)
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(employees))
}

/// POST /api/admin/employees
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<Value>,
) -> ApiResult<User> {
    auth.require("admin", "employee", "create")?;

    let payload: CreateEmployeeRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;

    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::field_error("email", "A valid email is required"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::field_error(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(ApiError::validation_error("Name fields are required", None));
    }

    let pool = DatabaseManager::pool().await?;

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

    let employee: User = sqlx::query_as(
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
    .bind(USER_TYPE_EMPLOYEE)
    .bind(payload.role_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::field_error("email", "An account with this email already exists")
        }
        _ => e.into(),
    })?;

    tracing::info!(employee = %employee.email, created_by = %auth.email, "employee created");
    Ok(ApiResponse::created(employee))
}

/// GET /api/admin/employees/:id
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<User> {
    auth.require("admin", "employee", "read")?;

    let pool = DatabaseManager::pool().await?;
    let employee: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE id = $1 AND user_type = $2")
            .bind(id)
            .bind(USER_TYPE_EMPLOYEE)
            .fetch_optional(&pool)
            .await?;

    employee
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Employee {} not found", id)))
}

/// PUT /api/admin/employees/:id
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> ApiResult<User> {
    auth.require("admin", "employee", "update")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, id).await?;

    let employee: User = sqlx::query_as(
        r#"
        UPDATE users SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            phone = COALESCE($4, phone),
            employment_status = COALESCE($5, employment_status),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.phone)
    .bind(&payload.employment_status)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::success(employee))
}

/// DELETE /api/admin/employees/:id - removes the employee and, via FK
/// cascade, every child record.
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require("admin", "employee", "delete")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, id).await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    tracing::info!(employee_id = %id, deleted_by = %auth.email, "employee deleted");
    Ok(ApiResponse::success(()).with_message("Employee deleted"))
}
