use axum::{extract::Path, Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::EmploymentDetail;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Clone, Deserialize)]
pub struct EmploymentPayload {
    pub designation: String,
    pub department: String,
    pub employment_type: String,
    pub joined_at: NaiveDate,
    pub status: Option<String>,
}

impl EmploymentPayload {
    fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("designation", &self.designation),
            ("department", &self.department),
            ("employment_type", &self.employment_type),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::field_error(field, format!("'{}' is required", field)));
            }
        }
        Ok(())
    }
}

/// GET /api/admin/employees/:id/employment
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<EmploymentDetail> {
    auth.require("admin", "employee", "read")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let record: Option<EmploymentDetail> =
        sqlx::query_as("SELECT * FROM employment_details WHERE employee_id = $1")
            .bind(employee_id)
            .fetch_optional(&pool)
            .await?;

    record
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("No employment record for this employee"))
}

/// POST /api/admin/employees/:id/employment - one record per employee
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<EmploymentPayload>,
) -> ApiResult<EmploymentDetail> {
    auth.require("admin", "employee", "update")?;
    payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let record: EmploymentDetail = sqlx::query_as(
        r#"
        INSERT INTO employment_details
            (employee_id, designation, department, employment_type, joined_at, status)
        VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'active'))
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(&payload.designation)
    .bind(&payload.department)
    .bind(&payload.employment_type)
    .bind(payload.joined_at)
    .bind(&payload.status)
    .fetch_one(&pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::bad_request(
            "An employment record already exists for this employee",
        ),
        _ => e.into(),
    })?;

    Ok(ApiResponse::created(record))
}

/// PUT /api/admin/employees/:id/employment - update in place, creating
/// the record when absent.
pub async fn upsert(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<EmploymentPayload>,
) -> ApiResult<EmploymentDetail> {
    auth.require("admin", "employee", "update")?;
    payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let record = upsert_employment(&pool, employee_id, &payload).await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/admin/employees/:id/employment
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require("admin", "employee", "update")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let result = sqlx::query("DELETE FROM employment_details WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("No employment record for this employee"));
    }

    Ok(ApiResponse::success(()).with_message("Employment record deleted"))
}

pub(crate) async fn upsert_employment(
    pool: &PgPool,
    employee_id: Uuid,
    payload: &EmploymentPayload,
) -> Result<EmploymentDetail, ApiError> {
    let record: EmploymentDetail = sqlx::query_as(
        r#"
        INSERT INTO employment_details
            (employee_id, designation, department, employment_type, joined_at, status)
        VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'active'))
        ON CONFLICT (employee_id) DO UPDATE SET
            designation = EXCLUDED.designation,
            department = EXCLUDED.department,
            employment_type = EXCLUDED.employment_type,
            joined_at = EXCLUDED.joined_at,
            status = EXCLUDED.status,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(&payload.designation)
    .bind(&payload.department)
    .bind(&payload.employment_type)
    .bind(payload.joined_at)
    .bind(&payload.status)
    .fetch_one(pool)
    .await?;
    Ok(record)
}
