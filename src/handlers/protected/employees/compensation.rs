use axum::{extract::Path, Extension, Json};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Compensation;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CompensationPayload {
    pub basic: Decimal,
    #[serde(default)]
    pub hra: Decimal,
    #[serde(default)]
    pub allowances: Decimal,
    pub currency: String,
    pub effective_from: NaiveDate,
}

impl CompensationPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.basic <= Decimal::ZERO {
            return Err(ApiError::field_error("basic", "Basic pay must be positive"));
        }
        if self.hra < Decimal::ZERO || self.allowances < Decimal::ZERO {
            return Err(ApiError::validation_error(
                "Compensation components cannot be negative",
                None,
            ));
        }
        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ApiError::field_error(
                "currency",
                "Currency must be a 3-letter code",
            ));
        }
        Ok(())
    }
}

/// GET /api/admin/employees/:id/compensation
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<Compensation> {
    auth.require("admin", "employee", "read")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let record: Option<Compensation> =
        sqlx::query_as("SELECT * FROM compensation WHERE employee_id = $1")
            .bind(employee_id)
            .fetch_optional(&pool)
            .await?;

    record
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("No compensation record for this employee"))
}

/// POST /api/admin/employees/:id/compensation - rejected with 400 when a
/// record already exists; use PUT to update.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<CompensationPayload>,
) -> ApiResult<Compensation> {
    auth.require("admin", "employee", "update")?;
    payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM compensation WHERE employee_id = $1")
            .bind(employee_id)
            .fetch_optional(&pool)
            .await?;
    if existing.is_some() {
        return Err(ApiError::bad_request(
            "A compensation record already exists for this employee",
        ));
    }

    let record: Compensation = sqlx::query_as(
        r#"
        INSERT INTO compensation (employee_id, basic, hra, allowances, currency, effective_from)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(payload.basic)
    .bind(payload.hra)
    .bind(payload.allowances)
    .bind(payload.currency.trim().to_uppercase())
    .bind(payload.effective_from)
    .fetch_one(&pool)
    .await
    .map_err(|e| match &e {
        // Concurrent POST lost the race; same contract as the explicit check
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::bad_request(
            "A compensation record already exists for this employee",
        ),
        _ => e.into(),
    })?;

    Ok(ApiResponse::created(record))
}

/// PUT /api/admin/employees/:id/compensation - updates in place, creating
/// the record when absent.
pub async fn upsert(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<CompensationPayload>,
) -> ApiResult<Compensation> {
    auth.require("admin", "employee", "update")?;
    payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let record = upsert_compensation(&pool, employee_id, &payload).await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/admin/employees/:id/compensation
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require("admin", "employee", "update")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let result = sqlx::query("DELETE FROM compensation WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("No compensation record for this employee"));
    }

    Ok(ApiResponse::success(()).with_message("Compensation record deleted"))
}

pub(crate) async fn upsert_compensation(
    pool: &PgPool,
    employee_id: Uuid,
    payload: &CompensationPayload,
) -> Result<Compensation, ApiError> {
    let record: Compensation = sqlx::query_as(
        r#"
        INSERT INTO compensation (employee_id, basic, hra, allowances, currency, effective_from)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (employee_id) DO UPDATE SET
            basic = EXCLUDED.basic,
            hra = EXCLUDED.hra,
            allowances = EXCLUDED.allowances,
            currency = EXCLUDED.currency,
            effective_from = EXCLUDED.effective_from,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(payload.basic)
    .bind(payload.hra)
    .bind(payload.allowances)
    .bind(payload.currency.trim().to_uppercase())
    .bind(payload.effective_from)
    .fetch_one(pool)
    .await?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CompensationPayload {
        CompensationPayload {
            basic: Decimal::new(50_000, 0),
            hra: Decimal::new(20_000, 0),
            allowances: Decimal::ZERO,
            currency: "INR".to_string(),
            effective_from: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn non_positive_basic_is_rejected() {
        let mut bad = payload();
        bad.basic = Decimal::ZERO;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn currency_must_be_three_letters() {
        let mut bad = payload();
        bad.currency = "RUPEES".to_string();
        assert!(bad.validate().is_err());

        let mut bad = payload();
        bad.currency = "1<%".to_string();
        assert!(bad.validate().is_err());
    }
}
