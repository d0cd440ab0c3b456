use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Address;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Clone, Deserialize)]
pub struct AddressPayload {
    pub address_type: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl AddressPayload {
    fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("address_type", &self.address_type),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::field_error(field, format!("'{}' is required", field)));
            }
        }
        Ok(())
    }
}

/// GET /api/admin/employees/:id/addresses
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<Vec<Address>> {
    auth.require("admin", "employee", "read")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let addresses: Vec<Address> =
        sqlx::query_as("SELECT * FROM addresses WHERE employee_id = $1 ORDER BY created_at")
            .bind(employee_id)
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(addresses))
}

/// POST /api/admin/employees/:id/addresses - append one address
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<AddressPayload>,
) -> ApiResult<Address> {
    auth.require("admin", "employee", "update")?;
    payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let address = insert_address(&pool, employee_id, &payload).await?;
    Ok(ApiResponse::created(address))
}

/// PUT /api/admin/employees/:id/addresses - replace-all: delete every
/// existing address, then store exactly the submitted set.
pub async fn replace_all(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<Vec<AddressPayload>>,
) -> ApiResult<Vec<Address>> {
    auth.require("admin", "employee", "update")?;
    for address in &payload {
        address.validate()?;
    }

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM addresses WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    let mut stored = Vec::with_capacity(payload.len());
    for address in &payload {
        let row: Address = sqlx::query_as(
            r#"
            INSERT INTO addresses
                (employee_id, address_type, line1, line2, city, state, postal_code, country, is_primary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(&address.address_type)
        .bind(&address.line1)
        .bind(&address.line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.is_primary)
        .fetch_one(&mut *tx)
        .await?;
        stored.push(row);
    }

    tx.commit().await?;
    Ok(ApiResponse::success(stored))
}

/// DELETE /api/admin/employees/:id/addresses - remove every address
pub async fn delete_all(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require("admin", "employee", "update")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let result = sqlx::query("DELETE FROM addresses WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::success(())
        .with_message(format!("Removed {} address(es)", result.rows_affected())))
}

pub(crate) async fn insert_address(
    pool: &PgPool,
    employee_id: Uuid,
    payload: &AddressPayload,
) -> Result<Address, ApiError> {
    let address: Address = sqlx::query_as(
        r#"
        INSERT INTO addresses
            (employee_id, address_type, line1, line2, city, state, postal_code, country, is_primary)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(&payload.address_type)
    .bind(&payload.line1)
    .bind(&payload.line2)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.postal_code)
    .bind(&payload.country)
    .bind(payload.is_primary)
    .fetch_one(pool)
    .await?;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_requires_core_fields() {
        let payload = AddressPayload {
            address_type: "permanent".to_string(),
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
            country: "IN".to_string(),
            is_primary: true,
        };
        assert!(payload.validate().is_ok());

        let mut missing_city = payload.clone();
        missing_city.city = "  ".to_string();
        assert!(missing_city.validate().is_err());
    }
}
