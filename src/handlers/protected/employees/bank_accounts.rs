use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::models::BankAccount;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Clone, Deserialize)]
pub struct BankAccountPayload {
    pub account_holder: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
    pub branch: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl BankAccountPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.account_holder.trim().is_empty() {
            return Err(ApiError::field_error("account_holder", "Account holder is required"));
        }
        if self.account_number.trim().is_empty()
            || !self.account_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ApiError::field_error(
                "account_number",
                "Account number must be numeric",
            ));
        }
        // IFSC: 4 letters, a zero, 6 alphanumerics
        let ifsc = self.ifsc_code.trim();
        let well_formed = ifsc.len() == 11
            && ifsc.chars().take(4).all(|c| c.is_ascii_uppercase())
            && ifsc.as_bytes()[4] == b'0'
            && ifsc.chars().skip(5).all(|c| c.is_ascii_alphanumeric());
        if !well_formed {
            return Err(ApiError::field_error("ifsc_code", "Invalid IFSC code"));
        }
        if self.bank_name.trim().is_empty() {
            return Err(ApiError::field_error("bank_name", "Bank name is required"));
        }
        Ok(())
    }
}

/// GET /api/admin/employees/:id/bank-accounts
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<Vec<BankAccount>> {
    auth.require("admin", "employee", "read")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let accounts: Vec<BankAccount> =
        sqlx::query_as("SELECT * FROM bank_accounts WHERE employee_id = $1 ORDER BY created_at")
            .bind(employee_id)
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(accounts))
}

/// POST /api/admin/employees/:id/bank-accounts - a duplicate
/// (account_number, ifsc_code) pair anywhere in the system is rejected
/// with 400.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<BankAccountPayload>,
) -> ApiResult<BankAccount> {
    auth.require("admin", "employee", "update")?;
    payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let account = insert_bank_account(&pool, employee_id, &payload).await?;
    Ok(ApiResponse::created(account))
}

/// PUT /api/admin/employees/:id/bank-accounts - replace-all
pub async fn replace_all(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<Vec<BankAccountPayload>>,
) -> ApiResult<Vec<BankAccount>> {
    auth.require("admin", "employee", "update")?;
    for account in &payload {
        account.validate()?;
    }
    reject_duplicates_within(&payload)?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM bank_accounts WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    let mut stored = Vec::with_capacity(payload.len());
    for account in &payload {
        let row: BankAccount = sqlx::query_as(
            r#"
            INSERT INTO bank_accounts
                (employee_id, account_holder, account_number, ifsc_code, bank_name, branch, is_primary)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(&account.account_holder)
        .bind(account.account_number.trim())
        .bind(account.ifsc_code.trim())
        .bind(&account.bank_name)
        .bind(&account.branch)
        .bind(account.is_primary)
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_to_400)?;
        stored.push(row);
    }

    tx.commit().await?;
    Ok(ApiResponse::success(stored))
}

/// DELETE /api/admin/employees/:id/bank-accounts
pub async fn delete_all(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require("admin", "employee", "update")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let result = sqlx::query("DELETE FROM bank_accounts WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::success(())
        .with_message(format!("Removed {} bank account(s)", result.rows_affected())))
}

pub(crate) async fn insert_bank_account(
    pool: &PgPool,
    employee_id: Uuid,
    payload: &BankAccountPayload,
) -> Result<BankAccount, ApiError> {
    let account: BankAccount = sqlx::query_as(
        r#"
        INSERT INTO bank_accounts
            (employee_id, account_holder, account_number, ifsc_code, bank_name, branch, is_primary)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(&payload.account_holder)
    .bind(payload.account_number.trim())
    .bind(payload.ifsc_code.trim())
    .bind(&payload.bank_name)
    .bind(&payload.branch)
    .bind(payload.is_primary)
    .fetch_one(pool)
    .await
    .map_err(duplicate_to_400)?;
    Ok(account)
}

/// Swap the employee's accounts for the submitted one. The onboarding
/// wizard saves through this so a revisited step overwrites the earlier
/// entry rather than inserting alongside it.
pub(crate) async fn replace_bank_account(
    pool: &PgPool,
    employee_id: Uuid,
    payload: &BankAccountPayload,
) -> Result<BankAccount, ApiError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM bank_accounts WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    let account: BankAccount = sqlx::query_as(
        r#"
        INSERT INTO bank_accounts
            (employee_id, account_holder, account_number, ifsc_code, bank_name, branch, is_primary)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(&payload.account_holder)
    .bind(payload.account_number.trim())
    .bind(payload.ifsc_code.trim())
    .bind(&payload.bank_name)
    .bind(&payload.branch)
    .bind(payload.is_primary)
    .fetch_one(&mut *tx)
    .await
    .map_err(duplicate_to_400)?;

    tx.commit().await?;
    Ok(account)
}

fn duplicate_to_400(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::bad_request(
            "A bank account with this account number and IFSC code already exists",
        ),
        _ => e.into(),
    }
}

fn reject_duplicates_within(payload: &[BankAccountPayload]) -> Result<(), ApiError> {
    let mut seen = HashSet::new();
    for account in payload {
        let key = (
            account.account_number.trim().to_string(),
            account.ifsc_code.trim().to_string(),
        );
        if !seen.insert(key) {
            return Err(ApiError::bad_request(
                "Duplicate (account_number, ifsc_code) pair in submitted set",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> BankAccountPayload {
        BankAccountPayload {
            account_holder: "Asha Rao".to_string(),
            account_number: "001234567890".to_string(),
            ifsc_code: "HDFC0001234".to_string(),
            bank_name: "HDFC".to_string(),
            branch: None,
            is_primary: true,
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn ifsc_format_is_checked() {
        let mut bad = payload();
        bad.ifsc_code = "HD0001234".to_string();
        assert!(bad.validate().is_err());

        let mut bad = payload();
        bad.ifsc_code = "HDFC1001234".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn account_number_must_be_numeric() {
        let mut bad = payload();
        bad.account_number = "12ab34".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn duplicate_pairs_in_set_are_rejected() {
        let accounts = vec![payload(), payload()];
        assert!(reject_duplicates_within(&accounts).is_err());

        let mut second = payload();
        second.account_number = "009876543210".to_string();
        assert!(reject_duplicates_within(&[payload(), second]).is_ok());
    }
}
