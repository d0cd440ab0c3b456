pub mod addresses;
pub mod bank_accounts;
pub mod compensation;
pub mod crud;
pub mod documents;
pub mod employment;
pub mod onboarding;

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::user::USER_TYPE_EMPLOYEE;
use crate::error::ApiError;

/// 404 unless the id refers to an employee. Child-resource handlers call
/// this before touching their own tables.
pub(crate) async fn ensure_employee(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE id = $1 AND user_type = $2")
            .bind(id)
            .bind(USER_TYPE_EMPLOYEE)
            .fetch_optional(pool)
            .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found(format!("Employee {} not found", id))),
    }
}
