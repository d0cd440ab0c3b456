use axum::{extract::Path, Extension, Json};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::user::USER_TYPE_EMPLOYEE;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::onboarding::{OnboardingState, OnboardingStep};

use super::{bank_accounts, compensation, documents, employment};

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub employee_id: Uuid,
    pub current_step: &'static str,
    pub complete: bool,
    pub steps: Vec<&'static str>,
}

impl OnboardingResponse {
    fn new(employee_id: Uuid, state: OnboardingState) -> Self {
        Self {
            employee_id,
            current_step: state.current.as_str(),
            complete: state.complete,
            steps: OnboardingStep::SEQUENCE.iter().map(|s| s.as_str()).collect(),
        }
    }
}

/// GET /api/admin/employees/:id/onboarding - wizard position
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<OnboardingResponse> {
    auth.require("onboarding", "workflow", "read")?;

    let pool = DatabaseManager::pool().await?;
    let state = load_state(&pool, employee_id).await?;

    Ok(ApiResponse::success(OnboardingResponse::new(employee_id, state)))
}

/// PUT /api/admin/employees/:id/onboarding/:step - save a step. The gate
/// must pass; on success the payload is applied to the matching child
/// resource and the wizard position advances.
pub async fn save_step(
    Extension(auth): Extension<AuthUser>,
    Path((employee_id, step)): Path<(Uuid, String)>,
    Json(payload): Json<Value>,
) -> ApiResult<OnboardingResponse> {
    auth.require("onboarding", "workflow", "update")?;

    let step = OnboardingStep::parse(&step)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown onboarding step: {}", step)))?;

    let pool = DatabaseManager::pool().await?;
    let state = load_state(&pool, employee_id).await?;
    let next = state.save_step(step, &payload)?;

    apply_step(&pool, employee_id, step, &payload).await?;
    persist_state(&pool, employee_id, next).await?;

    tracing::info!(employee_id = %employee_id, step = step.as_str(), by = %auth.email, "onboarding step saved");
    Ok(ApiResponse::success(OnboardingResponse::new(employee_id, next)))
}

/// POST /api/admin/employees/:id/onboarding/review - skip ahead to review
pub async fn skip_to_review(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<OnboardingResponse> {
    auth.require("onboarding", "workflow", "update")?;

    let pool = DatabaseManager::pool().await?;
    let state = load_state(&pool, employee_id).await?;
    let next = state.skip_to_review()?;

    persist_state(&pool, employee_id, next).await?;
    Ok(ApiResponse::success(OnboardingResponse::new(employee_id, next)))
}

/// POST /api/admin/employees/:id/onboarding/complete
pub async fn complete(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<OnboardingResponse> {
    auth.require("onboarding", "workflow", "update")?;

    let pool = DatabaseManager::pool().await?;
    let state = load_state(&pool, employee_id).await?;
    let done = state.complete()?;

    persist_state(&pool, employee_id, done).await?;

    tracing::info!(employee_id = %employee_id, by = %auth.email, "onboarding completed");
    Ok(ApiResponse::success(OnboardingResponse::new(employee_id, done))
        .with_message("Onboarding complete"))
}

async fn load_state(pool: &PgPool, employee_id: Uuid) -> Result<OnboardingState, ApiError> {
    let row: Option<(Option<String>, bool)> = sqlx::query_as(
        "SELECT onboarding_step, onboarding_complete FROM users WHERE id = $1 AND user_type = $2",
    )
    .bind(employee_id)
    .bind(USER_TYPE_EMPLOYEE)
    .fetch_optional(pool)
    .await?;

    let (step, complete) =
        row.ok_or_else(|| ApiError::not_found(format!("Employee {} not found", employee_id)))?;

    OnboardingState::from_row(step.as_deref(), complete).map_err(|e| {
        tracing::error!("Corrupt onboarding state for {}: {}", employee_id, e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })
}

async fn persist_state(
    pool: &PgPool,
    employee_id: Uuid,
    state: OnboardingState,
) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE users SET onboarding_step = $2, onboarding_complete = $3, updated_at = now() WHERE id = $1",
    )
    .bind(employee_id)
    .bind(state.current.as_str())
    .bind(state.complete)
    .execute(pool)
    .await?;
    Ok(())
}

/// Apply a gated step payload to its child resource. The review step has
/// no side effect; basic info lands on the user row itself.
async fn apply_step(
    pool: &PgPool,
    employee_id: Uuid,
    step: OnboardingStep,
    payload: &Value,
) -> Result<(), ApiError> {
    let decode = |e: serde_json::Error| ApiError::bad_request(format!("Invalid step payload: {}", e));

    match step {
        OnboardingStep::BasicInfo => {
            let first_name = payload["first_name"].as_str().unwrap_or_default().trim().to_string();
            let last_name = payload["last_name"].as_str().unwrap_or_default().trim().to_string();
            let email = payload["email"].as_str().unwrap_or_default().trim().to_lowercase();
            let phone = payload.get("phone").and_then(Value::as_str).map(str::to_string);

            sqlx::query(
                "UPDATE users SET first_name = $2, last_name = $3, email = $4, phone = COALESCE($5, phone), updated_at = now() WHERE id = $1",
            )
            .bind(employee_id)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(phone)
            .execute(pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    ApiError::field_error("email", "An account with this email already exists")
                }
                _ => e.into(),
            })?;
        }
        OnboardingStep::Employment => {
            let detail: employment::EmploymentPayload =
                serde_json::from_value(payload.clone()).map_err(decode)?;
            employment::upsert_employment(pool, employee_id, &detail).await?;
        }
        OnboardingStep::Compensation => {
            let detail: compensation::CompensationPayload =
                serde_json::from_value(payload.clone()).map_err(decode)?;
            compensation::upsert_compensation(pool, employee_id, &detail).await?;
        }
        OnboardingStep::BankAccount => {
            let detail: bank_accounts::BankAccountPayload =
                serde_json::from_value(payload.clone()).map_err(decode)?;
            bank_accounts::replace_bank_account(pool, employee_id, &detail).await?;
        }
        OnboardingStep::Documents => {
            let list: Vec<documents::DocumentPayload> =
                serde_json::from_value(payload["documents"].clone()).map_err(decode)?;
            documents::replace_documents(pool, employee_id, &list).await?;
        }
        OnboardingStep::Review => {}
    }

    Ok(())
}
