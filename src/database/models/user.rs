use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Admins and employees share one table, discriminated by `user_type`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub user_type: String,
    pub employment_status: String,
    pub role_id: Uuid,
    pub onboarding_step: Option<String>,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const USER_TYPE_ADMIN: &str = "admin";
pub const USER_TYPE_EMPLOYEE: &str = "employee";
