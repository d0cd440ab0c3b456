use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Unique per (account_number, ifsc_code) across the whole system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BankAccount {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub account_holder: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
    pub branch: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}
