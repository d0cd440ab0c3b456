use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Exactly one record per employee.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Compensation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub basic: Decimal,
    pub hra: Decimal,
    pub allowances: Decimal,
    pub currency: String,
    pub effective_from: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
