use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One record per employee.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmploymentDetail {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub designation: String,
    pub department: String,
    pub employment_type: String,
    pub joined_at: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
