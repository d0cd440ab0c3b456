use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata for a file stored by an external media host.
/// One document per (employee, document_type).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub document_type: String,
    pub file_name: String,
    pub file_url: String,
    pub provider_public_id: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}
