use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable reference data: one (module, resource, action) triple per row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub module: String,
    pub resource: String,
    pub action: String,
}

impl Permission {
    /// Flattened form embedded in JWT claims.
    pub fn flatten(&self) -> String {
        format!("{}:{}:{}", self.module, self.resource, self.action)
    }
}
