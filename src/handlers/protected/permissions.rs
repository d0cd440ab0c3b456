use axum::Extension;
use std::collections::BTreeMap;

use crate::database::models::Permission;
use crate::database::DatabaseManager;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

/// GET /api/permissions - the catalog grouped by module
pub async fn list(
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<BTreeMap<String, Vec<Permission>>> {
    auth.require("admin", "permission", "read")?;

    let pool = DatabaseManager::pool().await?;
    let permissions: Vec<Permission> =
        sqlx::query_as("SELECT * FROM permissions ORDER BY module, resource, action")
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(group_by_module(permissions)))
}

/// Group catalog rows by module, preserving row order within each group.
fn group_by_module(permissions: Vec<Permission>) -> BTreeMap<String, Vec<Permission>> {
    let mut grouped: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
    for permission in permissions {
        grouped
            .entry(permission.module.clone())
            .or_default()
            .push(permission);
    }
    grouped
}
