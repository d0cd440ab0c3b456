use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::role::{Role, RoleWithPermissions};
use crate::database::models::Permission;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_ids: Vec<Uuid>,
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    id: Uuid,
    module: String,
    resource: String,
    action: String,
}

/// GET /api/roles - all roles with their permission references populated
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<RoleWithPermissions>> {
    auth.require("admin", "role", "read")?;

    let pool = DatabaseManager::pool().await?;

    let roles: Vec<Role> = sqlx::query_as("SELECT * FROM roles ORDER BY name")
        .fetch_all(&pool)
        .await?;

    let rows: Vec<RolePermissionRow> = sqlx::query_as(
        r#"
        SELECT rp.role_id, p.id, p.module, p.resource, p.action
        FROM role_permissions rp
        JOIN permissions p ON p.id = rp.permission_id
        ORDER BY p.module, p.resource, p.action
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let mut by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
    for row in rows {
        by_role.entry(row.role_id).or_default().push(Permission {
            id: row.id,
            module: row.module,
            resource: row.resource,
            action: row.action,
        });
    }

    let populated = roles
        .into_iter()
        .map(|role| {
            let permissions = by_role.remove(&role.id).unwrap_or_default();
            RoleWithPermissions { role, permissions }
        })
        .collect();

    Ok(ApiResponse::success(populated))
}

/// POST /api/roles - create a role and attach its permissions
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<Value>,
) -> ApiResult<RoleWithPermissions> {
    auth.require("admin", "role", "create")?;

    let payload: CreateRoleRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::field_error("name", "Role name is required"));
    }

    let pool = DatabaseManager::pool().await?;

    // All referenced permissions must exist before we write anything
    let permissions: Vec<Permission> =
        sqlx::query_as("SELECT * FROM permissions WHERE id = ANY($1)")
            .bind(&payload.permission_ids)
            .fetch_all(&pool)
            .await?;
    if permissions.len() != payload.permission_ids.len() {
        return Err(ApiError::field_error(
            "permission_ids",
            "One or more permissions do not exist",
        ));
    }

    let mut tx = pool.begin().await?;

    let role: Role = sqlx::query_as(
        "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(payload.name.trim())
    .bind(payload.description.trim())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::field_error("name", "A role with this name already exists")
        }
        _ => e.into(),
    })?;

    for permission_id in &payload.permission_ids {
        sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
            .bind(role.id)
            .bind(permission_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(role = %role.name, created_by = %auth.email, "role created");
    Ok(ApiResponse::created(RoleWithPermissions { role, permissions }))
}
