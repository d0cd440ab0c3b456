use axum::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
}

/// GET /api/auth/whoami - the session's embedded role/permissions snapshot.
pub async fn whoami(Extension(auth): Extension<AuthUser>) -> ApiResult<WhoamiResponse> {
    Ok(ApiResponse::success(WhoamiResponse {
        user_id: auth.user_id,
        email: auth.email,
        role: auth.role,
        permissions: auth.raw_permissions,
    }))
}
