use axum::Extension;
use serde::Serialize;

use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::navigation::{self, NavItem, RoleTheme};

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub role: String,
    pub theme: &'static RoleTheme,
    pub items: Vec<&'static NavItem>,
}

/// GET /api/navigation - navigation entries visible to this session plus
/// the role's colour theme. No permission gate: every authenticated user
/// gets their own (possibly empty) menu.
pub async fn get(Extension(auth): Extension<AuthUser>) -> ApiResult<NavigationResponse> {
    let items = navigation::nav_for(&auth.permissions);
    let theme = navigation::theme_for(&auth.role);

    Ok(ApiResponse::success(NavigationResponse {
        role: auth.role,
        theme,
        items,
    }))
}
