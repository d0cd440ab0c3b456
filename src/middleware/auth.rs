use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::authz::PermissionSet;
use crate::error::ApiError;

/// Session cookie consulted when no Authorization header is present.
const AUTH_COOKIE: &str = "cqams_token";

/// Authenticated session context extracted from the JWT.
/// The permission set is precomputed once per request from the claims
/// snapshot so handler checks are O(1) lookups.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub permissions: PermissionSet,
    pub raw_permissions: Vec<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.sub,
            role: claims.role,
            permissions: PermissionSet::from_flattened(&claims.permissions),
            raw_permissions: claims.permissions,
        }
    }
}

impl AuthUser {
    /// Authorize the requested (module, resource, action) or fail with 403.
    pub fn require(&self, module: &str, resource: &str, action: &str) -> Result<(), ApiError> {
        if self.permissions.allows(module, resource, action) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Role '{}' lacks permission {}:{}:{}",
                self.role, module, resource, action
            )))
        }
    }
}

/// JWT authentication middleware: validates the session token and injects
/// the AuthUser context into the request.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers).map_err(ApiError::unauthorized)?;

    let claims =
        validate_jwt(&token).map_err(|e| ApiError::unauthorized(format!("Invalid session: {}", e)))?;

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Pull the session token from the Authorization header, falling back to
/// the auth cookie.
fn extract_token(headers: &HeaderMap) -> Result<String, String> {
    if let Some(auth_header) = headers.get("authorization") {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
            Some(_) => Err("Empty bearer token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    if let Some(token) = extract_cookie_token(headers) {
        return Ok(token);
    }

    Err("Missing session token".to_string())
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == AUTH_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}
