use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

pub mod password;

/// JWT claims carrying the session's role and permissions snapshot.
/// Permissions are flattened "module:resource:action" strings so the
/// authorization check never needs a database round trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: String,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: String, user_id: Uuid, role: String, permissions: Vec<String>) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: email,
            user_id,
            role,
            permissions,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    TokenValidation(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::TokenValidation(msg) => write!(f, "JWT validation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Sign claims with an explicit secret
pub fn sign_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify a token with an explicit secret and return its claims
pub fn verify_with_secret(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::TokenValidation(e.to_string()))
}

/// Sign claims using the configured secret
pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    sign_with_secret(&claims, &config::config().security.jwt_secret)
}

/// Verify a token using the configured secret
pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    verify_with_secret(token, &config::config().security.jwt_secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> Claims {
        Claims {
            sub: "admin@example.com".to_string(),
            user_id: Uuid::new_v4(),
            role: "hr_admin".to_string(),
            permissions: vec!["admin:employee:read".to_string()],
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let claims = sample_claims();
        let token = sign_with_secret(&claims, "test-secret").unwrap();
        let decoded = verify_with_secret(&token, "test-secret").unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, "hr_admin");
        assert_eq!(decoded.permissions, claims.permissions);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_with_secret(&sample_claims(), "test-secret").unwrap();
        assert!(verify_with_secret(&token, "other-secret").is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            sign_with_secret(&sample_claims(), ""),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = sample_claims();
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = sign_with_secret(&claims, "test-secret").unwrap();
        assert!(verify_with_secret(&token, "test-secret").is_err());
    }
}
