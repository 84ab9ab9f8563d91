use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Claims carried by the login cookie or bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        let expiry_days = config::config().security.token_expiry_days;
        let exp = (now + Duration::days(expiry_days)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Build the Set-Cookie value for a freshly issued login token.
///
/// HttpOnly keeps the token out of reach of page scripts. SameSite is Strict
/// in development; in production the web client is served from a different
/// origin, so the cookie must be SameSite=None and Secure.
pub fn login_cookie(token: &str) -> String {
    let config = config::config();
    let security = &config.security;
    let max_age = security.token_expiry_days * 24 * 60 * 60;

    if config.environment.is_production() {
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=None; Secure",
            security.auth_cookie_name, token, max_age
        )
    } else {
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
            security.auth_cookie_name, token, max_age
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_expire_after_configured_days() {
        let claims = Claims::new(Uuid::new_v4());
        let days = config::config().security.token_expiry_days;
        assert_eq!(claims.exp - claims.iat, days * 24 * 60 * 60);
    }

    #[test]
    fn login_cookie_is_http_only_with_max_age() {
        let cookie = login_cookie("abc.def.ghi");
        let name = &config::config().security.auth_cookie_name;
        assert!(cookie.starts_with(&format!("{}=abc.def.ghi;", name)));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age="));
        assert!(cookie.contains("Path=/"));
    }
}
