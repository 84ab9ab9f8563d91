use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;
use crate::services::UserService;

/// Authenticated user context attached to every protected request.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: uuid::Uuid,
    pub email: String,
}

/// JWT authentication middleware guarding the board and todo routes.
///
/// Resolves the token subject to a live user record on every request, so
/// tokens for since-deleted accounts stop working immediately.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Not authorized, no token"))?;

    let claims = validate_jwt(&token)?;

    let user = UserService::new()
        .await?
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::debug!("token subject {} has no user record", claims.sub);
            ApiError::unauthorized("Not authorized, token failed")
        })?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}

/// The login cookie takes precedence; a bearer token is the fallback.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookie_name = &config::config().security.auth_cookie_name;
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name.as_str())
        .map(|(_, value)| value.to_string())
        .filter(|token| !token.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Validate signature and expiry. Invalid, expired, and unverifiable tokens
/// all produce the same client-visible 401; the cause only reaches the log.
fn validate_jwt(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(ApiError::unauthorized("JWT secret not configured"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!("token rejected: {}", e);
        ApiError::unauthorized("Not authorized, token failed")
    })?;

    Ok(token_data.claims)
}
