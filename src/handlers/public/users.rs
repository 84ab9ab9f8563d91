use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by register and login: the public user fields plus a bearer token
/// for clients that do not use the cookie.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// POST /api/users - register a new account
pub async fn register(
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserService::new()
        .await?
        .register(&body.email, &body.password)
        .await?;

    let token = issue_token(user.id)?;
    let cookie = auth::login_cookie(&token);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            id: user.id,
            email: user.email,
            token,
        }),
    ))
}

/// POST /api/users/login - authenticate and receive a token
pub async fn login(Json(body): Json<CredentialsRequest>) -> Result<impl IntoResponse, ApiError> {
    let user = UserService::new()
        .await?
        .authenticate(&body.email, &body.password)
        .await?;

    let token = issue_token(user.id)?;
    let cookie = auth::login_cookie(&token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            id: user.id,
            email: user.email,
            token,
        }),
    ))
}

fn issue_token(user_id: Uuid) -> Result<String, ApiError> {
    auth::generate_jwt(Claims::new(user_id)).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })
}
