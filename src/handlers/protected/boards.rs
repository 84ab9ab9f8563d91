use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::BoardService;

#[derive(Debug, Deserialize)]
pub struct BoardRequest {
    pub title: Option<String>,
}

/// GET /api/boards - all boards owned by the caller
pub async fn list(Extension(user): Extension<AuthUser>) -> Result<impl IntoResponse, ApiError> {
    let boards = BoardService::new().await?.list(user.id).await?;
    Ok(Json(boards))
}

/// POST /api/boards - create a board owned by the caller
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<BoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = body.title.unwrap_or_default();
    let board = BoardService::new().await?.create(user.id, &title).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

/// PUT /api/boards/:id - rename a board
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<BoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let board = BoardService::new()
        .await?
        .update(user.id, id, body.title.as_deref())
        .await?;
    Ok(Json(board))
}

/// DELETE /api/boards/:id - delete a board and its todos
pub async fn remove(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    BoardService::new().await?.delete(user.id, id).await?;
    Ok(Json(json!({ "message": "Board removed" })))
}
