use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::models::TodoStatus;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::TodoService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    // Accepted as a string so a missing or malformed id is a validation
    // failure rather than a body-rejection
    pub board_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
}

/// GET /api/todos/:boardId - todos on one of the caller's boards
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Path(board_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let todos = TodoService::new()
        .await?
        .list_for_board(user.id, board_id)
        .await?;
    Ok(Json(todos))
}

/// POST /api/todos - create a todo on one of the caller's boards
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let board_id = body
        .board_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::validation_error("Board ID is required"))?;
    let board_id = Uuid::parse_str(board_id)
        .map_err(|_| ApiError::validation_error("Board ID is invalid"))?;

    let todo = TodoService::new()
        .await?
        .create(
            user.id,
            board_id,
            &body.title,
            body.description.as_deref(),
            body.status,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// PUT /api/todos/id/:id - partial update of a todo
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = TodoService::new()
        .await?
        .update(
            user.id,
            id,
            body.title.as_deref(),
            body.description.as_deref(),
            body.status,
        )
        .await?;
    Ok(Json(todo))
}

/// DELETE /api/todos/id/:id - delete a single todo
pub async fn remove(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    TodoService::new().await?.delete(user.id, id).await?;
    Ok(Json(json!({ "message": "Todo removed" })))
}
