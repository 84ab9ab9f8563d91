use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Todo, TodoStatus};
use crate::database::{Database, DatabaseError};
use crate::error::ApiError;
use crate::services::BoardService;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

pub struct TodoService {
    pool: PgPool,
    boards: BoardService,
}

impl TodoService {
    pub async fn new() -> Result<Self, ApiError> {
        Ok(Self {
            pool: Database::pool().await?,
            boards: BoardService::new().await?,
        })
    }

    /// Todos on a board, after checking the board belongs to the caller.
    pub async fn list_for_board(
        &self,
        user_id: Uuid,
        board_id: Uuid,
    ) -> Result<Vec<Todo>, ApiError> {
        let board = self.boards.authorize(user_id, board_id).await?;

        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, status, board_id, created_at, updated_at \
             FROM todos WHERE board_id = $1 ORDER BY created_at",
        )
        .bind(board.id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(todos)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        title: &str,
        description: Option<&str>,
        status: Option<TodoStatus>,
    ) -> Result<Todo, ApiError> {
        let title = title.trim();
        validate_title(title)?;
        if let Some(description) = description {
            validate_description(description)?;
        }

        // The board must resolve and belong to the caller before anything is written
        let board = self.boards.authorize(user_id, board_id).await?;

        let todo = sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (title, description, status, board_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, title, description, status, board_id, created_at, updated_at",
        )
        .bind(title)
        .bind(description)
        .bind(status.unwrap_or_default())
        .bind(board.id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(todo)
    }

    /// Apply only the supplied fields. An absent or empty title keeps the old
    /// one; a supplied empty description clears it, an absent one is left
    /// alone; an absent status keeps the old status.
    pub async fn update(
        &self,
        user_id: Uuid,
        todo_id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<TodoStatus>,
    ) -> Result<Todo, ApiError> {
        let todo = self
            .find_by_id(todo_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Todo not found"))?;

        // Ownership is transitive: the todo's board must belong to the caller
        self.boards.authorize(user_id, todo.board_id).await?;

        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => {
                validate_title(t)?;
                t.to_string()
            }
            _ => todo.title,
        };

        let description = match description {
            Some(d) => {
                validate_description(d)?;
                if d.is_empty() {
                    None
                } else {
                    Some(d.to_string())
                }
            }
            None => todo.description,
        };

        let status = status.unwrap_or(todo.status);

        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos SET title = $1, description = $2, status = $3, updated_at = now() \
             WHERE id = $4 \
             RETURNING id, title, description, status, board_id, created_at, updated_at",
        )
        .bind(title.as_str())
        .bind(description.as_deref())
        .bind(status)
        .bind(todo_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(todo)
    }

    pub async fn delete(&self, user_id: Uuid, todo_id: Uuid) -> Result<(), ApiError> {
        let todo = self
            .find_by_id(todo_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Todo not found"))?;

        self.boards.authorize(user_id, todo.board_id).await?;

        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(todo.id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, ApiError> {
        let todo = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, status, board_id, created_at, updated_at \
             FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(todo)
    }
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.is_empty() {
        return Err(ApiError::validation_error("Title is required"));
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation_error(format!(
            "Title cannot be more than {} characters",
            MAX_TITLE_LEN
        )));
    }

    Ok(())
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::validation_error(format!(
            "Description cannot be more than {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }

    Ok(())
}
