use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Board;
use crate::database::{Database, DatabaseError};
use crate::error::ApiError;

pub const MAX_TITLE_LEN: usize = 50;

pub struct BoardService {
    pool: PgPool,
}

impl BoardService {
    pub async fn new() -> Result<Self, ApiError> {
        Ok(Self {
            pool: Database::pool().await?,
        })
    }

    /// All boards owned by the given user, in insertion order.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Board>, ApiError> {
        let boards = sqlx::query_as::<_, Board>(
            "SELECT id, title, user_id, created_at, updated_at FROM boards \
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(boards)
    }

    pub async fn create(&self, user_id: Uuid, title: &str) -> Result<Board, ApiError> {
        let title = title.trim();
        validate_title(title)?;

        let board = sqlx::query_as::<_, Board>(
            "INSERT INTO boards (title, user_id) VALUES ($1, $2) \
             RETURNING id, title, user_id, created_at, updated_at",
        )
        .bind(title)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(board)
    }

    /// Load a board and check that the caller owns it. Every board and todo
    /// mutation funnels through this check before touching the store.
    pub async fn authorize(&self, user_id: Uuid, board_id: Uuid) -> Result<Board, ApiError> {
        let board = self
            .find_by_id(board_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Board not found"))?;

        if board.user_id != user_id {
            return Err(ApiError::forbidden("User not authorized"));
        }

        Ok(board)
    }

    /// Replace the title. An absent or empty title keeps the current one.
    pub async fn update(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        title: Option<&str>,
    ) -> Result<Board, ApiError> {
        let board = self.authorize(user_id, board_id).await?;

        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => {
                validate_title(t)?;
                t.to_string()
            }
            _ => board.title,
        };

        let board = sqlx::query_as::<_, Board>(
            "UPDATE boards SET title = $1, updated_at = now() WHERE id = $2 \
             RETURNING id, title, user_id, created_at, updated_at",
        )
        .bind(title.as_str())
        .bind(board_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(board)
    }

    /// Delete a board and every todo that references it.
    ///
    /// Todos go first, then the board, in a single transaction so a failure
    /// partway cannot leave orphaned todos behind.
    pub async fn delete(&self, user_id: Uuid, board_id: Uuid) -> Result<(), ApiError> {
        let board = self.authorize(user_id, board_id).await?;

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        sqlx::query("DELETE FROM todos WHERE board_id = $1")
            .bind(board.id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

        sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(board.id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Board>, ApiError> {
        let board = sqlx::query_as::<_, Board>(
            "SELECT id, title, user_id, created_at, updated_at FROM boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(board)
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
