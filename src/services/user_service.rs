use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::User;
use crate::database::{Database, DatabaseError};
use crate::error::ApiError;

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, ApiError> {
        Ok(Self {
            pool: Database::pool().await?,
        })
    }

    /// Register a new account. The email is normalized before storage so that
    /// lookups are case-insensitive.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();
        validate_email(&email)?;
        validate_password(password)?;

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to create account")
        })?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash, created_at, updated_at",
        )
        .bind(email.as_str())
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return ApiError::conflict("An account with this email already exists");
                }
            }
            DatabaseError::from(e).into()
        })?;

        Ok(user)
    }

    /// Verify credentials and return the matching user. Unknown email and
    /// wrong password produce the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = email.trim().to_lowercase();

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

        let matches = bcrypt::verify(password, &user.password_hash).map_err(|e| {
            tracing::error!("password verification failed: {}", e);
            ApiError::internal_server_error("Failed to verify credentials")
        })?;

        if !matches {
            return Err(ApiError::unauthorized("Invalid email or password"));
        }

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(user)
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::validation_error("Please include a valid email"));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err(ApiError::validation_error("Please include a valid email"));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    let strong = password.len() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit());

    if !strong {
        return Err(ApiError::validation_error(
            "Password must be at least 8 characters and contain an uppercase letter, \
             a lowercase letter and a number",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_email() {
        assert!(validate_email("a@x.com").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@nodot").is_err());
    }

    #[test]
    fn accepts_policy_compliant_password() {
        assert!(validate_password("Passw0rd").is_ok());
    }

    #[test]
    fn rejects_weak_passwords() {
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }
}
