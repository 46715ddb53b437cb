use crate::errors::AppError;
use crate::models::{ChatRecord, Session, User};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Storage service for user accounts and their sessions.
pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user with an already-hashed password.
    ///
    /// Fails with `BadRequest` when the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        if self.find_by_username(username).await?.is_some() {
            return Err(AppError::BadRequest("User already exists.".to_string()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        tracing::info!("Created user: {}", user.username);
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? LIMIT 1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Delete a user. Sessions and chat history cascade via the schema.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Deleted user {} (sessions and chats cascade)", id);
        Ok(())
    }

    /// Issue a new session token for a user.
    pub async fn create_session(&self, user_id: &str) -> Result<Session, AppError> {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&session.token)
            .bind(&session.user_id)
            .bind(session.created_at)
            .execute(&self.pool)
            .await?;

        Ok(session)
    }

    /// Resolve a bearer token to its user, if the session is active.
    pub async fn find_session_user(&self, token: &str) -> Result<Option<User>, AppError> {
        let session =
            sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token = ? LIMIT 1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        match session {
            Some(session) => self.find_by_id(&session.user_id).await,
            None => Ok(None),
        }
    }

    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Append-only storage for chat history.
pub struct ChatStorage {
    pool: SqlitePool,
}

impl ChatStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist one chat exchange. Called exactly once per accepted request,
    /// whatever text the pipeline produced.
    pub async fn record_chat(
        &self,
        user_id: &str,
        message: &str,
        response: &str,
    ) -> Result<ChatRecord, AppError> {
        let record = ChatRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO chats (id, user_id, message, response, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.message)
        .bind(&record.response)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    /// Chat history for one user, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ChatRecord>, AppError> {
        let records = sqlx::query_as::<_, ChatRecord>(
            "SELECT * FROM chats WHERE user_id = ? ORDER BY timestamp ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
