//! Conversation persistence for the Confab chat service
//!
//! One `chat_logs` row per session plus an append-only `messages` table.
//! Message order is insertion order, carried by the autoincrement rowid.

use chrono::{DateTime, Utc};
use confab_core::{ConfabError, ConfabResult, ConversationLog, Message, Role};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use tracing::{debug, info};

/// SQLite-backed conversation store
pub struct ConversationStore {
    pool: SqlitePool,
}

impl ConversationStore {
    /// Connect to the database and create tables if missing
    pub async fn new(database_url: &str) -> ConfabResult<Self> {
        info!("Connecting to conversation store: {}", database_url);

        // An in-memory SQLite database exists per connection, so the pool
        // must not hand out more than one.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(database_url)
                .await
        } else {
            if let Some(path) = database_url.strip_prefix("sqlite:") {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
            }

            SqlitePoolOptions::new()
                .connect_with(
                    database_url
                        .parse::<sqlx::sqlite::SqliteConnectOptions>()
                        .map_err(|e| {
                            ConfabError::Storage(format!("Invalid database URL: {}", e))
                        })?
                        .create_if_missing(true),
                )
                .await
        }
        .map_err(|e| ConfabError::Storage(format!("Failed to connect to database: {}", e)))?;

        Self::create_tables(&pool).await?;
        info!("Conversation store initialized");

        Ok(Self { pool })
    }

    async fn create_tables(pool: &SqlitePool) -> ConfabResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_logs (
                session_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                metadata TEXT
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| ConfabError::Storage(format!("Failed to create chat_logs table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| ConfabError::Storage(format!("Failed to create messages table: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_session ON messages (session_id, id)")
            .execute(pool)
            .await
            .map_err(|e| ConfabError::Storage(format!("Failed to create index: {}", e)))?;

        Ok(())
    }

    /// Append a user/assistant exchange to a session's log.
    ///
    /// Creates the log row on first use (`created_at` set once) and bumps
    /// `updated_at` on every append. Both message inserts and the upsert run
    /// in one transaction.
    pub async fn append_exchange(
        &self,
        session_id: &str,
        user_message: &Message,
        assistant_message: &Message,
    ) -> ConfabResult<()> {
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ConfabError::Storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO chat_logs (session_id, created_at, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| ConfabError::Storage(format!("Failed to upsert chat log: {}", e)))?;

        for message in [user_message, assistant_message] {
            sqlx::query(
                "INSERT INTO messages (session_id, role, content, timestamp) VALUES (?, ?, ?, ?)",
            )
            .bind(session_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.timestamp.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| ConfabError::Storage(format!("Failed to insert message: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| ConfabError::Storage(format!("Failed to commit exchange: {}", e)))?;

        debug!("Appended exchange to session {}", session_id);
        Ok(())
    }

    /// Get the most recent `limit` messages of a session, oldest first.
    ///
    /// An unknown session yields an empty list; the distinction between
    /// "no session" and "empty window" does not matter for context assembly.
    pub async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> ConfabResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT role, content, timestamp FROM messages WHERE session_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(session_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ConfabError::Storage(format!("Failed to load recent messages: {}", e)))?;

        let mut messages = rows
            .into_iter()
            .map(Self::row_to_message)
            .collect::<ConfabResult<Vec<_>>>()?;

        // Query returned newest-first
        messages.reverse();
        Ok(messages)
    }

    /// Retrieve the full log for a session. `None` when the session was
    /// never used; callers distinguish this from a storage failure.
    pub async fn get_log(&self, session_id: &str) -> ConfabResult<Option<ConversationLog>> {
        let log_row = sqlx::query(
            "SELECT created_at, updated_at, metadata FROM chat_logs WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ConfabError::Storage(format!("Failed to load chat log: {}", e)))?;

        let Some(log_row) = log_row else {
            return Ok(None);
        };

        let rows = sqlx::query(
            "SELECT role, content, timestamp FROM messages WHERE session_id = ? ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ConfabError::Storage(format!("Failed to load messages: {}", e)))?;

        let messages = rows
            .into_iter()
            .map(Self::row_to_message)
            .collect::<ConfabResult<Vec<_>>>()?;

        let metadata = log_row
            .try_get::<Option<String>, _>("metadata")
            .unwrap_or(None)
            .and_then(|raw| serde_json::from_str(&raw).ok());

        let created_at_raw: String = log_row
            .try_get("created_at")
            .map_err(|e| ConfabError::Storage(format!("Missing created_at column: {}", e)))?;
        let updated_at_raw: String = log_row
            .try_get("updated_at")
            .map_err(|e| ConfabError::Storage(format!("Missing updated_at column: {}", e)))?;

        Ok(Some(ConversationLog {
            session_id: session_id.to_string(),
            messages,
            created_at: Self::parse_timestamp(&created_at_raw)?,
            updated_at: Self::parse_timestamp(&updated_at_raw)?,
            metadata,
        }))
    }

    fn row_to_message(row: sqlx::sqlite::SqliteRow) -> ConfabResult<Message> {
        let role_raw: String = row
            .try_get("role")
            .map_err(|e| ConfabError::Storage(format!("Missing role column: {}", e)))?;
        let role = Role::parse(&role_raw)
            .ok_or_else(|| ConfabError::Storage(format!("Unknown message role: {}", role_raw)))?;

        let content: String = row
            .try_get("content")
            .map_err(|e| ConfabError::Storage(format!("Missing content column: {}", e)))?;

        let timestamp_raw: String = row
            .try_get("timestamp")
            .map_err(|e| ConfabError::Storage(format!("Missing timestamp column: {}", e)))?;
        let timestamp = Self::parse_timestamp(&timestamp_raw)?;

        Ok(Message {
            role,
            content,
            timestamp,
        })
    }

    /// A stored timestamp that does not parse is corrupt data, reported as
    /// a storage error rather than patched over with the current time.
    fn parse_timestamp(raw: &str) -> ConfabResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ConfabError::Storage(format!("Corrupt timestamp '{}': {}", raw, e)))
    }
}
