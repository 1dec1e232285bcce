// src/services/results_store.rs

use sqlx::{SqlitePool, types::Json};
use uuid::Uuid;

use crate::models::results::{ResultsPayload, StoredResults};

/// Persists finished quiz summaries for the results page.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    pool: SqlitePool,
}

impl ResultsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Saves the payload for a session, replacing an earlier run of the same session.
    pub async fn save(&self, session_id: Uuid, payload: &ResultsPayload) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO quiz_results (session_id, payload, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                payload = excluded.payload,
                created_at = excluded.created_at
            "#,
        )
        .bind(session_id.to_string())
        .bind(Json(payload))
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Stored results for session {} ({}/{})",
            session_id,
            payload.score,
            payload.total
        );
        Ok(())
    }

    pub async fn load(&self, session_id: Uuid) -> Result<Option<StoredResults>, sqlx::Error> {
        sqlx::query_as::<_, StoredResults>(
            r#"
            SELECT session_id, payload, created_at
            FROM quiz_results
            WHERE session_id = ?
            "#,
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
    }

    /// The most recently finished quiz.
    pub async fn latest(&self) -> Result<Option<StoredResults>, sqlx::Error> {
        sqlx::query_as::<_, StoredResults>(
            r#"
            SELECT session_id, payload, created_at
            FROM quiz_results
            ORDER BY julianday(created_at) DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
    }
}
