use crate::{
    db::models::round_models::{Round, RoundStatus},
    db::repositories::map_db_error,
    db::store::RoundStore,
    error::Error,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const ROUND_COLUMNS: &str = "id, patroller_id, patroller_name, visited_locations, notes, status, started_at, finished_at, created_at";

/// Rounds repository
#[derive(Clone)]
pub struct RoundsRepository {
    pool: Arc<PgPool>,
}

impl RoundsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoundStore for RoundsRepository {
    async fn create(&self, round: &Round) -> Result<Round> {
        let result = sqlx::query_as::<_, Round>(&format!(
            r#"
            INSERT INTO rounds (
                id, patroller_id, patroller_name, visited_locations, notes, status,
                started_at, finished_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            ROUND_COLUMNS
        ))
        .bind(round.id)
        .bind(round.patroller_id)
        .bind(&round.patroller_name)
        .bind(&round.visited_locations)
        .bind(&round.notes)
        .bind(round.status)
        .bind(round.started_at)
        .bind(round.finished_at)
        .bind(round.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            map_db_error(e, "Failed to create round", || {
                Error::Conflict("Patroller already has an active round".to_string())
            })
        })?;

        Ok(result)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Round>> {
        let result = sqlx::query_as::<_, Round>(&format!(
            "SELECT {} FROM rounds WHERE id = $1",
            ROUND_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get round by ID: {}", e)))?;

        Ok(result)
    }

    async fn get_all(&self, patroller: Option<&Uuid>) -> Result<Vec<Round>> {
        let result = sqlx::query_as::<_, Round>(&format!(
            r#"
            SELECT {} FROM rounds
            WHERE $1::uuid IS NULL OR patroller_id = $1
            ORDER BY created_at DESC
            "#,
            ROUND_COLUMNS
        ))
        .bind(patroller.copied())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get rounds: {}", e)))?;

        Ok(result)
    }

    async fn get_active_for(&self, patroller: &Uuid) -> Result<Option<Round>> {
        let result = sqlx::query_as::<_, Round>(&format!(
            r#"
            SELECT {} FROM rounds
            WHERE patroller_id = $1 AND status = $2
            LIMIT 1
            "#,
            ROUND_COLUMNS
        ))
        .bind(patroller)
        .bind(RoundStatus::Started)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get active round: {}", e)))?;

        Ok(result)
    }

    async fn finish(&self, id: &Uuid, finished_at: DateTime<Utc>) -> Result<Option<Round>> {
        let result = sqlx::query_as::<_, Round>(&format!(
            r#"
            UPDATE rounds
            SET status = $1, finished_at = $2
            WHERE id = $3 AND status = $4
            RETURNING {}
            "#,
            ROUND_COLUMNS
        ))
        .bind(RoundStatus::Completed)
        .bind(finished_at)
        .bind(id)
        .bind(RoundStatus::Started)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to finish round: {}", e)))?;

        Ok(result)
    }

    async fn count_created_since(
        &self,
        since: DateTime<Utc>,
        patroller: Option<&Uuid>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM rounds
            WHERE created_at >= $1 AND ($2::uuid IS NULL OR patroller_id = $2)
            "#,
        )
        .bind(since)
        .bind(patroller.copied())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to count rounds: {}", e)))?;

        Ok(count)
    }

    async fn count_active(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rounds WHERE status = $1")
            .bind(RoundStatus::Started)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count active rounds: {}", e)))?;

        Ok(count)
    }
}
