use crate::{
    db::models::shift_models::Shift, db::repositories::map_db_error, db::store::ShiftStore,
    error::Error,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const SHIFT_COLUMNS: &str = "id, patroller_id, patroller_name, location, started_at, ended_at, notes";

/// Shifts repository
#[derive(Clone)]
pub struct ShiftsRepository {
    pool: Arc<PgPool>,
}

impl ShiftsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftStore for ShiftsRepository {
    async fn create(&self, shift: &Shift) -> Result<Shift> {
        // shifts_one_active_per_patroller backs the one-active-shift rule
        let result = sqlx::query_as::<_, Shift>(&format!(
            r#"
            INSERT INTO shifts (id, patroller_id, patroller_name, location, started_at, ended_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SHIFT_COLUMNS
        ))
        .bind(shift.id)
        .bind(shift.patroller_id)
        .bind(&shift.patroller_name)
        .bind(&shift.location)
        .bind(shift.started_at)
        .bind(shift.ended_at)
        .bind(&shift.notes)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            map_db_error(e, "Failed to create shift", || {
                Error::Conflict("Patroller already has an active shift".to_string())
            })
        })?;

        Ok(result)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Shift>> {
        let result = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {} FROM shifts WHERE id = $1",
            SHIFT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get shift by ID: {}", e)))?;

        Ok(result)
    }

    async fn get_active(&self) -> Result<Vec<Shift>> {
        let result = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {} FROM shifts WHERE ended_at IS NULL ORDER BY started_at DESC",
            SHIFT_COLUMNS
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get active shifts: {}", e)))?;

        Ok(result)
    }

    async fn get_active_for(&self, patroller: &Uuid) -> Result<Option<Shift>> {
        let result = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {} FROM shifts WHERE patroller_id = $1 AND ended_at IS NULL",
            SHIFT_COLUMNS
        ))
        .bind(patroller)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get active shift: {}", e)))?;

        Ok(result)
    }

    async fn end(&self, id: &Uuid, ended_at: DateTime<Utc>) -> Result<Option<Shift>> {
        let result = sqlx::query_as::<_, Shift>(&format!(
            r#"
            UPDATE shifts
            SET ended_at = $1
            WHERE id = $2 AND ended_at IS NULL
            RETURNING {}
            "#,
            SHIFT_COLUMNS
        ))
        .bind(ended_at)
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to end shift: {}", e)))?;

        Ok(result)
    }

    async fn count_on_duty(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT patroller_id) FROM shifts WHERE ended_at IS NULL",
        )
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to count personnel on duty: {}", e)))?;

        Ok(count)
    }
}
