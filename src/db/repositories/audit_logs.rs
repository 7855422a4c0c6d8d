use crate::{db::models::audit_models::AuditEntry, db::store::AuditStore, error::Error};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Audit log repository
#[derive(Clone)]
pub struct AuditLogsRepository {
    pool: Arc<PgPool>,
}

impl AuditLogsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for AuditLogsRepository {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, user_name, action, resource, details, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.user_name)
        .bind(&entry.action)
        .bind(&entry.resource)
        .bind(&entry.details)
        .bind(entry.timestamp)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to record audit entry: {}", e)))?;

        Ok(())
    }

    async fn get_latest(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let result = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, user_id, user_name, action, resource, details, timestamp
            FROM audit_logs
            ORDER BY timestamp DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get audit log: {}", e)))?;

        Ok(result)
    }
}
