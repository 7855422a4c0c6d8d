use crate::{
    db::models::incident_models::{Incident, IncidentPriority},
    db::store::IncidentStore,
    error::Error,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const INCIDENT_COLUMNS: &str = "id, location, incident_type, priority, description, photos, reporter_id, reporter_name, created_at, resolved, resolution_notes, resolved_by, resolved_at";

/// Incidents repository
#[derive(Clone)]
pub struct IncidentsRepository {
    pool: Arc<PgPool>,
}

impl IncidentsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncidentStore for IncidentsRepository {
    async fn create(&self, incident: &Incident) -> Result<Incident> {
        info!(
            "Creating incident {} at {}",
            incident.incident_type.as_str(),
            incident.location
        );

        let result = sqlx::query_as::<_, Incident>(&format!(
            r#"
            INSERT INTO incidents (
                id, location, incident_type, priority, description, photos,
                reporter_id, reporter_name, created_at, resolved
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            INCIDENT_COLUMNS
        ))
        .bind(incident.id)
        .bind(&incident.location)
        .bind(incident.incident_type)
        .bind(incident.priority)
        .bind(&incident.description)
        .bind(&incident.photos)
        .bind(incident.reporter_id)
        .bind(&incident.reporter_name)
        .bind(incident.created_at)
        .bind(incident.resolved)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to create incident: {}", e)))?;

        Ok(result)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Incident>> {
        let result = sqlx::query_as::<_, Incident>(&format!(
            "SELECT {} FROM incidents WHERE id = $1",
            INCIDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get incident by ID: {}", e)))?;

        Ok(result)
    }

    async fn get_all(&self) -> Result<Vec<Incident>> {
        let result = sqlx::query_as::<_, Incident>(&format!(
            "SELECT {} FROM incidents ORDER BY created_at DESC",
            INCIDENT_COLUMNS
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get incidents: {}", e)))?;

        Ok(result)
    }

    async fn resolve(
        &self,
        id: &Uuid,
        resolved_by: &Uuid,
        notes: &str,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<Incident>> {
        let result = sqlx::query_as::<_, Incident>(&format!(
            r#"
            UPDATE incidents
            SET resolved = true, resolution_notes = $1, resolved_by = $2, resolved_at = $3
            WHERE id = $4 AND resolved = false
            RETURNING {}
            "#,
            INCIDENT_COLUMNS
        ))
        .bind(notes)
        .bind(resolved_by)
        .bind(resolved_at)
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to resolve incident: {}", e)))?;

        Ok(result)
    }

    async fn add_photo(&self, id: &Uuid, photo: &str) -> Result<Option<Incident>> {
        let result = sqlx::query_as::<_, Incident>(&format!(
            r#"
            UPDATE incidents
            SET photos = array_append(photos, $1)
            WHERE id = $2
            RETURNING {}
            "#,
            INCIDENT_COLUMNS
        ))
        .bind(photo)
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to add incident photo: {}", e)))?;

        Ok(result)
    }

    async fn count_created_since(
        &self,
        since: DateTime<Utc>,
        reporter: Option<&Uuid>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM incidents
            WHERE created_at >= $1 AND ($2::uuid IS NULL OR reporter_id = $2)
            "#,
        )
        .bind(since)
        .bind(reporter.copied())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to count incidents: {}", e)))?;

        Ok(count)
    }

    async fn count_unresolved(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidents WHERE NOT resolved")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count open incidents: {}", e)))?;

        Ok(count)
    }

    async fn count_by_priority(&self, priority: IncidentPriority) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidents WHERE priority = $1")
            .bind(priority)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count incidents by priority: {}", e)))?;

        Ok(count)
    }
}
