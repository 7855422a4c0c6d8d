use crate::{db::models::location_models::Location, db::store::LocationStore, error::Error};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const LOCATION_COLUMNS: &str = "id, name, description, camera_address, camera_url, latitude, longitude";

/// Locations repository
#[derive(Clone)]
pub struct LocationsRepository {
    pool: Arc<PgPool>,
}

impl LocationsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for LocationsRepository {
    async fn get_all(&self) -> Result<Vec<Location>> {
        let result = sqlx::query_as::<_, Location>(&format!(
            "SELECT {} FROM locations ORDER BY name",
            LOCATION_COLUMNS
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get locations: {}", e)))?;

        Ok(result)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Location>> {
        let result = sqlx::query_as::<_, Location>(&format!(
            "SELECT {} FROM locations WHERE id = $1",
            LOCATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get location by ID: {}", e)))?;

        Ok(result)
    }

    async fn upsert_by_name(&self, location: &Location) -> Result<Location> {
        let result = sqlx::query_as::<_, Location>(&format!(
            r#"
            INSERT INTO locations (id, name, description, camera_address, camera_url, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO UPDATE
            SET description = EXCLUDED.description,
                camera_address = EXCLUDED.camera_address,
                camera_url = EXCLUDED.camera_url,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(location.id)
        .bind(&location.name)
        .bind(&location.description)
        .bind(&location.camera_address)
        .bind(&location.camera_url)
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to upsert location: {}", e)))?;

        Ok(result)
    }
}
