use crate::config::LocationSeed;
use crate::db::models::Location;
use crate::db::store::LocationStore;
use crate::error::Error;
use crate::security::{Operation, RequestContext};
use crate::services::optional_text;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use url::Url;
use uuid::Uuid;

/// Read access to monitored locations, plus startup seeding
pub struct LocationService {
    locations: Arc<dyn LocationStore>,
}

impl LocationService {
    pub fn new(locations: Arc<dyn LocationStore>) -> Self {
        Self { locations }
    }

    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Location>> {
        ctx.require(Operation::ListLocations)?;
        self.locations.get_all().await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &Uuid) -> Result<Location> {
        ctx.require(Operation::ListLocations)?;
        self.locations
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Location not found: {}", id)).into())
    }

    /// Upsert configured locations by name. Any invalid entry aborts seeding
    /// before anything is written.
    pub async fn seed(&self, seeds: &[LocationSeed]) -> Result<Vec<Location>> {
        let locations = seeds
            .iter()
            .map(location_from_seed)
            .collect::<Result<Vec<_>>>()?;

        let mut stored = Vec::with_capacity(locations.len());
        for location in &locations {
            stored.push(self.locations.upsert_by_name(location).await?);
        }

        if !stored.is_empty() {
            info!("Seeded {} locations", stored.len());
        }
        Ok(stored)
    }
}

fn location_from_seed(seed: &LocationSeed) -> Result<Location> {
    let name = seed.name.trim();
    if name.is_empty() {
        return Err(Error::Config("Location name must not be empty".to_string()).into());
    }

    let camera_url = optional_text(seed.camera_url.as_deref());
    if let Some(camera_url) = &camera_url {
        Url::parse(camera_url).map_err(|e| {
            Error::Config(format!("Invalid camera URL for location {}: {}", name, e))
        })?;
    }

    if seed.latitude.map_or(false, |lat| !(-90.0..=90.0).contains(&lat))
        || seed.longitude.map_or(false, |lon| !(-180.0..=180.0).contains(&lon))
    {
        return Err(Error::Config(format!("Coordinates out of range for location {}", name)).into());
    }

    Ok(Location {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: seed.description.trim().to_string(),
        camera_address: optional_text(seed.camera_address.as_deref()),
        camera_url,
        latitude: seed.latitude,
        longitude: seed.longitude,
    })
}
