use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monitored location, optionally covered by a camera
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub camera_address: Option<String>,
    pub camera_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
