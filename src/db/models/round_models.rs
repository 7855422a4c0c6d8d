use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Patrol round: the locations a guard walked through
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Round {
    pub id: Uuid,
    pub patroller_id: Uuid,
    pub patroller_name: String,
    pub visited_locations: Vec<String>,
    pub notes: Option<String>,
    pub status: RoundStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Round {
    pub fn is_active(&self) -> bool {
        self.status == RoundStatus::Started
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "round_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Started,
    Completed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoundRequest {
    pub visited_locations: Vec<String>,
    pub notes: Option<String>,
}
