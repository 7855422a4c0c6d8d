use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Incident ("occurrence") logged by a guard
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Incident {
    pub id: Uuid,
    pub location: String,
    pub incident_type: IncidentType,
    pub priority: IncidentPriority,
    pub description: String,
    pub photos: Vec<String>,
    pub reporter_id: Uuid,
    pub reporter_name: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
    pub resolution_notes: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "incident_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Theft,
    Vandalism,
    Fire,
    Accident,
    SuspiciousActivity,
    MedicalEmergency,
    Other,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Theft => "theft",
            Self::Vandalism => "vandalism",
            Self::Fire => "fire",
            Self::Accident => "accident",
            Self::SuspiciousActivity => "suspicious_activity",
            Self::MedicalEmergency => "medical_emergency",
            Self::Other => "other",
        }
    }
}

impl FromStr for IncidentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "theft" => Ok(Self::Theft),
            "vandalism" => Ok(Self::Vandalism),
            "fire" => Ok(Self::Fire),
            "accident" => Ok(Self::Accident),
            "suspicious_activity" => Ok(Self::SuspiciousActivity),
            "medical_emergency" => Ok(Self::MedicalEmergency),
            "other" => Ok(Self::Other),
            other => Err(Error::Validation(format!("Unknown incident type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "incident_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IncidentPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for IncidentPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(Error::Validation(format!("Unknown priority: {}", other))),
        }
    }
}

/// Incident as submitted by the client; enum fields arrive as plain strings
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIncidentRequest {
    pub location: String,
    pub incident_type: String,
    pub priority: String,
    pub description: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveIncidentRequest {
    #[serde(default)]
    pub resolution_notes: String,
}

/// Result of a photo upload
#[derive(Debug, Clone, Serialize)]
pub struct PhotoUploaded {
    pub message: String,
    pub photo_url: String,
}
