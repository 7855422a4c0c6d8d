use crate::db::models::incident_models::{
    CreateIncidentRequest, Incident, IncidentPriority, IncidentType, PhotoUploaded,
};
use crate::db::store::IncidentStore;
use crate::error::Error;
use crate::security::{Operation, RequestContext};
use crate::services::audit::{AuditAction, AuditService};
use crate::services::photos::PhotoStorage;
use crate::services::non_blank;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Incident registry
pub struct IncidentService {
    incidents: Arc<dyn IncidentStore>,
    photos: PhotoStorage,
    audit: AuditService,
}

impl IncidentService {
    pub fn new(incidents: Arc<dyn IncidentStore>, photos: PhotoStorage, audit: AuditService) -> Self {
        Self {
            incidents,
            photos,
            audit,
        }
    }

    /// Log a new, unresolved incident reported by the caller
    pub async fn create(&self, ctx: &RequestContext, request: &CreateIncidentRequest) -> Result<Incident> {
        ctx.require(Operation::CreateIncident)?;

        let location = non_blank(&request.location, "location")?;
        let description = non_blank(&request.description, "description")?;
        let incident_type: IncidentType = request.incident_type.parse()?;
        let priority: IncidentPriority = request.priority.parse()?;
        let photos = request
            .photos
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        let incident = Incident {
            id: Uuid::new_v4(),
            location,
            incident_type,
            priority,
            description,
            photos,
            reporter_id: ctx.user_id,
            reporter_name: ctx.name.clone(),
            created_at: Utc::now(),
            resolved: false,
            resolution_notes: None,
            resolved_by: None,
            resolved_at: None,
        };

        let incident = self.incidents.create(&incident).await?;

        self.audit
            .record(
                ctx,
                AuditAction::CreateIncident,
                "incidents",
                Some(format!(
                    "Incident created: {} at {}",
                    incident.incident_type.as_str(),
                    incident.location
                )),
            )
            .await;

        Ok(incident)
    }

    /// Every incident, newest first
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Incident>> {
        ctx.require(Operation::ListIncidents)?;
        self.incidents.get_all().await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &Uuid) -> Result<Incident> {
        ctx.require(Operation::ListIncidents)?;
        self.find(id).await
    }

    /// Mark an incident resolved. Resolution is final: a second attempt, or the
    /// loser of two concurrent attempts, gets `Error::Conflict`.
    pub async fn resolve(&self, ctx: &RequestContext, id: &Uuid, notes: &str) -> Result<Incident> {
        ctx.require(Operation::ResolveIncident)?;

        let existing = self.find(id).await?;
        if existing.resolved {
            return Err(Error::Conflict(format!("Incident {} is already resolved", id)).into());
        }

        let incident = self
            .incidents
            .resolve(id, &ctx.user_id, notes.trim(), Utc::now())
            .await?
            .ok_or_else(|| Error::Conflict(format!("Incident {} is already resolved", id)))?;

        info!("Incident {} resolved by {}", id, ctx.name);
        self.audit
            .record(
                ctx,
                AuditAction::ResolveIncident,
                "incidents",
                Some(format!("Incident {} resolved", id)),
            )
            .await;

        Ok(incident)
    }

    /// Store a photo and append it to the incident. Reporters may add photos to
    /// their own incidents; supervisors and administrators to any.
    pub async fn attach_photo(
        &self,
        ctx: &RequestContext,
        id: &Uuid,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<PhotoUploaded> {
        let incident = self.find(id).await?;
        ctx.require_owner_or(&incident.reporter_id, Operation::AttachPhoto, Operation::EditAnyIncident)?;

        let photo_url = self.photos.save(id, file_name, bytes).await?;
        self.incidents
            .add_photo(id, &photo_url)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Incident not found: {}", id)))?;

        self.audit
            .record(
                ctx,
                AuditAction::UploadPhoto,
                "incidents",
                Some(format!("Photo added to incident {}", id)),
            )
            .await;

        Ok(PhotoUploaded {
            message: "Photo uploaded".to_string(),
            photo_url,
        })
    }

    async fn find(&self, id: &Uuid) -> Result<Incident> {
        self.incidents
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Incident not found: {}", id)).into())
    }
}
