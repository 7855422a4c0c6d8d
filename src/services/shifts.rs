use crate::db::models::shift_models::{Shift, StartShiftRequest};
use crate::db::store::ShiftStore;
use crate::error::Error;
use crate::security::{Operation, RequestContext};
use crate::services::audit::{AuditAction, AuditService};
use crate::services::{non_blank, optional_text};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Duty shifts of patrol guards
pub struct ShiftService {
    shifts: Arc<dyn ShiftStore>,
    audit: AuditService,
}

impl ShiftService {
    pub fn new(shifts: Arc<dyn ShiftStore>, audit: AuditService) -> Self {
        Self { shifts, audit }
    }

    /// Open a shift for the calling guard at `location`
    pub async fn start(&self, ctx: &RequestContext, request: &StartShiftRequest) -> Result<Shift> {
        ctx.require(Operation::StartShift)?;
        let location = non_blank(&request.location, "location")?;

        if self.shifts.get_active_for(&ctx.user_id).await?.is_some() {
            return Err(Error::Conflict("A shift is already active for this guard".to_string()).into());
        }

        let shift = Shift {
            id: Uuid::new_v4(),
            patroller_id: ctx.user_id,
            patroller_name: ctx.name.clone(),
            location,
            started_at: Utc::now(),
            ended_at: None,
            notes: optional_text(request.notes.as_deref()),
        };

        // The store still rejects a racing second start.
        let shift = self.shifts.create(&shift).await?;

        info!("Shift started by {} at {}", ctx.name, shift.location);
        self.audit
            .record(
                ctx,
                AuditAction::StartShift,
                "shifts",
                Some(format!("Shift started at {}", shift.location)),
            )
            .await;

        Ok(shift)
    }

    pub async fn list_active(&self, ctx: &RequestContext) -> Result<Vec<Shift>> {
        ctx.require(Operation::ListActiveShifts)?;
        self.shifts.get_active().await
    }

    /// Close a shift. Guards end their own; supervisors and administrators any.
    pub async fn end(&self, ctx: &RequestContext, id: &Uuid) -> Result<Shift> {
        let shift = self
            .shifts
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Shift not found: {}", id)))?;
        ctx.require_owner_or(&shift.patroller_id, Operation::EndShift, Operation::EndAnyShift)?;

        if !shift.is_active() {
            return Err(Error::Conflict(format!("Shift {} has already ended", id)).into());
        }

        let shift = self
            .shifts
            .end(id, Utc::now())
            .await?
            .ok_or_else(|| Error::Conflict(format!("Shift {} has already ended", id)))?;

        info!("Shift {} ended by {}", id, ctx.name);
        self.audit
            .record(ctx, AuditAction::EndShift, "shifts", Some(format!("Shift {} ended", id)))
            .await;

        Ok(shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::models::UserRole;

    fn service() -> ShiftService {
        let store = Arc::new(MemoryStore::new());
        ShiftService::new(store.clone(), AuditService::new(store))
    }

    fn ctx(role: UserRole) -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            name: "Guard".to_string(),
            role,
        }
    }

    fn at(location: &str) -> StartShiftRequest {
        StartShiftRequest {
            location: location.to_string(),
            notes: Some(" ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_start_then_end() {
        let shifts = service();
        let patrol = ctx(UserRole::Patrol);
        let supervisor = ctx(UserRole::Supervisor);

        let shift = shifts.start(&patrol, &at("North Tower")).await.unwrap();
        assert!(shift.is_active());
        assert_eq!(shift.notes, None);

        let active = shifts.list_active(&supervisor).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, shift.id);

        let ended = shifts.end(&patrol, &shift.id).await.unwrap();
        assert!(ended.ended_at.is_some());
        assert!(shifts.list_active(&supervisor).await.unwrap().is_empty());

        let again = shifts.end(&patrol, &shift.id).await.unwrap_err();
        assert!(matches!(again.downcast_ref::<Error>(), Some(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_only_patrol_starts_shifts() {
        let shifts = service();
        for role in [UserRole::Supervisor, UserRole::Administrator] {
            let err = shifts.start(&ctx(role), &at("Lobby")).await.unwrap_err();
            assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Authorization(_))));
        }
    }

    #[tokio::test]
    async fn test_second_active_shift_conflicts() {
        let shifts = service();
        let patrol = ctx(UserRole::Patrol);
        shifts.start(&patrol, &at("Lobby")).await.unwrap();

        let err = shifts.start(&patrol, &at("Dock")).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_patrol_cannot_list_or_end_others() {
        let shifts = service();
        let owner = ctx(UserRole::Patrol);
        let other = ctx(UserRole::Patrol);
        let shift = shifts.start(&owner, &at("Lobby")).await.unwrap();

        assert!(shifts.list_active(&other).await.is_err());
        let err = shifts.end(&other, &shift.id).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Authorization(_))));

        shifts.end(&ctx(UserRole::Administrator), &shift.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_location_rejected() {
        let err = service().start(&ctx(UserRole::Patrol), &at("   ")).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));
    }
}
