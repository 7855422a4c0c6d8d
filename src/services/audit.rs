use crate::db::models::AuditEntry;
use crate::db::store::AuditStore;
use crate::security::{Operation, RequestContext};
use anyhow::Result;
use chrono::Utc;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Entries returned when no limit is given
pub const DEFAULT_AUDIT_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Login,
    CreateUser,
    UpdateUser,
    ChangePassword,
    CreateIncident,
    ResolveIncident,
    UploadPhoto,
    StartRound,
    FinishRound,
    StartShift,
    EndShift,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::CreateUser => "CREATE_USER",
            Self::UpdateUser => "UPDATE_USER",
            Self::ChangePassword => "CHANGE_PASSWORD",
            Self::CreateIncident => "CREATE_INCIDENT",
            Self::ResolveIncident => "RESOLVE_INCIDENT",
            Self::UploadPhoto => "UPLOAD_PHOTO",
            Self::StartRound => "START_ROUND",
            Self::FinishRound => "FINISH_ROUND",
            Self::StartShift => "START_SHIFT",
            Self::EndShift => "END_SHIFT",
        }
    }
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only trail of who did what
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn AuditStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record an action. A failed write is logged and never fails the caller.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
        resource: &str,
        details: Option<String>,
    ) {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            user_id: ctx.user_id,
            user_name: ctx.name.clone(),
            action: action.to_string(),
            resource: resource.to_string(),
            details,
            timestamp: Utc::now(),
        };

        if let Err(e) = self.store.record(&entry).await {
            error!("Failed to record audit entry {}: {}", action, e);
        }
    }

    /// Latest entries first
    pub async fn list(&self, ctx: &RequestContext, limit: Option<i64>) -> Result<Vec<AuditEntry>> {
        ctx.require(Operation::ViewAuditLog)?;

        let limit = limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, DEFAULT_AUDIT_LIMIT);
        self.store.get_latest(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::models::UserRole;
    use crate::error::Error;

    fn ctx(role: UserRole) -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            name: "Auditor".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let audit = AuditService::new(Arc::new(MemoryStore::new()));
        let admin = ctx(UserRole::Administrator);

        audit
            .record(&admin, AuditAction::Login, "auth", Some("Login".to_string()))
            .await;

        let entries = audit.list(&admin, None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "LOGIN");
        assert_eq!(entries[0].user_id, admin.user_id);
    }

    #[tokio::test]
    async fn test_only_admin_reads_log() {
        let audit = AuditService::new(Arc::new(MemoryStore::new()));
        let err = audit.list(&ctx(UserRole::Supervisor), None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Authorization(_))
        ));
    }
}
