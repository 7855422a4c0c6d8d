use crate::db::models::{
    AuditEntry, Incident, IncidentPriority, Location, Round, Shift, User, UserRole,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a taken email fails with `Error::AlreadyExists`
    async fn create(&self, user: &User) -> Result<User>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    /// All users ordered by name
    async fn get_all(&self) -> Result<Vec<User>>;
    async fn update(&self, user: &User) -> Result<User>;
    async fn update_last_login(&self, id: &Uuid) -> Result<()>;
    async fn count_active(&self) -> Result<i64>;
    async fn exists_with_role(&self, role: UserRole) -> Result<bool>;
}

/// Incident records
#[async_trait]
pub trait IncidentStore: Send + Sync {
    async fn create(&self, incident: &Incident) -> Result<Incident>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Incident>>;
    /// All incidents, newest first
    async fn get_all(&self) -> Result<Vec<Incident>>;
    /// Mark an unresolved incident resolved. Returns `None` when no unresolved
    /// incident with that id exists, so only one of several racing resolvers wins.
    async fn resolve(
        &self,
        id: &Uuid,
        resolved_by: &Uuid,
        notes: &str,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<Incident>>;
    /// Append a photo reference; `None` if the incident does not exist
    async fn add_photo(&self, id: &Uuid, photo: &str) -> Result<Option<Incident>>;
    async fn count_created_since(
        &self,
        since: DateTime<Utc>,
        reporter: Option<&Uuid>,
    ) -> Result<i64>;
    async fn count_unresolved(&self) -> Result<i64>;
    async fn count_by_priority(&self, priority: IncidentPriority) -> Result<i64>;
}

/// Patrol round records
#[async_trait]
pub trait RoundStore: Send + Sync {
    /// Insert a round; a second started round for the patroller fails with `Error::Conflict`
    async fn create(&self, round: &Round) -> Result<Round>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Round>>;
    /// Rounds newest first, optionally only one patroller's
    async fn get_all(&self, patroller: Option<&Uuid>) -> Result<Vec<Round>>;
    async fn get_active_for(&self, patroller: &Uuid) -> Result<Option<Round>>;
    /// Complete a started round; `None` if no started round has that id
    async fn finish(&self, id: &Uuid, finished_at: DateTime<Utc>) -> Result<Option<Round>>;
    async fn count_created_since(
        &self,
        since: DateTime<Utc>,
        patroller: Option<&Uuid>,
    ) -> Result<i64>;
    async fn count_active(&self) -> Result<i64>;
}

/// Duty shift records
#[async_trait]
pub trait ShiftStore: Send + Sync {
    /// Insert a shift; a second active shift for the patroller fails with `Error::Conflict`
    async fn create(&self, shift: &Shift) -> Result<Shift>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Shift>>;
    /// Shifts without an end, newest first
    async fn get_active(&self) -> Result<Vec<Shift>>;
    async fn get_active_for(&self, patroller: &Uuid) -> Result<Option<Shift>>;
    /// Close an active shift; `None` if no active shift has that id
    async fn end(&self, id: &Uuid, ended_at: DateTime<Utc>) -> Result<Option<Shift>>;
    /// Distinct patrollers with an active shift
    async fn count_on_duty(&self) -> Result<i64>;
}

/// Location reference data
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// All locations ordered by name
    async fn get_all(&self) -> Result<Vec<Location>>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Location>>;
    /// Insert, or overwrite the location with the same name
    async fn upsert_by_name(&self, location: &Location) -> Result<Location>;
}

/// Audit trail
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<()>;
    /// Latest entries first
    async fn get_latest(&self, limit: i64) -> Result<Vec<AuditEntry>>;
}
