use crate::db::models::{
    AuditEntry, Incident, IncidentPriority, Location, Round, RoundStatus, Shift, User, UserRole,
};
use crate::db::store::{AuditStore, IncidentStore, LocationStore, RoundStore, ShiftStore, UserStore};
use crate::error::Error;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store backing every registry. Records live in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    incidents: RwLock<Vec<Incident>>,
    rounds: RwLock<Vec<Round>>,
    shifts: RwLock<Vec<Shift>>,
    locations: RwLock<Vec<Location>>,
    audit: RwLock<Vec<AuditEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(Error::AlreadyExists("Email already in use".to_string()).into());
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == *id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let mut users = self.users.read().await.clone();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        let existing = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", user.id)))?;
        *existing = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(existing.clone())
    }

    async fn update_last_login(&self, id: &Uuid) -> Result<()> {
        if let Some(user) = self.users.write().await.iter_mut().find(|u| u.id == *id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn count_active(&self) -> Result<i64> {
        Ok(self.users.read().await.iter().filter(|u| u.active).count() as i64)
    }

    async fn exists_with_role(&self, role: UserRole) -> Result<bool> {
        Ok(self.users.read().await.iter().any(|u| u.role == role))
    }
}

#[async_trait]
impl IncidentStore for MemoryStore {
    async fn create(&self, incident: &Incident) -> Result<Incident> {
        self.incidents.write().await.push(incident.clone());
        Ok(incident.clone())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Incident>> {
        Ok(self.incidents.read().await.iter().find(|i| i.id == *id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Incident>> {
        let mut incidents = self.incidents.read().await.clone();
        incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(incidents)
    }

    async fn resolve(
        &self,
        id: &Uuid,
        resolved_by: &Uuid,
        notes: &str,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<Incident>> {
        let mut incidents = self.incidents.write().await;
        match incidents.iter_mut().find(|i| i.id == *id && !i.resolved) {
            Some(incident) => {
                incident.resolved = true;
                incident.resolution_notes = Some(notes.to_string());
                incident.resolved_by = Some(*resolved_by);
                incident.resolved_at = Some(resolved_at);
                Ok(Some(incident.clone()))
            }
            None => Ok(None),
        }
    }

    async fn add_photo(&self, id: &Uuid, photo: &str) -> Result<Option<Incident>> {
        let mut incidents = self.incidents.write().await;
        Ok(incidents.iter_mut().find(|i| i.id == *id).map(|incident| {
            incident.photos.push(photo.to_string());
            incident.clone()
        }))
    }

    async fn count_created_since(
        &self,
        since: DateTime<Utc>,
        reporter: Option<&Uuid>,
    ) -> Result<i64> {
        Ok(self
            .incidents
            .read()
            .await
            .iter()
            .filter(|i| i.created_at >= since)
            .filter(|i| reporter.map_or(true, |r| i.reporter_id == *r))
            .count() as i64)
    }

    async fn count_unresolved(&self) -> Result<i64> {
        Ok(self.incidents.read().await.iter().filter(|i| !i.resolved).count() as i64)
    }

    async fn count_by_priority(&self, priority: IncidentPriority) -> Result<i64> {
        Ok(self
            .incidents
            .read()
            .await
            .iter()
            .filter(|i| i.priority == priority)
            .count() as i64)
    }
}

#[async_trait]
impl RoundStore for MemoryStore {
    async fn create(&self, round: &Round) -> Result<Round> {
        let mut rounds = self.rounds.write().await;
        if rounds
            .iter()
            .any(|r| r.patroller_id == round.patroller_id && r.is_active())
        {
            return Err(Error::Conflict("Patroller already has an active round".to_string()).into());
        }
        rounds.push(round.clone());
        Ok(round.clone())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Round>> {
        Ok(self.rounds.read().await.iter().find(|r| r.id == *id).cloned())
    }

    async fn get_all(&self, patroller: Option<&Uuid>) -> Result<Vec<Round>> {
        let mut rounds: Vec<Round> = self
            .rounds
            .read()
            .await
            .iter()
            .filter(|r| patroller.map_or(true, |p| r.patroller_id == *p))
            .cloned()
            .collect();
        rounds.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rounds)
    }

    async fn get_active_for(&self, patroller: &Uuid) -> Result<Option<Round>> {
        Ok(self
            .rounds
            .read()
            .await
            .iter()
            .find(|r| r.patroller_id == *patroller && r.is_active())
            .cloned())
    }

    async fn finish(&self, id: &Uuid, finished_at: DateTime<Utc>) -> Result<Option<Round>> {
        let mut rounds = self.rounds.write().await;
        Ok(rounds
            .iter_mut()
            .find(|r| r.id == *id && r.is_active())
            .map(|round| {
                round.status = RoundStatus::Completed;
                round.finished_at = Some(finished_at);
                round.clone()
            }))
    }

    async fn count_created_since(
        &self,
        since: DateTime<Utc>,
        patroller: Option<&Uuid>,
    ) -> Result<i64> {
        Ok(self
            .rounds
            .read()
            .await
            .iter()
            .filter(|r| r.created_at >= since)
            .filter(|r| patroller.map_or(true, |p| r.patroller_id == *p))
            .count() as i64)
    }

    async fn count_active(&self) -> Result<i64> {
        Ok(self.rounds.read().await.iter().filter(|r| r.is_active()).count() as i64)
    }
}

#[async_trait]
impl ShiftStore for MemoryStore {
    async fn create(&self, shift: &Shift) -> Result<Shift> {
        let mut shifts = self.shifts.write().await;
        if shifts
            .iter()
            .any(|s| s.patroller_id == shift.patroller_id && s.is_active())
        {
            return Err(Error::Conflict("Patroller already has an active shift".to_string()).into());
        }
        shifts.push(shift.clone());
        Ok(shift.clone())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Shift>> {
        Ok(self.shifts.read().await.iter().find(|s| s.id == *id).cloned())
    }

    async fn get_active(&self) -> Result<Vec<Shift>> {
        let mut shifts: Vec<Shift> = self
            .shifts
            .read()
            .await
            .iter()
            .filter(|s| s.is_active())
            .cloned()
            .collect();
        shifts.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(shifts)
    }

    async fn get_active_for(&self, patroller: &Uuid) -> Result<Option<Shift>> {
        Ok(self
            .shifts
            .read()
            .await
            .iter()
            .find(|s| s.patroller_id == *patroller && s.is_active())
            .cloned())
    }

    async fn end(&self, id: &Uuid, ended_at: DateTime<Utc>) -> Result<Option<Shift>> {
        let mut shifts = self.shifts.write().await;
        Ok(shifts
            .iter_mut()
            .find(|s| s.id == *id && s.is_active())
            .map(|shift| {
                shift.ended_at = Some(ended_at);
                shift.clone()
            }))
    }

    async fn count_on_duty(&self) -> Result<i64> {
        let shifts = self.shifts.read().await;
        let on_duty: HashSet<Uuid> = shifts
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.patroller_id)
            .collect();
        Ok(on_duty.len() as i64)
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Location>> {
        let mut locations = self.locations.read().await.clone();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Location>> {
        Ok(self.locations.read().await.iter().find(|l| l.id == *id).cloned())
    }

    async fn upsert_by_name(&self, location: &Location) -> Result<Location> {
        let mut locations = self.locations.write().await;
        match locations.iter_mut().find(|l| l.name == location.name) {
            Some(existing) => {
                *existing = Location {
                    id: existing.id,
                    ..location.clone()
                };
                Ok(existing.clone())
            }
            None => {
                locations.push(location.clone());
                Ok(location.clone())
            }
        }
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        self.audit.write().await.push(entry.clone());
        Ok(())
    }

    async fn get_latest(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let audit = self.audit.read().await;
        Ok(audit
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift_for(patroller: Uuid) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            patroller_id: patroller,
            patroller_name: "Guard".to_string(),
            location: "Gate A".to_string(),
            started_at: Utc::now(),
            ended_at: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_second_active_shift_conflicts() {
        let store = MemoryStore::new();
        let patroller = Uuid::new_v4();
        let first = ShiftStore::create(&store, &shift_for(patroller)).await.unwrap();

        let err = ShiftStore::create(&store, &shift_for(patroller)).await.unwrap_err();
        assert!(matches!(Error::from_anyhow(&err), Some(Error::Conflict(_))));

        store.end(&first.id, Utc::now()).await.unwrap().unwrap();
        assert!(ShiftStore::create(&store, &shift_for(patroller)).await.is_ok());
    }

    fn round_for(patroller: Uuid) -> Round {
        let now = Utc::now();
        Round {
            id: Uuid::new_v4(),
            patroller_id: patroller,
            patroller_name: "Guard".to_string(),
            visited_locations: vec!["Gate A".to_string()],
            notes: None,
            status: RoundStatus::Started,
            started_at: now,
            finished_at: None,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_second_active_round_conflicts() {
        let store = MemoryStore::new();
        let patroller = Uuid::new_v4();
        let first = RoundStore::create(&store, &round_for(patroller)).await.unwrap();

        let err = RoundStore::create(&store, &round_for(patroller)).await.unwrap_err();
        assert!(matches!(Error::from_anyhow(&err), Some(Error::Conflict(_))));
        assert_eq!(RoundStore::count_active(&store).await.unwrap(), 1);

        // Another patroller is unaffected
        assert!(RoundStore::create(&store, &round_for(Uuid::new_v4())).await.is_ok());

        store.finish(&first.id, Utc::now()).await.unwrap().unwrap();
        assert!(RoundStore::create(&store, &round_for(patroller)).await.is_ok());
    }

    #[tokio::test]
    async fn test_end_is_conditional() {
        let store = MemoryStore::new();
        let shift = ShiftStore::create(&store, &shift_for(Uuid::new_v4())).await.unwrap();
        assert!(store.end(&shift.id, Utc::now()).await.unwrap().is_some());
        assert!(store.end(&shift.id, Utc::now()).await.unwrap().is_none());
        assert!(store.end(&Uuid::new_v4(), Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_id() {
        let store = MemoryStore::new();
        let original = Location {
            id: Uuid::new_v4(),
            name: "Parking".to_string(),
            description: "Level 1".to_string(),
            camera_address: None,
            camera_url: None,
            latitude: None,
            longitude: None,
        };
        store.upsert_by_name(&original).await.unwrap();

        let replacement = Location {
            id: Uuid::new_v4(),
            description: "Levels 1-2".to_string(),
            ..original.clone()
        };
        let stored = store.upsert_by_name(&replacement).await.unwrap();
        assert_eq!(stored.id, original.id);
        assert_eq!(stored.description, "Levels 1-2");
        assert_eq!(LocationStore::get_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_audit_latest_first() {
        let store = MemoryStore::new();
        for action in ["LOGIN", "CREATE_INCIDENT", "START_ROUND"] {
            store
                .record(&AuditEntry {
                    id: Uuid::new_v4(),
                    user_id: Uuid::new_v4(),
                    user_name: "Guard".to_string(),
                    action: action.to_string(),
                    resource: "test".to_string(),
                    details: None,
                    timestamp: Utc::now(),
                })
                .await
                .unwrap();
        }

        let latest = store.get_latest(2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].action, "START_ROUND");
        assert_eq!(latest[1].action, "CREATE_INCIDENT");
    }
}
