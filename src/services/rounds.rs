use crate::db::models::round_models::{CreateRoundRequest, Round, RoundStatus};
use crate::db::store::RoundStore;
use crate::error::Error;
use crate::security::{Operation, RequestContext};
use crate::services::audit::{AuditAction, AuditService};
use crate::services::optional_text;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct RoundService {
    rounds: Arc<dyn RoundStore>,
    audit: AuditService,
}

impl RoundService {
    pub fn new(rounds: Arc<dyn RoundStore>, audit: AuditService) -> Self {
        Self { rounds, audit }
    }

    /// Start a round for the caller. Blank location entries are dropped; at
    /// least one must remain.
    pub async fn create(&self, ctx: &RequestContext, request: &CreateRoundRequest) -> Result<Round> {
        ctx.require(Operation::CreateRound)?;

        let visited_locations = clean_locations(&request.visited_locations);
        if visited_locations.is_empty() {
            return Err(Error::Validation("A round needs at least one visited location".to_string()).into());
        }

        if self.rounds.get_active_for(&ctx.user_id).await?.is_some() {
            return Err(Error::Conflict(
                "A round is already in progress, finish it before starting a new one".to_string(),
            )
            .into());
        }

        let now = Utc::now();
        let round = Round {
            id: Uuid::new_v4(),
            patroller_id: ctx.user_id,
            patroller_name: ctx.name.clone(),
            visited_locations,
            notes: optional_text(request.notes.as_deref()),
            status: RoundStatus::Started,
            started_at: now,
            finished_at: None,
            created_at: now,
        };

        // The store still rejects a racing second start.
        let round = self.rounds.create(&round).await?;

        self.audit
            .record(
                ctx,
                AuditAction::StartRound,
                "rounds",
                Some(format!("Round started: {} locations", round.visited_locations.len())),
            )
            .await;

        Ok(round)
    }

    /// Rounds newest first; patrol guards only see their own
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Round>> {
        ctx.require(Operation::ListRounds)?;
        if ctx.can(Operation::ViewAllRounds) {
            self.rounds.get_all(None).await
        } else {
            self.rounds.get_all(Some(&ctx.user_id)).await
        }
    }

    pub async fn finish(&self, ctx: &RequestContext, id: &Uuid) -> Result<Round> {
        let round = self
            .rounds
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Round not found: {}", id)))?;
        ctx.require_owner_or(&round.patroller_id, Operation::FinishRound, Operation::FinishAnyRound)?;

        if !round.is_active() {
            return Err(Error::Conflict(format!("Round {} is already completed", id)).into());
        }

        let round = self
            .rounds
            .finish(id, Utc::now())
            .await?
            .ok_or_else(|| Error::Conflict(format!("Round {} is already completed", id)))?;

        info!("Round {} completed by {}", id, ctx.name);
        self.audit
            .record(
                ctx,
                AuditAction::FinishRound,
                "rounds",
                Some(format!("Round {} completed", id)),
            )
            .await;

        Ok(round)
    }
}

fn clean_locations(locations: &[String]) -> Vec<String> {
    locations
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::models::UserRole;

    fn service() -> RoundService {
        let store = Arc::new(MemoryStore::new());
        RoundService::new(store.clone(), AuditService::new(store))
    }

    fn ctx(role: UserRole) -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            name: "Guard".to_string(),
            role,
        }
    }

    fn request(locations: &[&str]) -> CreateRoundRequest {
        CreateRoundRequest {
            visited_locations: locations.iter().map(|l| l.to_string()).collect(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_blank_locations_dropped() {
        let rounds = service();
        let round = rounds
            .create(&ctx(UserRole::Patrol), &request(&["", "  ", "Gate A"]))
            .await
            .unwrap();
        assert_eq!(round.visited_locations, vec!["Gate A".to_string()]);
        assert_eq!(round.status, RoundStatus::Started);
    }

    #[tokio::test]
    async fn test_all_blank_rejected() {
        let rounds = service();
        let patrol = ctx(UserRole::Patrol);
        let err = rounds.create(&patrol, &request(&["", ""])).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Validation(_))));
        assert!(rounds.list(&patrol).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_active_round() {
        let rounds = service();
        let patrol = ctx(UserRole::Patrol);
        let first = rounds.create(&patrol, &request(&["Gate A"])).await.unwrap();

        let err = rounds.create(&patrol, &request(&["Lobby"])).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Conflict(_))));

        let finished = rounds.finish(&patrol, &first.id).await.unwrap();
        assert_eq!(finished.status, RoundStatus::Completed);
        assert!(finished.finished_at.is_some());

        rounds.create(&patrol, &request(&["Lobby"])).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_starts_leave_one_active() {
        let rounds = Arc::new(service());
        let patrol = ctx(UserRole::Patrol);

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let rounds = rounds.clone();
            let patrol = patrol.clone();
            tasks.spawn(async move { rounds.create(&patrol, &request(&["Gate A"])).await });
        }

        let mut started = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => started += 1,
                Err(err) => assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Conflict(_)))),
            }
        }
        assert_eq!(started, 1);

        let listed = rounds.list(&patrol).await.unwrap();
        assert_eq!(listed.iter().filter(|r| r.is_active()).count(), 1);
    }

    #[tokio::test]
    async fn test_finish_rules() {
        let rounds = service();
        let owner = ctx(UserRole::Patrol);
        let round = rounds.create(&owner, &request(&["Parking"])).await.unwrap();

        let err = rounds.finish(&ctx(UserRole::Patrol), &round.id).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Authorization(_))));

        rounds.finish(&ctx(UserRole::Supervisor), &round.id).await.unwrap();

        let again = rounds.finish(&owner, &round.id).await.unwrap_err();
        assert!(matches!(again.downcast_ref::<Error>(), Some(Error::Conflict(_))));

        let missing = rounds.finish(&owner, &Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(missing.downcast_ref::<Error>(), Some(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_visibility() {
        let rounds = service();
        let first = ctx(UserRole::Patrol);
        let second = ctx(UserRole::Patrol);
        rounds.create(&first, &request(&["Gate A"])).await.unwrap();
        rounds.create(&second, &request(&["Gate B"])).await.unwrap();

        let own = rounds.list(&first).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].patroller_id, first.user_id);

        assert_eq!(rounds.list(&ctx(UserRole::Supervisor)).await.unwrap().len(), 2);
    }
}
