use crate::db::models::dashboard_models::{DashboardStats, OversightStats, PatrolStats};
use crate::db::models::IncidentPriority;
use crate::db::store::{IncidentStore, RoundStore, ShiftStore, UserStore};
use crate::security::{Operation, RequestContext};
use crate::services::start_of_day;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

/// Role-scoped summary figures, computed from current store state on every call
pub struct DashboardService {
    users: Arc<dyn UserStore>,
    incidents: Arc<dyn IncidentStore>,
    rounds: Arc<dyn RoundStore>,
    shifts: Arc<dyn ShiftStore>,
}

impl DashboardService {
    pub fn new(
        users: Arc<dyn UserStore>,
        incidents: Arc<dyn IncidentStore>,
        rounds: Arc<dyn RoundStore>,
        shifts: Arc<dyn ShiftStore>,
    ) -> Self {
        Self {
            users,
            incidents,
            rounds,
            shifts,
        }
    }

    pub async fn stats(&self, ctx: &RequestContext) -> Result<DashboardStats> {
        ctx.require(Operation::ViewDashboard)?;
        let today = start_of_day(Utc::now());

        // Site-wide view for whoever oversees shifts
        if ctx.can(Operation::ListActiveShifts) {
            return Ok(DashboardStats::Oversight(OversightStats {
                incidents_today: self.incidents.count_created_since(today, None).await?,
                open_incidents: self.incidents.count_unresolved().await?,
                critical_incidents: self
                    .incidents
                    .count_by_priority(IncidentPriority::Critical)
                    .await?,
                personnel_on_duty: self.shifts.count_on_duty().await?,
                total_users: self.users.count_active().await?,
                rounds_today: self.rounds.count_created_since(today, None).await?,
                active_rounds: self.rounds.count_active().await?,
            }));
        }

        Ok(DashboardStats::Patrol(PatrolStats {
            my_incidents_today: self
                .incidents
                .count_created_since(today, Some(&ctx.user_id))
                .await?,
            my_rounds_today: self
                .rounds
                .count_created_since(today, Some(&ctx.user_id))
                .await?,
            active_shift: self.shifts.get_active_for(&ctx.user_id).await?.is_some(),
            active_round: self.rounds.get_active_for(&ctx.user_id).await?.is_some(),
        }))
    }
}
