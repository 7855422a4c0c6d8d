use serde::Serialize;

/// Dashboard figures; the variant depends on the caller's role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DashboardStats {
    Patrol(PatrolStats),
    Oversight(OversightStats),
}

/// What a guard sees about their own day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatrolStats {
    pub my_incidents_today: i64,
    pub my_rounds_today: i64,
    pub active_shift: bool,
    pub active_round: bool,
}

/// Site-wide figures for supervisors and administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OversightStats {
    pub incidents_today: i64,
    pub open_incidents: i64,
    pub critical_incidents: i64,
    pub personnel_on_duty: i64,
    pub total_users: i64,
    pub rounds_today: i64,
    pub active_rounds: i64,
}
