//! Capability table: which roles may perform which operations.
//!
//! Every role check in the crate goes through [`is_allowed`]; services never
//! branch on a role to decide authorization themselves.

use crate::db::models::UserRole;
use std::fmt::{Display, Formatter};

/// Operations subject to a role check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ViewOwnProfile,
    ChangeOwnPassword,
    CreateUser,
    UpdateUser,
    ListUsers,
    CreateIncident,
    ListIncidents,
    ResolveIncident,
    AttachPhoto,
    /// Attach photos to incidents reported by someone else
    EditAnyIncident,
    CreateRound,
    ListRounds,
    /// See every patroller's rounds, not only one's own
    ViewAllRounds,
    FinishRound,
    FinishAnyRound,
    StartShift,
    EndShift,
    EndAnyShift,
    ListActiveShifts,
    ListLocations,
    ViewDashboard,
    ViewAuditLog,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Whether `role` may perform `operation`
pub fn is_allowed(role: UserRole, operation: Operation) -> bool {
    use Operation::*;
    use UserRole::*;

    match operation {
        CreateUser | UpdateUser | ViewAuditLog => role == Administrator,

        ListUsers | ResolveIncident | EditAnyIncident | ViewAllRounds | FinishAnyRound
        | EndAnyShift | ListActiveShifts => matches!(role, Supervisor | Administrator),

        StartShift | EndShift => role == Patrol,

        ViewOwnProfile | ChangeOwnPassword | CreateIncident | ListIncidents | AttachPhoto
        | CreateRound | ListRounds | FinishRound | ListLocations | ViewDashboard => true,
    }
}
