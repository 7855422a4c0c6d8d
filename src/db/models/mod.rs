pub mod audit_models;
pub mod dashboard_models;
pub mod incident_models;
pub mod location_models;
pub mod round_models;
pub mod shift_models;
pub mod user_models;

pub use audit_models::AuditEntry;
pub use incident_models::{Incident, IncidentPriority, IncidentType};
pub use location_models::Location;
pub use round_models::{Round, RoundStatus};
pub use shift_models::Shift;
pub use user_models::{User, UserRole};
