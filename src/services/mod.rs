use crate::error::Error;
use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};

pub mod audit;
pub mod dashboard;
pub mod incidents;
pub mod locations;
pub mod photos;
pub mod rounds;
pub mod shifts;
pub mod users;

pub use audit::AuditService;
pub use dashboard::DashboardService;
pub use incidents::IncidentService;
pub use locations::LocationService;
pub use photos::PhotoStorage;
pub use rounds::RoundService;
pub use shifts::ShiftService;
pub use users::UserService;

/// Trimmed value of a required text field
pub(crate) fn non_blank(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", field)).into());
    }
    Ok(trimmed.to_string())
}

/// Trimmed value of an optional text field; blank becomes `None`
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Midnight UTC of the day containing `now`
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_day() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 17, 45, 3).unwrap();
        assert_eq!(
            start_of_day(now),
            Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(non_blank("  Gate A ", "location").unwrap(), "Gate A");
        assert!(non_blank(" \t", "location").is_err());
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" note ")), Some("note".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
