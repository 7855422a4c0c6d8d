use crate::error::Error;

pub mod audit_logs;
pub mod incidents;
pub mod locations;
pub mod rounds;
pub mod shifts;
pub mod users;

/// Map a sqlx error to a domain error, turning unique violations into `on_unique`
pub(crate) fn map_db_error(e: sqlx::Error, context: &str, on_unique: impl FnOnce() -> Error) -> Error {
    let unique = e
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);

    if unique {
        on_unique()
    } else {
        Error::Database(format!("{}: {}", context, e))
    }
}
