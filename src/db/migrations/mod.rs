use anyhow::Result;
use sqlx::{Executor, PgPool};
use tracing::info;

/// Schema scripts in application order. Every script is idempotent so the whole
/// set runs on each startup.
const MIGRATIONS: &[(&str, &str)] = &[
    ("001_users.sql", include_str!("sql/001_users.sql")),
    ("002_incidents.sql", include_str!("sql/002_incidents.sql")),
    ("003_rounds.sql", include_str!("sql/003_rounds.sql")),
    ("004_shifts.sql", include_str!("sql/004_shifts.sql")),
    ("005_locations.sql", include_str!("sql/005_locations.sql")),
    ("006_audit_logs.sql", include_str!("sql/006_audit_logs.sql")),
];

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for (name, sql) in MIGRATIONS {
        execute_migration(pool, name, sql).await?;
        info!("Applied migration: {}", name);
    }

    Ok(())
}

/// Run a specific migration by file name
pub async fn run_single_migration(pool: &PgPool, migration_name: &str) -> Result<()> {
    let (name, sql) = MIGRATIONS
        .iter()
        .find(|(name, _)| *name == migration_name)
        .ok_or_else(|| anyhow::anyhow!("Migration {} not found", migration_name))?;

    execute_migration(pool, name, sql).await
}

async fn execute_migration(pool: &PgPool, name: &str, sql: &str) -> Result<()> {
    pool.execute(sql)
        .await
        .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;

    Ok(())
}
