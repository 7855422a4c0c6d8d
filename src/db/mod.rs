use crate::config::DatabaseConfig;
use crate::error::Error;
use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub mod memory;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod store;

use memory::MemoryStore;
use repositories::{
    audit_logs::AuditLogsRepository, incidents::IncidentsRepository,
    locations::LocationsRepository, rounds::RoundsRepository, shifts::ShiftsRepository,
    users::UsersRepository,
};
use store::{AuditStore, IncidentStore, LocationStore, RoundStore, ShiftStore, UserStore};

/// Database service for handling connections and migrations
pub struct DatabaseService {
    pub pool: Arc<PgPool>,
}

impl DatabaseService {
    /// Create a new database service
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Initializing Database service");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        info!("Connected to PostgreSQL database");

        let service = Self {
            pool: Arc::new(pool),
        };

        // Run migrations if configured
        if config.auto_migrate {
            service.run_migrations().await?;
        }

        Ok(service)
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to run migrations: {}", e)))?;

        info!("Database migrations completed successfully");

        Ok(())
    }
}

/// The record stores shared by every service
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub incidents: Arc<dyn IncidentStore>,
    pub rounds: Arc<dyn RoundStore>,
    pub shifts: Arc<dyn ShiftStore>,
    pub locations: Arc<dyn LocationStore>,
    pub audit: Arc<dyn AuditStore>,
    pool: Option<Arc<PgPool>>,
}

impl Stores {
    /// Stores backed by PostgreSQL repositories
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            users: Arc::new(UsersRepository::new(pool.clone())),
            incidents: Arc::new(IncidentsRepository::new(pool.clone())),
            rounds: Arc::new(RoundsRepository::new(pool.clone())),
            shifts: Arc::new(ShiftsRepository::new(pool.clone())),
            locations: Arc::new(LocationsRepository::new(pool.clone())),
            audit: Arc::new(AuditLogsRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Stores held in process memory
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            incidents: store.clone(),
            rounds: store.clone(),
            shifts: store.clone(),
            locations: store.clone(),
            audit: store,
            pool: None,
        }
    }

    /// Health check for the backing database; the memory store is always healthy
    pub async fn health_check(&self) -> bool {
        let Some(pool) = &self.pool else {
            return true;
        };

        match sqlx::query("SELECT 1").execute(&**pool).await {
            Ok(_) => true,
            Err(e) => {
                error!("Database health check failed: {}", e);
                false
            }
        }
    }
}
