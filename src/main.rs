use anyhow::Result;
use guardpost::config::{self, Config, StorageBackend};
use guardpost::db::{DatabaseService, Stores};
use guardpost::{AppState, RestApi};
use log::{error, info};
use std::path::PathBuf;

/// Environment variable naming the configuration file
const CONFIG_ENV: &str = "GUARDPOST_CONFIG";

fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from)
}

async fn open_stores(config: &Config) -> Result<Stores> {
    match config.database.backend {
        StorageBackend::Postgres => {
            let database = DatabaseService::new(&config.database).await?;
            Ok(Stores::postgres(database.pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            Ok(Stores::memory())
        }
    }
}

async fn run_app() -> Result<()> {
    let config = config::load_config(config_path().as_deref())?;

    // Initialize logging; RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.api.log_level.as_str()),
    )
    .init();
    info!("Starting guardpost security operations backend");
    info!("Configuration loaded");

    let stores = open_stores(&config).await?;
    let state = AppState::new(stores, &config);

    state.photos.ensure_dir().await?;
    info!("Photo uploads stored in {:?}", state.photos.dir());

    state.auth.ensure_default_admin(&config.bootstrap).await?;
    state.locations.seed(&config.locations).await?;

    let http_server = RestApi::new(&config.api, state);
    http_server
        .run(async {
            // Wait for termination signals
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down...");
        })
        .await?;

    Ok(())
}

fn main() {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_app()) {
        eprintln!("Application error: {:#}", e);
        std::process::exit(1);
    }
}
