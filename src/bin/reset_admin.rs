use std::env;

use chrono::Utc;
use guardpost::config;
use guardpost::db::models::{User, UserRole};
use guardpost::db::repositories::users::UsersRepository;
use guardpost::db::store::UserStore;
use guardpost::security::password;
use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Reset (or create) an administrator account.
///
/// Usage: `reset_admin [email] [new-password]`. Without a password a random one
/// is generated and printed once. Reads the server configuration named by
/// `GUARDPOST_CONFIG`; `DATABASE_URL` overrides its database URL.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::var("GUARDPOST_CONFIG").ok().map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| config.database.url.clone());

    let mut args = env::args().skip(1);
    let email = args
        .next()
        .unwrap_or_else(|| config.bootstrap.admin_email.clone())
        .trim()
        .to_lowercase();
    let new_password = args
        .next()
        .unwrap_or_else(|| password::generate_random_password(16));
    password::validate_password(&new_password)?;

    info!("Connecting to database at {}", database_url);
    let pool = Arc::new(
        PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?,
    );

    // Users table only; the rest of the schema is left to the server
    if let Err(e) = guardpost::db::migrations::run_single_migration(&pool, "001_users.sql").await {
        error!("Migration failed: {}", e);
        return Err(e);
    }

    let users = UsersRepository::new(pool);
    let password_hash = password::hash_password(&new_password, &config.security)?;

    match users.get_by_email(&email).await? {
        Some(user) => {
            let mut updated = user.clone();
            updated.password_hash = password_hash;
            updated.role = UserRole::Administrator;
            updated.active = true;
            updated.updated_at = Utc::now();
            users.update(&updated).await?;
            info!("Password reset for {}", email);
        }
        None => {
            let now = Utc::now();
            let admin = User {
                id: Uuid::new_v4(),
                name: config.bootstrap.admin_name.clone(),
                email: email.clone(),
                password_hash,
                role: UserRole::Administrator,
                phone: None,
                department: None,
                active: true,
                created_at: now,
                updated_at: now,
                last_login: None,
            };
            users.create(&admin).await?;
            info!("Administrator {} created", email);
        }
    }

    println!("Administrator: {}", email);
    println!("Password:      {}", new_password);

    Ok(())
}
