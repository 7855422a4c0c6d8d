use crate::config::{ApiConfig, Config};
use crate::db::Stores;
use crate::error::Error;
use crate::security::auth::AuthService;
use crate::services::{
    AuditService, DashboardService, IncidentService, LocationService, PhotoStorage, RoundService,
    ShiftService, UserService,
};
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use log::{info, warn};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod audit_controller;
pub mod auth_controller;
pub mod dashboard_controller;
pub mod extract;
pub mod health_controller;
pub mod incident_controller;
pub mod location_controller;
pub mod round_controller;
pub mod shift_controller;
pub mod user_controller;

/// Multipart framing allowance on top of the photo size limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub incidents: Arc<IncidentService>,
    pub rounds: Arc<RoundService>,
    pub shifts: Arc<ShiftService>,
    pub locations: Arc<LocationService>,
    pub dashboard: Arc<DashboardService>,
    pub audit: AuditService,
    pub photos: PhotoStorage,
    pub stores: Stores,
}

impl AppState {
    /// Wire every service onto one set of stores
    pub fn new(stores: Stores, config: &Config) -> Self {
        let audit = AuditService::new(stores.audit.clone());
        let photos = PhotoStorage::new(&config.uploads);

        Self {
            auth: Arc::new(AuthService::new(
                stores.users.clone(),
                audit.clone(),
                &config.security,
            )),
            users: Arc::new(UserService::new(
                stores.users.clone(),
                audit.clone(),
                &config.security,
            )),
            incidents: Arc::new(IncidentService::new(
                stores.incidents.clone(),
                photos.clone(),
                audit.clone(),
            )),
            rounds: Arc::new(RoundService::new(stores.rounds.clone(), audit.clone())),
            shifts: Arc::new(ShiftService::new(stores.shifts.clone(), audit.clone())),
            locations: Arc::new(LocationService::new(stores.locations.clone())),
            dashboard: Arc::new(DashboardService::new(
                stores.users.clone(),
                stores.incidents.clone(),
                stores.rounds.clone(),
                stores.shifts.clone(),
            )),
            audit,
            photos,
            stores,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::Authorization(_) => StatusCode::FORBIDDEN,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyExists(_) | Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Config(_) | Error::Database(_) | Error::Io(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        ApiError::new(status, err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(err) = Error::from_anyhow(&err) {
            return err.clone().into();
        }

        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// Implement IntoResponse for ApiError
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!("Request failed: {}", self.message);
        }
        let body = Json(self);
        (status, body).into_response()
    }
}

/// Build the application router
pub fn router(config: &ApiConfig, state: AppState) -> Router {
    let upload_dir = state.photos.dir().to_path_buf();
    let body_limit = state.photos.max_bytes() + MULTIPART_OVERHEAD_BYTES;

    let api = Router::new()
        .nest("/auth", auth_controller::create_router())
        .nest("/users", user_controller::create_router())
        .nest("/incidents", incident_controller::create_router())
        .nest("/rounds", round_controller::create_router())
        .nest("/shifts", shift_controller::create_router())
        .nest("/locations", location_controller::create_router())
        .nest("/dashboard", dashboard_controller::create_router())
        .nest("/audit-logs", audit_controller::create_router())
        .nest("/health", health_controller::create_router());

    Router::new()
        .nest("/api", api)
        .with_state(state)
        // Incident photos
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    if config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}

pub struct RestApi {
    config: ApiConfig,
    state: AppState,
}

impl RestApi {
    pub fn new(config: &ApiConfig, state: AppState) -> Self {
        Self {
            config: config.clone(),
            state,
        }
    }

    /// Serve until `shutdown` completes
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let addr = format!("{}:{}", self.config.address, self.config.port);
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid API address {}: {}", addr, e)))?;

        let app = router(&self.config, self.state);

        info!("API server listening on {}", addr);

        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_status() {
        let err: ApiError = anyhow::Error::from(Error::Conflict("Round in progress".to_string())).into();
        assert_eq!(err.status, 409);
        assert_eq!(err.message, "Conflict: Round in progress");

        let err: ApiError = anyhow::Error::from(Error::Validation("missing field".to_string()))
            .context("Failed to start round")
            .into();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn test_unknown_errors_are_internal() {
        let err: ApiError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "disk on fire");
    }
}
