use crate::api::rest::extract::CurrentUser;
use crate::api::rest::{ApiResult, AppState};
use crate::db::models::dashboard_models::DashboardStats;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

pub fn create_router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

/// Figures for the caller's role: own day for patrol, site-wide otherwise
pub async fn get_stats(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.dashboard.stats(&ctx).await?))
}
