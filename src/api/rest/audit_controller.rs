use crate::api::rest::extract::CurrentUser;
use crate::api::rest::{ApiResult, AppState};
use crate::db::models::audit_models::{AuditEntry, AuditQuery};
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}

/// Latest audit entries, `?limit=` capped server side
pub async fn list_audit_logs(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    Ok(Json(state.audit.list(&ctx, query.limit).await?))
}
