use crate::api::rest::extract::{CurrentUser, JsonBody};
use crate::api::rest::{ApiResult, AppState};
use crate::db::models::shift_models::{Shift, StartShiftRequest};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use uuid::Uuid;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_shift))
        .route("/active", get(list_active_shifts))
        .route("/:id/end", put(end_shift))
}

pub async fn start_shift(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    JsonBody(request): JsonBody<StartShiftRequest>,
) -> ApiResult<(StatusCode, Json<Shift>)> {
    let shift = state.shifts.start(&ctx, &request).await?;
    Ok((StatusCode::CREATED, Json(shift)))
}

/// Shifts currently in progress (supervisors and administrators)
pub async fn list_active_shifts(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> ApiResult<Json<Vec<Shift>>> {
    Ok(Json(state.shifts.list_active(&ctx).await?))
}

pub async fn end_shift(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Shift>> {
    Ok(Json(state.shifts.end(&ctx, &id).await?))
}
