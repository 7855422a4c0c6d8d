use crate::api::rest::extract::CurrentUser;
use crate::api::rest::{ApiResult, AppState};
use crate::db::models::Location;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use uuid::Uuid;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations))
        .route("/:id", get(get_location))
}

pub async fn list_locations(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.locations.list(&ctx).await?))
}

pub async fn get_location(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Location>> {
    Ok(Json(state.locations.get(&ctx, &id).await?))
}
