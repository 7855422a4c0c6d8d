use crate::api::rest::extract::{CurrentUser, JsonBody};
use crate::api::rest::{ApiResult, AppState};
use crate::db::models::round_models::{CreateRoundRequest, Round};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use uuid::Uuid;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rounds).post(create_round))
        .route("/:id/finish", put(finish_round))
}

pub async fn create_round(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    JsonBody(request): JsonBody<CreateRoundRequest>,
) -> ApiResult<(StatusCode, Json<Round>)> {
    let round = state.rounds.create(&ctx, &request).await?;
    Ok((StatusCode::CREATED, Json(round)))
}

pub async fn list_rounds(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> ApiResult<Json<Vec<Round>>> {
    Ok(Json(state.rounds.list(&ctx).await?))
}

pub async fn finish_round(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Round>> {
    Ok(Json(state.rounds.finish(&ctx, &id).await?))
}
