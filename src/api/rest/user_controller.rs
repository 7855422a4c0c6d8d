use crate::api::rest::extract::{CurrentUser, JsonBody};
use crate::api::rest::{ApiResult, AppState};
use crate::db::models::user_models::{CreateUserRequest, UpdateUserRequest, User};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use uuid::Uuid;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", put(update_user))
}

pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.users.create(&ctx, &request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list(&ctx).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.update(&ctx, &id, &request).await?))
}
