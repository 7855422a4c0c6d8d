use crate::api::rest::extract::{CurrentUser, JsonBody};
use crate::api::rest::user_controller::create_user;
use crate::api::rest::{ApiResult, AppState};
use crate::db::models::user_models::{LoginCredentials, LoginResponse, PasswordChange, User};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use log::info;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(create_user))
        .route("/me", get(me))
        .route("/change-password", post(change_password))
}

/// Exchange email and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<LoginCredentials>,
) -> ApiResult<Json<LoginResponse>> {
    let (user, token) = state.auth.login(&credentials).await?;
    Ok(Json(LoginResponse { token, user }))
}

pub async fn me(State(state): State<AppState>, CurrentUser(ctx): CurrentUser) -> ApiResult<Json<User>> {
    Ok(Json(state.users.me(&ctx).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    JsonBody(request): JsonBody<PasswordChange>,
) -> ApiResult<StatusCode> {
    state
        .auth
        .change_password(
            &ctx,
            &request.current_password,
            &request.new_password,
            &request.confirm_password,
        )
        .await?;

    info!("Password changed via API for {}", ctx.name);
    Ok(StatusCode::NO_CONTENT)
}
