use crate::api::rest::extract::{CurrentUser, JsonBody};
use crate::api::rest::{ApiResult, AppState};
use crate::db::models::incident_models::{
    CreateIncidentRequest, Incident, PhotoUploaded, ResolveIncidentRequest,
};
use crate::error::Error;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use log::info;
use uuid::Uuid;

/// Multipart field carrying the photo
const PHOTO_FIELD: &str = "file";

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_incidents).post(create_incident))
        .route("/:id", get(get_incident))
        .route("/:id/resolve", put(resolve_incident))
        .route("/:id/photos", post(upload_photo))
}

pub async fn create_incident(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    JsonBody(request): JsonBody<CreateIncidentRequest>,
) -> ApiResult<(StatusCode, Json<Incident>)> {
    let incident = state.incidents.create(&ctx, &request).await?;
    info!(
        "Incident {} ({}, {:?}) reported by {}",
        incident.id,
        incident.incident_type.as_str(),
        incident.priority,
        ctx.name
    );
    Ok((StatusCode::CREATED, Json(incident)))
}

pub async fn list_incidents(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> ApiResult<Json<Vec<Incident>>> {
    Ok(Json(state.incidents.list(&ctx).await?))
}

pub async fn get_incident(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Incident>> {
    Ok(Json(state.incidents.get(&ctx, &id).await?))
}

pub async fn resolve_incident(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<ResolveIncidentRequest>,
) -> ApiResult<Json<Incident>> {
    Ok(Json(
        state
            .incidents
            .resolve(&ctx, &id, &request.resolution_notes)
            .await?,
    ))
}

/// Accept a `multipart/form-data` upload with the image in the `file` field
pub async fn upload_photo(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PhotoUploaded>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Failed to read photo: {}", e)))?;

        let uploaded = state
            .incidents
            .attach_photo(&ctx, &id, &file_name, &bytes)
            .await?;
        return Ok((StatusCode::CREATED, Json(uploaded)));
    }

    Err(Error::Validation(format!("Missing multipart field '{}'", PHOTO_FIELD)).into())
}
