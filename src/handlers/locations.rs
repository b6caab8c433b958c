// src/handlers/locations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{CollaboratorRole, RequireRole},
    models::device::{CreateLocationPayload, Location, LocationOverview},
};

#[utoipa::path(
    post,
    path = "/api/locations",
    tag = "Locations",
    request_body = CreateLocationPayload,
    responses(
        (status = 201, description = "Chipeira criada com uma API key nova", body = Location),
        (status = 403, description = "Requer o cargo de colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_location(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Json(payload): Json<CreateLocationPayload>,
) -> Result<(StatusCode, Json<Location>), AppError> {
    payload.validate()?;

    let location = app_state
        .location_service
        .create_location(guard.user.id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Locations",
    responses(
        (status = 200, description = "Chipeiras com modems, chips e status efetivo", body = Vec<LocationOverview>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_locations(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
) -> Result<Json<Vec<LocationOverview>>, AppError> {
    let overview = app_state
        .location_service
        .overview(guard.user.id, guard.is_admin())
        .await?;

    Ok(Json(overview))
}

#[utoipa::path(
    delete,
    path = "/api/locations/{location_id}",
    tag = "Locations",
    responses(
        (status = 204, description = "Chipeira removida junto com modems e chips"),
        (status = 403, description = "Chipeira de outro colaborador"),
        (status = 404, description = "Chipeira não encontrada")
    ),
    params(
        ("location_id" = Uuid, Path, description = "ID da chipeira")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_location(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Path(location_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state
        .location_service
        .delete_location(guard.user.id, guard.is_admin(), location_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
