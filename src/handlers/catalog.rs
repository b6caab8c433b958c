// src/handlers/catalog.rs

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
    models::catalog::{Service, ServicePayload},
};

#[utoipa::path(
    get,
    path = "/api/store/services",
    tag = "Store",
    responses(
        (status = 200, description = "Serviços ativos, do mais barato ao mais caro", body = Vec<Service>)
    )
)]
pub async fn list_store_services(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Service>>, AppError> {
    Ok(Json(app_state.catalog_service.list_store().await?))
}

#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Store",
    responses(
        (status = 200, description = "Serviços do colaborador (admin: todos)", body = Vec<Service>),
        (status = 403, description = "Requer o cargo de colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_services(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
) -> Result<Json<Vec<Service>>, AppError> {
    let services = app_state
        .catalog_service
        .list_managed(guard.user.id, guard.is_admin())
        .await?;
    Ok(Json(services))
}

#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Store",
    request_body = ServicePayload,
    responses(
        (status = 201, description = "Serviço criado", body = Service),
        (status = 403, description = "Requer o cargo de colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Json(payload): Json<ServicePayload>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    payload.validate()?;

    let service = app_state.catalog_service.create(guard.user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

#[utoipa::path(
    put,
    path = "/api/services/{service_id}",
    tag = "Store",
    request_body = ServicePayload,
    responses(
        (status = 200, description = "Serviço atualizado; pedidos existentes mantêm o valor", body = Service),
        (status = 403, description = "Serviço de outro colaborador"),
        (status = 404, description = "Serviço não encontrado")
    ),
    params(
        ("service_id" = Uuid, Path, description = "ID do serviço")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<ServicePayload>,
) -> Result<Json<Service>, AppError> {
    payload.validate()?;

    let service = app_state
        .catalog_service
        .update(guard.user.id, guard.is_admin(), service_id, &payload)
        .await?;
    Ok(Json(service))
}

#[utoipa::path(
    post,
    path = "/api/services/{service_id}/toggle",
    tag = "Store",
    responses(
        (status = 200, description = "Serviço ativado ou desativado", body = Service),
        (status = 403, description = "Serviço de outro colaborador"),
        (status = 404, description = "Serviço não encontrado")
    ),
    params(
        ("service_id" = Uuid, Path, description = "ID do serviço")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_service(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Service>, AppError> {
    let service = app_state
        .catalog_service
        .toggle_active(guard.user.id, guard.is_admin(), service_id)
        .await?;
    Ok(Json(service))
}

#[utoipa::path(
    delete,
    path = "/api/services/{service_id}",
    tag = "Store",
    responses(
        (status = 204, description = "Serviço removido"),
        (status = 400, description = "Serviço com pedidos; desative em vez de excluir"),
        (status = 403, description = "Serviço de outro colaborador"),
        (status = 404, description = "Serviço não encontrado")
    ),
    params(
        ("service_id" = Uuid, Path, description = "ID do serviço")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Path(service_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state
        .catalog_service
        .delete(guard.user.id, guard.is_admin(), service_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
