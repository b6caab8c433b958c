// src/handlers/recharges.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminRole, RequireRole},
    },
    models::recharge::{
        CreateRechargePayload, LedgerReceipt, PixPayloadQuery, PixPayloadResponse,
        RechargeRequest, ReviewRechargePayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/recharges/pix-payload",
    tag = "Recharges",
    params(
        ("amount_cents" = i64, Query, description = "Valor da recarga em centavos (mínimo 500)")
    ),
    responses(
        (status = 200, description = "PIX copia e cola e QR Code em SVG", body = PixPayloadResponse),
        (status = 400, description = "Valor abaixo do mínimo"),
        (status = 500, description = "Chave PIX não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pix_payload(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<PixPayloadQuery>,
) -> Result<Json<PixPayloadResponse>, AppError> {
    query.validate()?;
    Ok(Json(app_state.recharge_service.pix_payload(query.amount_cents)?))
}

#[utoipa::path(
    post,
    path = "/api/recharges",
    tag = "Recharges",
    request_body = CreateRechargePayload,
    responses(
        (status = 201, description = "Recarga registrada como pendente", body = RechargeRequest),
        (status = 400, description = "Valor abaixo do mínimo ou sem comprovante")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_recharge(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateRechargePayload>,
) -> Result<(StatusCode, Json<RechargeRequest>), AppError> {
    payload.validate()?;

    let recharge = app_state
        .recharge_service
        .request_recharge(user.id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(recharge)))
}

#[utoipa::path(
    get,
    path = "/api/recharges",
    tag = "Recharges",
    responses(
        (status = 200, description = "Recargas do usuário, mais recentes primeiro", body = Vec<RechargeRequest>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_recharges(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<RechargeRequest>>, AppError> {
    Ok(Json(app_state.recharge_service.list_for_user(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/recharges",
    tag = "Admin",
    responses(
        (status = 200, description = "Todas as recargas", body = Vec<RechargeRequest>),
        (status = 403, description = "Admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_all_recharges(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminRole>,
) -> Result<Json<Vec<RechargeRequest>>, AppError> {
    Ok(Json(app_state.recharge_service.list_all().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/recharges/{recharge_id}/approve",
    tag = "Admin",
    request_body = ReviewRechargePayload,
    responses(
        (status = 200, description = "Recarga aprovada e saldo creditado", body = LedgerReceipt),
        (status = 400, description = "Recarga já processada"),
        (status = 404, description = "Recarga não encontrada")
    ),
    params(
        ("recharge_id" = Uuid, Path, description = "ID da recarga")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_recharge(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminRole>,
    Path(recharge_id): Path<Uuid>,
    Json(payload): Json<ReviewRechargePayload>,
) -> Result<Json<LedgerReceipt>, AppError> {
    payload.validate()?;

    let receipt = app_state
        .recharge_service
        .approve(recharge_id, payload.admin_notes.as_deref())
        .await?;

    Ok(Json(receipt))
}

#[utoipa::path(
    post,
    path = "/api/admin/recharges/{recharge_id}/reject",
    tag = "Admin",
    request_body = ReviewRechargePayload,
    responses(
        (status = 200, description = "Recarga rejeitada", body = RechargeRequest),
        (status = 400, description = "Recarga já processada"),
        (status = 404, description = "Recarga não encontrada")
    ),
    params(
        ("recharge_id" = Uuid, Path, description = "ID da recarga")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_recharge(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminRole>,
    Path(recharge_id): Path<Uuid>,
    Json(payload): Json<ReviewRechargePayload>,
) -> Result<Json<RechargeRequest>, AppError> {
    payload.validate()?;

    let rejected = app_state
        .recharge_service
        .reject(recharge_id, payload.admin_notes.as_deref())
        .await?;

    Ok(Json(rejected))
}
