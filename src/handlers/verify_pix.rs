// src/handlers/verify_pix.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::recharge::{VerifyPixPayload, VerifyPixResponse},
};

#[utoipa::path(
    post,
    path = "/verify-pix",
    tag = "Recharges",
    request_body = VerifyPixPayload,
    responses(
        (status = 200, description = "Resultado da análise do comprovante", body = VerifyPixResponse),
        (status = 400, description = "Recarga já processada, sem comprovante ou comprovante reutilizado"),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Recarga de outro usuário"),
        (status = 404, description = "Recarga não encontrada"),
        (status = 402, description = "Cota do gateway de IA esgotada"),
        (status = 429, description = "Gateway de IA limitou a taxa")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify_pix(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: Result<Json<VerifyPixPayload>, JsonRejection>,
) -> Result<Json<VerifyPixResponse>, AppError> {
    // Corpo ilegível conta como `recharge_id` ausente.
    let recharge_id = body.ok().and_then(|Json(payload)| payload.recharge_id);

    let response = app_state.pix_service.verify(user.id, recharge_id).await?;
    Ok(Json(response))
}
