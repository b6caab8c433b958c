// src/handlers/gateway.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::device::{BoundedBody, DeviceApiKey},
    models::device::{SyncPayload, SyncResponse},
};

/// Heartbeat da chipeira. A ordem dos extratores define a ordem das checagens:
/// chave (401), tamanho (413), chave ativa (403), corpo (400).
#[utoipa::path(
    post,
    path = "/gsm-gateway",
    tag = "Gateway",
    request_body = SyncPayload,
    responses(
        (status = 200, description = "Modems e chips sincronizados", body = SyncResponse),
        (status = 400, description = "Payload inválido"),
        (status = 401, description = "API key ausente"),
        (status = 403, description = "API key inválida ou inativa"),
        (status = 413, description = "Payload acima de 512 000 bytes")
    ),
    params(
        ("x-api-key" = String, Header, description = "Chave da chipeira")
    )
)]
pub async fn sync(
    State(app_state): State<AppState>,
    DeviceApiKey(api_key): DeviceApiKey,
    BoundedBody(body): BoundedBody,
) -> Result<Json<SyncResponse>, AppError> {
    let location_id = app_state.gateway_service.handle_sync(&api_key, &body).await?;

    Ok(Json(SyncResponse { success: true, location_id }))
}

// Qualquer outro método ou caminho.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
