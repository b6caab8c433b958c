// src/handlers/earnings.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{CollaboratorRole, RequireRole},
    models::earnings::EarningsSummary,
};

#[utoipa::path(
    get,
    path = "/api/collaborator/earnings",
    tag = "Locations",
    responses(
        (status = 200, description = "Receita bruta e comissão de 40%", body = EarningsSummary),
        (status = 403, description = "Requer o cargo de colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_earnings(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
) -> Result<Json<EarningsSummary>, AppError> {
    Ok(Json(app_state.earnings_service.summary_for(guard.user.id).await?))
}
