// src/handlers/manage_users.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminRole, RequireRole},
    models::users::{UserAdminCommand, UserAdminResponse},
};

/// Corpo `{ action, ... }` com as ações `list`, `create`, `delete`,
/// `update_role`, `add_balance` e `reset_password`.
#[utoipa::path(
    post,
    path = "/manage-users",
    tag = "Admin",
    request_body(content = Object, description = "`{ action, ... }`"),
    responses(
        (status = 200, description = "Resultado da ação", body = UserAdminResponse),
        (status = 400, description = "Ação ou dados inválidos"),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Admin only")
    ),
    security(("api_jwt" = []))
)]
pub async fn manage_users(
    State(app_state): State<AppState>,
    guard: RequireRole<AdminRole>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserAdminResponse>, AppError> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let command = UserAdminCommand::parse(&body)?;

    let response = app_state
        .user_admin_service
        .execute(guard.user.id, command)
        .await?;

    Ok(Json(response))
}
