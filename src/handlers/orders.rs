// src/handlers/orders.rs

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
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CollaboratorRole, RequireRole},
    },
    models::orders::{
        ActivateOrderPayload, CancelledOrder, CreateOrderPayload, Order, OrderWithService,
    },
};

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado com o preço atual do serviço", body = Order),
        (status = 400, description = "Saldo insuficiente (compra sem comprovante)"),
        (status = 404, description = "Serviço não encontrado ou inativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    payload.validate()?;

    let order = app_state.order_service.place_order(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedidos do cliente, mais recentes primeiro", body = Vec<OrderWithService>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_orders(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<OrderWithService>>, AppError> {
    Ok(Json(app_state.order_service.list_mine(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedidos dos serviços do colaborador (admin: todos)", body = Vec<OrderWithService>),
        (status = 403, description = "Requer o cargo de colaborador")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_managed_orders(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
) -> Result<Json<Vec<OrderWithService>>, AppError> {
    let orders = app_state
        .order_service
        .list_managed(guard.user.id, guard.is_admin())
        .await?;
    Ok(Json(orders))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{order_id}/activate",
    tag = "Orders",
    request_body = ActivateOrderPayload,
    responses(
        (status = 200, description = "Pedido ativo; o cliente já vê o número", body = Order),
        (status = 400, description = "Sem chip/número ou pedido fora de pending_payment/paid"),
        (status = 403, description = "Pedido de serviço de outro colaborador"),
        (status = 404, description = "Pedido ou chip não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn activate_order(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<ActivateOrderPayload>,
) -> Result<Json<Order>, AppError> {
    payload.validate()?;

    let order = app_state
        .order_service
        .activate(guard.user.id, guard.is_admin(), order_id, &payload)
        .await?;
    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{order_id}/complete",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedido concluído", body = Order),
        (status = 400, description = "Pedido não está pago nem ativo"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_order(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = app_state
        .order_service
        .complete(guard.user.id, guard.is_admin(), order_id)
        .await?;
    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{order_id}/cancel",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedido cancelado; valor pago volta ao saldo do cliente", body = CancelledOrder),
        (status = 400, description = "Pedido já concluído ou cancelado"),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("order_id" = Uuid, Path, description = "ID do pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_order(
    State(app_state): State<AppState>,
    guard: RequireRole<CollaboratorRole>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<CancelledOrder>, AppError> {
    let cancelled = app_state
        .order_service
        .cancel(guard.user.id, guard.is_admin(), order_id)
        .await?;
    Ok(Json(cancelled))
}
