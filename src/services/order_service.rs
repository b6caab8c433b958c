// src/services/order_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrderRepository,
    models::orders::{
        ActivateOrderPayload, CancelledOrder, CreateOrderPayload, LockedOrder, Order, OrderStatus,
        OrderWithService,
    },
    services::ledger_service::LedgerService,
};

/// Com comprovante o pedido aguarda conferência; sem ele, sai do saldo na hora.
pub fn initial_status(pix_proof_url: Option<&str>) -> OrderStatus {
    match pix_proof_url {
        Some(_) => OrderStatus::PendingPayment,
        None => OrderStatus::Paid,
    }
}

fn ensure_can_manage(order: &LockedOrder, caller_id: Uuid, is_admin: bool) -> Result<(), AppError> {
    if order.service_owner_id == caller_id || is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Este pedido é de um serviço de outro colaborador.".into(),
        ))
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Pedido não encontrado.".into())
}

fn no_phone_target() -> AppError {
    AppError::BadRequest("Selecione um chip ou informe um número".into())
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    ledger: LedgerService,
    pool: PgPool,
}

impl OrderService {
    pub fn new(order_repo: OrderRepository, ledger: LedgerService, pool: PgPool) -> Self {
        Self { order_repo, ledger, pool }
    }

    /// Compra: o valor do pedido é o preço do serviço neste instante.
    pub async fn place_order(
        &self,
        customer_id: Uuid,
        payload: &CreateOrderPayload,
    ) -> Result<Order, AppError> {
        let proof = payload.pix_proof_url.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .create(&mut *tx, customer_id, payload.service_id, proof, initial_status(proof))
            .await?
            .ok_or_else(|| AppError::NotFound("Serviço não encontrado ou inativo.".into()))?;

        if proof.is_none() {
            self.ledger
                .adjust_balance_in(&mut *tx, customer_id, -order.amount_cents)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "🛒 Pedido {} criado por {} ({} centavos, {})",
            order.id,
            customer_id,
            order.amount_cents,
            order.status
        );
        Ok(order)
    }

    pub async fn list_mine(&self, customer_id: Uuid) -> Result<Vec<OrderWithService>, AppError> {
        self.order_repo.list_for_customer(customer_id).await
    }

    pub async fn list_managed(
        &self,
        caller_id: Uuid,
        is_admin: bool,
    ) -> Result<Vec<OrderWithService>, AppError> {
        self.order_repo
            .list_for_service_owner((!is_admin).then_some(caller_id))
            .await
    }

    /// Entrega o número ao cliente: chip escolhido ou número informado à mão.
    pub async fn activate(
        &self,
        caller_id: Uuid,
        is_admin: bool,
        order_id: Uuid,
        payload: &ActivateOrderPayload,
    ) -> Result<Order, AppError> {
        if payload.chip_id.is_none() && payload.manual_phone().is_none() {
            return Err(no_phone_target());
        }

        let mut tx = self.pool.begin().await?;
        let locked = self.order_repo.lock(&mut *tx, order_id).await?.ok_or_else(not_found)?;
        ensure_can_manage(&locked, caller_id, is_admin)?;
        if !locked.status.can_activate() {
            return Err(AppError::InvalidOrderTransition { status: locked.status });
        }

        let phone_number = match payload.manual_phone() {
            Some(phone) => phone.to_string(),
            None => {
                let chip_id = payload.chip_id.ok_or_else(no_phone_target)?;
                self.order_repo
                    .chip_phone(&mut *tx, chip_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Chip não encontrado.".into()))?
            }
        };

        let order = self
            .order_repo
            .activate(&mut *tx, order_id, payload.chip_id, &phone_number, payload.notes())
            .await?
            .ok_or(AppError::InvalidOrderTransition { status: locked.status })?;

        tx.commit().await?;

        tracing::info!("📲 Pedido {} ativado com o número {}", order_id, phone_number);
        Ok(order)
    }

    pub async fn complete(&self, caller_id: Uuid, is_admin: bool, order_id: Uuid) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;
        let locked = self.order_repo.lock(&mut *tx, order_id).await?.ok_or_else(not_found)?;
        ensure_can_manage(&locked, caller_id, is_admin)?;
        if !locked.status.can_complete() {
            return Err(AppError::InvalidOrderTransition { status: locked.status });
        }

        let order = self
            .order_repo
            .complete(&mut *tx, order_id)
            .await?
            .ok_or(AppError::InvalidOrderTransition { status: locked.status })?;

        tx.commit().await?;

        tracing::info!("✅ Pedido {} concluído", order_id);
        Ok(order)
    }

    /// Cancela e estorna, tudo numa transação. A linha fica travada, então
    /// dois cancelamentos simultâneos estornam uma vez só.
    pub async fn cancel(
        &self,
        caller_id: Uuid,
        is_admin: bool,
        order_id: Uuid,
    ) -> Result<CancelledOrder, AppError> {
        let mut tx = self.pool.begin().await?;
        let locked = self.order_repo.lock(&mut *tx, order_id).await?.ok_or_else(not_found)?;
        ensure_can_manage(&locked, caller_id, is_admin)?;
        if !locked.status.can_cancel() {
            return Err(AppError::InvalidOrderTransition { status: locked.status });
        }

        let order = self
            .order_repo
            .cancel(&mut *tx, order_id)
            .await?
            .ok_or(AppError::InvalidOrderTransition { status: locked.status })?;

        let refunded_cents = locked.status.refund_on_cancel(locked.amount_cents);
        if refunded_cents > 0 {
            self.ledger
                .adjust_balance_in(&mut *tx, locked.customer_id, refunded_cents)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "↩️ Pedido {} cancelado; {} centavos estornados para {}",
            order_id,
            refunded_cents,
            locked.customer_id
        );
        Ok(CancelledOrder { order, refunded_cents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked(owner: Uuid) -> LockedOrder {
        LockedOrder {
            customer_id: Uuid::new_v4(),
            amount_cents: 1_000,
            status: OrderStatus::Paid,
            service_owner_id: owner,
        }
    }

    #[test]
    fn proof_decides_initial_status() {
        assert_eq!(initial_status(Some("cliente/1.jpg")), OrderStatus::PendingPayment);
        assert_eq!(initial_status(None), OrderStatus::Paid);
    }

    #[test]
    fn only_service_owner_or_admin_manages_order() {
        let owner = Uuid::new_v4();
        let order = locked(owner);
        assert!(ensure_can_manage(&order, owner, false).is_ok());
        assert!(ensure_can_manage(&order, Uuid::new_v4(), true).is_ok());
        assert!(matches!(
            ensure_can_manage(&order, Uuid::new_v4(), false),
            Err(AppError::Forbidden(_))
        ));
    }
}
