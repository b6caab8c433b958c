// src/models/orders.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::catalog::ServiceType;

// Ciclo de vida: pending_payment -> paid/active -> completed, ou cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Active,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Active => "active",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_activate(&self) -> bool {
        matches!(self, OrderStatus::PendingPayment | OrderStatus::Paid)
    }

    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Active)
    }

    pub fn can_cancel(&self) -> bool {
        !matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Só pedido já pago volta para o saldo; comprovante nunca confirmado não gera estorno.
    pub fn refund_on_cancel(&self, amount_cents: i64) -> i64 {
        match self {
            OrderStatus::Paid | OrderStatus::Active => amount_cents,
            _ => 0,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub service_id: Uuid,
    pub chip_id: Option<Uuid>,
    pub phone_number: Option<String>,
    /// Preço do serviço no momento da compra. Nunca muda depois.
    #[schema(example = 1500)]
    pub amount_cents: i64,
    pub status: OrderStatus,
    pub admin_notes: Option<String>,
    pub pix_proof_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pedido com o nome e o tipo do serviço, como aparece nas listas.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrderWithService {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub service_name: String,
    pub service_type: ServiceType,
}

// Linha travada para mudança de status, com o dono do serviço.
#[derive(Debug, Clone, FromRow)]
pub struct LockedOrder {
    pub customer_id: Uuid,
    pub amount_cents: i64,
    pub status: OrderStatus,
    pub service_owner_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderPayload {
    pub service_id: Uuid,
    /// Caminho do comprovante no bucket `pix-proofs`. Sem ele, o pedido é pago com o saldo.
    #[validate(length(min = 1, max = 500, message = "Caminho de comprovante inválido."))]
    pub pix_proof_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActivateOrderPayload {
    pub chip_id: Option<Uuid>,
    #[validate(length(max = 30, message = "Número de telefone muito longo."))]
    pub phone_number: Option<String>,
    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub admin_notes: Option<String>,
}

impl ActivateOrderPayload {
    pub fn manual_phone(&self) -> Option<&str> {
        self.phone_number.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    pub fn notes(&self) -> Option<&str> {
        self.admin_notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelledOrder {
    pub order: Order,
    pub refunded_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_the_lifecycle() {
        use OrderStatus::*;
        assert!(PendingPayment.can_activate() && Paid.can_activate());
        assert!(!Active.can_activate() && !Cancelled.can_activate());
        assert!(Paid.can_complete() && Active.can_complete());
        assert!(!PendingPayment.can_complete());
        assert!(!Completed.can_cancel() && !Cancelled.can_cancel());
        assert!(PendingPayment.can_cancel());
    }

    #[test]
    fn only_settled_orders_are_refunded() {
        assert_eq!(OrderStatus::Paid.refund_on_cancel(1_500), 1_500);
        assert_eq!(OrderStatus::Active.refund_on_cancel(1_500), 1_500);
        assert_eq!(OrderStatus::PendingPayment.refund_on_cancel(1_500), 0);
        assert_eq!(OrderStatus::Cancelled.refund_on_cancel(1_500), 0);
    }

    #[test]
    fn status_serializes_in_snake_case() {
        assert_eq!(
            serde_json::to_value(OrderStatus::PendingPayment).unwrap(),
            serde_json::json!("pending_payment")
        );
    }

    #[test]
    fn blank_phone_and_notes_count_as_missing() {
        let payload = ActivateOrderPayload {
            chip_id: None,
            phone_number: Some("  ".into()),
            admin_notes: Some(" ok ".into()),
        };
        assert_eq!(payload.manual_phone(), None);
        assert_eq!(payload.notes(), Some("ok"));
    }
}
