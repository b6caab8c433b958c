// src/db/order_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{LockedOrder, Order, OrderStatus, OrderWithService},
};

const ORDER_COLUMNS: &str = "o.id, o.customer_id, o.service_id, o.chip_id, o.phone_number, \
     o.amount_cents, o.status, o.admin_notes, o.pix_proof_url, o.expires_at, o.created_at, o.updated_at";

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria o pedido copiando o preço atual do serviço. `None` se o serviço não existe ou está inativo.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        service_id: Uuid,
        pix_proof_url: Option<&str>,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders AS o (customer_id, service_id, amount_cents, pix_proof_url, status)
            SELECT $1, s.id, s.price_cents, $3, $4
            FROM services s
            WHERE s.id = $2 AND s.is_active
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(service_id)
        .bind(pix_proof_url)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<OrderWithService>, AppError> {
        let orders = sqlx::query_as::<_, OrderWithService>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}, s.name AS service_name, s.type AS service_type
            FROM orders o
            JOIN services s ON s.id = o.service_id
            WHERE o.customer_id = $1
            ORDER BY o.created_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Pedidos dos serviços de `owner_id`; `None` lista todos (admin).
    pub async fn list_for_service_owner(
        &self,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<OrderWithService>, AppError> {
        let orders = sqlx::query_as::<_, OrderWithService>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}, s.name AS service_name, s.type AS service_type
            FROM orders o
            JOIN services s ON s.id = o.service_id
            WHERE $1::uuid IS NULL OR s.user_id = $1
            ORDER BY o.created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Trava a linha do pedido até o fim da transação.
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<LockedOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_as::<_, LockedOrder>(
            r#"
            SELECT o.customer_id, o.amount_cents, o.status, s.user_id AS service_owner_id
            FROM orders o
            JOIN services s ON s.id = o.service_id
            WHERE o.id = $1
            FOR UPDATE OF o
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(locked)
    }

    pub async fn chip_phone<'e, E>(&self, executor: E, chip_id: Uuid) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let phone = sqlx::query_scalar::<_, String>("SELECT phone_number FROM chips WHERE id = $1")
            .bind(chip_id)
            .fetch_optional(executor)
            .await?;
        Ok(phone)
    }

    /// `pending_payment|paid -> active`. Aluguel ganha `expires_at` a partir de agora.
    pub async fn activate<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        chip_id: Option<Uuid>,
        phone_number: &str,
        admin_notes: Option<&str>,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders o
            SET status = 'active',
                chip_id = $2,
                phone_number = $3,
                admin_notes = COALESCE($4, o.admin_notes),
                expires_at = CASE
                    WHEN s.duration_minutes IS NULL THEN NULL
                    ELSE now() + make_interval(mins => s.duration_minutes)
                END,
                updated_at = now()
            FROM services s
            WHERE o.id = $1
              AND s.id = o.service_id
              AND o.status IN ('pending_payment', 'paid')
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(chip_id)
        .bind(phone_number)
        .bind(admin_notes)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn complete<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders o
            SET status = 'completed', updated_at = now()
            WHERE o.id = $1 AND o.status IN ('paid', 'active')
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    /// Transição condicional para `cancelled`; `None` se o pedido já estava encerrado.
    pub async fn cancel<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders o
            SET status = 'cancelled', updated_at = now()
            WHERE o.id = $1 AND o.status IN ('pending_payment', 'paid', 'active')
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }
}
