// src/db/earnings_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::earnings::RevenueRow};

#[derive(Clone)]
pub struct EarningsRepository {
    pool: PgPool,
}

impl EarningsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Receita bruta dos pedidos atendidos por chips das chipeiras do colaborador.
    pub async fn revenue_for_collaborator(&self, user_id: Uuid) -> Result<RevenueRow, AppError> {
        let row = sqlx::query_as::<_, RevenueRow>(
            r#"
            SELECT
                COUNT(o.id)::bigint AS order_count,
                COALESCE(SUM(o.amount_cents), 0)::bigint AS gross_revenue_cents
            FROM orders o
            JOIN chips c ON c.id = o.chip_id
            JOIN modems m ON m.id = c.modem_id
            JOIN locations l ON l.id = m.location_id
            WHERE l.user_id = $1
              AND o.status IN ('active', 'paid', 'completed')
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
