// src/models/earnings.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Fatia do colaborador sobre a receita bruta dos seus chips.
pub const COMMISSION_PERCENT: i64 = 40;

pub fn commission_cents(gross_revenue_cents: i64) -> i64 {
    gross_revenue_cents * COMMISSION_PERCENT / 100
}

#[derive(Debug, Clone, FromRow)]
pub struct RevenueRow {
    pub order_count: i64,
    pub gross_revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EarningsSummary {
    #[schema(example = 12)]
    pub order_count: i64,
    #[schema(example = 60000)]
    pub gross_revenue_cents: i64,
    #[schema(example = 24000)]
    pub commission_cents: i64,
}

impl From<RevenueRow> for EarningsSummary {
    fn from(row: RevenueRow) -> Self {
        Self {
            order_count: row.order_count,
            gross_revenue_cents: row.gross_revenue_cents,
            commission_cents: commission_cents(row.gross_revenue_cents),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_is_forty_percent_rounded_down() {
        assert_eq!(commission_cents(10_000), 4_000);
        assert_eq!(commission_cents(999), 399);
        assert_eq!(commission_cents(0), 0);
    }
}
