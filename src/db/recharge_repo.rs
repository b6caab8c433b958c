// src/db/recharge_repo.rs

use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::recharge::{RechargeRequest, RechargeStatus},
};

const RECHARGE_COLUMNS: &str =
    "id, user_id, amount_cents, pix_proof_url, status, admin_notes, created_at, updated_at";

// O que a aprovação precisa para creditar o saldo
#[derive(Debug, Clone, FromRow)]
pub struct ApprovedRecharge {
    pub user_id: Uuid,
    pub amount_cents: i64,
}

#[derive(Clone)]
pub struct RechargeRepository {
    pool: PgPool,
}

impl RechargeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        pix_proof_url: &str,
    ) -> Result<RechargeRequest, AppError> {
        let recharge = sqlx::query_as::<_, RechargeRequest>(&format!(
            r#"
            INSERT INTO recharge_requests (user_id, amount_cents, pix_proof_url)
            VALUES ($1, $2, $3)
            RETURNING {RECHARGE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(amount_cents)
        .bind(pix_proof_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(recharge)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RechargeRequest>, AppError> {
        let recharge = sqlx::query_as::<_, RechargeRequest>(&format!(
            "SELECT {RECHARGE_COLUMNS} FROM recharge_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(recharge)
    }

    /// `user_id = None` lista todas (painel do admin).
    pub async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<RechargeRequest>, AppError> {
        let recharges = sqlx::query_as::<_, RechargeRequest>(&format!(
            r#"
            SELECT {RECHARGE_COLUMNS} FROM recharge_requests
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(recharges)
    }

    /// O comprovante vale para uma única recarga em toda a tabela.
    pub async fn proof_used_by_other_approved(
        &self,
        pix_proof_url: &str,
        exclude_id: Uuid,
    ) -> Result<bool, AppError> {
        let used = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM recharge_requests
                WHERE pix_proof_url = $1 AND status = 'approved' AND id <> $2
            )
            "#,
        )
        .bind(pix_proof_url)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(used)
    }

    /// Transição condicional `pending -> approved`. `None` se já não estava pendente.
    /// O índice único de comprovantes aprovados vira `DuplicateProof`.
    pub async fn approve_if_pending<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        admin_notes: Option<&str>,
    ) -> Result<Option<ApprovedRecharge>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let approved = sqlx::query_as::<_, ApprovedRecharge>(
            r#"
            UPDATE recharge_requests
            SET status = 'approved',
                admin_notes = COALESCE($2, admin_notes),
                updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING user_id, amount_cents
            "#,
        )
        .bind(id)
        .bind(admin_notes)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateProof;
                }
            }
            e.into()
        })?;
        Ok(approved)
    }

    pub async fn reject_if_pending<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        admin_notes: Option<&str>,
    ) -> Result<Option<RechargeRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rejected = sqlx::query_as::<_, RechargeRequest>(&format!(
            r#"
            UPDATE recharge_requests
            SET status = 'rejected',
                admin_notes = COALESCE($2, admin_notes),
                updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING {RECHARGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(admin_notes)
        .fetch_optional(executor)
        .await?;
        Ok(rejected)
    }

    // Só anota; o status continua pendente para revisão manual.
    pub async fn set_notes(&self, id: Uuid, admin_notes: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE recharge_requests SET admin_notes = $2, updated_at = now() WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(admin_notes)
        .bind(RechargeStatus::Pending)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
