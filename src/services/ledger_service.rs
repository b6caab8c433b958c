// src/services/ledger_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProfileRepository, RechargeRepository},
    models::recharge::{LedgerReceipt, RechargeRequest},
};

/// Nota gravada na recarga que tentou reaproveitar um comprovante.
pub const DUPLICATE_PROOF_NOTE: &str = "Comprovante já utilizado em outra recarga.";

/// Único caminho que mexe em `balance_cents`.
/// Aprovação manual, aprovação por IA e ajuste do admin passam todos por aqui.
#[derive(Clone)]
pub struct LedgerService {
    recharge_repo: RechargeRepository,
    profile_repo: ProfileRepository,
    pool: PgPool,
}

impl LedgerService {
    pub fn new(
        recharge_repo: RechargeRepository,
        profile_repo: ProfileRepository,
        pool: PgPool,
    ) -> Self {
        Self { recharge_repo, profile_repo, pool }
    }

    /// `pending -> approved` e crédito do valor, na mesma transação.
    /// Uma segunda chamada para o mesmo id não credita de novo.
    pub async fn approve_recharge(
        &self,
        recharge_id: Uuid,
        note: Option<&str>,
    ) -> Result<LedgerReceipt, AppError> {
        let mut tx = self.pool.begin().await?;

        let approved = match self
            .recharge_repo
            .approve_if_pending(&mut *tx, recharge_id, note)
            .await
        {
            Ok(Some(approved)) => approved,
            Ok(None) => {
                tx.rollback().await?;
                return Err(self.not_pending_error(recharge_id).await);
            }
            // Outra recarga já foi aprovada com o mesmo comprovante.
            Err(AppError::DuplicateProof) => {
                tx.rollback().await?;
                self.reject_duplicate(recharge_id).await?;
                return Err(AppError::DuplicateProof);
            }
            Err(e) => return Err(e),
        };

        let balance = self
            .profile_repo
            .apply_delta(&mut *tx, approved.user_id, approved.amount_cents)
            .await?
            .ok_or_else(|| {
                AppError::InternalServerError(anyhow::anyhow!(
                    "perfil ausente para o usuário {}",
                    approved.user_id
                ))
            })?;

        tx.commit().await?;

        tracing::info!(
            "💰 Recarga {} aprovada: +{} centavos para {}",
            recharge_id,
            approved.amount_cents,
            approved.user_id
        );

        Ok(LedgerReceipt {
            recharge_id,
            user_id: approved.user_id,
            credited_cents: approved.amount_cents,
            balance_cents: balance,
        })
    }

    pub async fn reject_recharge(
        &self,
        recharge_id: Uuid,
        note: Option<&str>,
    ) -> Result<RechargeRequest, AppError> {
        match self
            .recharge_repo
            .reject_if_pending(&self.pool, recharge_id, note)
            .await?
        {
            Some(rejected) => {
                tracing::info!("🚫 Recarga {} rejeitada", recharge_id);
                Ok(rejected)
            }
            None => Err(self.not_pending_error(recharge_id).await),
        }
    }

    /// Marca a recarga como rejeitada pelo comprovante repetido.
    /// Se ela já saiu de `pending`, não há o que fazer.
    pub async fn reject_duplicate(&self, recharge_id: Uuid) -> Result<(), AppError> {
        match self.reject_recharge(recharge_id, Some(DUPLICATE_PROOF_NOTE)).await {
            Ok(_) | Err(AppError::RechargeAlreadyProcessed { .. }) => {
                tracing::info!("🚫 Recarga {} com comprovante reutilizado", recharge_id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Ajuste avulso do admin. O saldo resultante nunca fica negativo.
    pub async fn adjust_balance(&self, user_id: Uuid, delta_cents: i64) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;
        let balance = self.adjust_balance_in(&mut *tx, user_id, delta_cents).await?;
        tx.commit().await?;
        Ok(balance)
    }

    /// Mesmo ajuste, dentro da transação de quem chama (compra e estorno de pedido).
    pub async fn adjust_balance_in(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        delta_cents: i64,
    ) -> Result<i64, AppError> {
        if !self.profile_repo.exists(&mut *conn, user_id).await? {
            return Err(AppError::UserNotFound);
        }

        let balance = self
            .profile_repo
            .apply_delta(&mut *conn, user_id, delta_cents)
            .await?
            .ok_or(AppError::InsufficientBalance)?;

        tracing::info!("💰 Saldo de {} ajustado em {} centavos", user_id, delta_cents);
        Ok(balance)
    }

    async fn not_pending_error(&self, recharge_id: Uuid) -> AppError {
        match self.recharge_repo.find_by_id(recharge_id).await {
            Ok(Some(current)) => AppError::RechargeAlreadyProcessed { status: current.status },
            Ok(None) => AppError::NotFound("Recharge not found".into()),
            Err(e) => e,
        }
    }
}
