// src/services/recharge_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RechargeRepository,
    models::recharge::{CreateRechargePayload, LedgerReceipt, PixPayloadResponse, RechargeRequest},
    services::{
        ledger_service::LedgerService,
        pix_payload::{build_br_code, render_qr_svg, PixMerchant},
    },
};

#[derive(Clone)]
pub struct RechargeService {
    recharge_repo: RechargeRepository,
    ledger: LedgerService,
    merchant: Option<PixMerchant>,
}

impl RechargeService {
    pub fn new(
        recharge_repo: RechargeRepository,
        ledger: LedgerService,
        merchant: Option<PixMerchant>,
    ) -> Self {
        Self { recharge_repo, ledger, merchant }
    }

    /// Payload PIX e QR Code para o cliente pagar o valor da recarga.
    pub fn pix_payload(&self, amount_cents: i64) -> Result<PixPayloadResponse, AppError> {
        let merchant = self.merchant.as_ref().ok_or(AppError::PixNotConfigured)?;
        let payload = build_br_code(merchant, Some(amount_cents));
        let qr_code_svg = render_qr_svg(&payload)?;
        Ok(PixPayloadResponse { amount_cents, payload, qr_code_svg })
    }

    pub async fn request_recharge(
        &self,
        user_id: Uuid,
        payload: &CreateRechargePayload,
    ) -> Result<RechargeRequest, AppError> {
        let recharge = self
            .recharge_repo
            .create(user_id, payload.amount_cents, payload.pix_proof_url.trim())
            .await?;

        tracing::info!(
            "🧾 Recarga {} solicitada por {} ({} centavos)",
            recharge.id,
            user_id,
            recharge.amount_cents
        );
        Ok(recharge)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<RechargeRequest>, AppError> {
        self.recharge_repo.list(Some(user_id)).await
    }

    pub async fn list_all(&self) -> Result<Vec<RechargeRequest>, AppError> {
        self.recharge_repo.list(None).await
    }

    pub async fn approve(
        &self,
        recharge_id: Uuid,
        admin_notes: Option<&str>,
    ) -> Result<LedgerReceipt, AppError> {
        self.ledger.approve_recharge(recharge_id, admin_notes).await
    }

    pub async fn reject(
        &self,
        recharge_id: Uuid,
        admin_notes: Option<&str>,
    ) -> Result<RechargeRequest, AppError> {
        self.ledger.reject_recharge(recharge_id, admin_notes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProfileRepository;
    use sqlx::postgres::PgPoolOptions;

    fn service(merchant: Option<PixMerchant>) -> RechargeService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/chipeira_test")
            .unwrap();
        let recharge_repo = RechargeRepository::new(pool.clone());
        let ledger = LedgerService::new(
            recharge_repo.clone(),
            ProfileRepository::new(pool.clone()),
            pool,
        );
        RechargeService::new(recharge_repo, ledger, merchant)
    }

    #[tokio::test]
    async fn pix_payload_without_key_is_not_configured() {
        let err = service(None).pix_payload(5_000).unwrap_err();
        assert!(matches!(err, AppError::PixNotConfigured));
    }

    #[tokio::test]
    async fn pix_payload_carries_amount_and_qr_code() {
        let merchant = PixMerchant {
            key: "pix@chipeira.com.br".into(),
            name: "CHIPEIRA".into(),
            city: "SAO PAULO".into(),
        };
        let response = service(Some(merchant)).pix_payload(5_000).unwrap();
        assert_eq!(response.amount_cents, 5_000);
        assert!(response.payload.contains("540550.00"));
        assert!(response.qr_code_svg.contains("<svg"));
    }
}
