// src/services/pix_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    clients::{storage::PIX_PROOFS_BUCKET, ProofStorage, ReceiptVerifier},
    common::error::AppError,
    db::RechargeRepository,
    models::recharge::{
        format_cents, review_note, ReceiptVerdict, RechargeStatus, VerifyPixResponse,
    },
    services::ledger_service::LedgerService,
};

const UNREADABLE_ERROR: &str = "AI could not analyze the receipt";

/// O que fazer com a recarga depois da resposta da IA.
#[derive(Debug, PartialEq)]
pub enum VerdictAction {
    Unreadable,
    Approve { note: String },
    KeepPending { note: String },
}

pub fn decide(verdict: Option<&ReceiptVerdict>) -> VerdictAction {
    match verdict {
        None => VerdictAction::Unreadable,
        Some(v) if v.approves() => VerdictAction::Approve {
            note: format!("Auto-aprovado por IA: {}", v.reason),
        },
        Some(v) => VerdictAction::KeepPending { note: review_note(v) },
    }
}

#[derive(Clone)]
pub struct PixVerificationService {
    recharge_repo: RechargeRepository,
    ledger: LedgerService,
    storage: Option<Arc<dyn ProofStorage>>,
    verifier: Option<Arc<dyn ReceiptVerifier>>,
}

impl PixVerificationService {
    pub fn new(
        recharge_repo: RechargeRepository,
        ledger: LedgerService,
        storage: Option<Arc<dyn ProofStorage>>,
        verifier: Option<Arc<dyn ReceiptVerifier>>,
    ) -> Self {
        Self { recharge_repo, ledger, storage, verifier }
    }

    /// Confere o comprovante de uma recarga do próprio usuário e, se a IA
    /// aprovar, credita pelo ledger. Falhas do gateway não alteram a recarga.
    pub async fn verify(
        &self,
        caller_id: Uuid,
        recharge_id: Option<Uuid>,
    ) -> Result<VerifyPixResponse, AppError> {
        let verifier = self.verifier.as_ref().ok_or(AppError::AiNotConfigured)?;
        let recharge_id =
            recharge_id.ok_or_else(|| AppError::BadRequest("recharge_id required".into()))?;

        let recharge = self
            .recharge_repo
            .find_by_id(recharge_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recharge not found".into()))?;

        if recharge.user_id != caller_id {
            return Err(AppError::Forbidden("Not your recharge".into()));
        }
        if recharge.status != RechargeStatus::Pending {
            return Err(AppError::RechargeAlreadyProcessed { status: recharge.status });
        }
        let proof_path = recharge
            .pix_proof_url
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::BadRequest("No proof uploaded".into()))?;

        if self
            .recharge_repo
            .proof_used_by_other_approved(proof_path, recharge.id)
            .await?
        {
            self.ledger.reject_duplicate(recharge.id).await?;
            return Err(AppError::DuplicateProof);
        }

        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| AppError::StorageError("storage não configurado".into()))?;
        let proof = storage.fetch_proof(PIX_PROOFS_BUCKET, proof_path).await?;

        let expected_amount = format_cents(recharge.amount_cents);
        let verdict = verifier.verify_receipt(&proof, &expected_amount).await?;

        match decide(verdict.as_ref()) {
            VerdictAction::Unreadable => Ok(VerifyPixResponse::Unreadable {
                error: UNREADABLE_ERROR.to_string(),
                approved: false,
            }),
            VerdictAction::Approve { note } => {
                let verdict = verdict.unwrap_or_default();
                self.ledger.approve_recharge(recharge.id, Some(&note)).await?;
                tracing::info!("🤖 Recarga {} auto-aprovada pela IA", recharge.id);
                Ok(VerifyPixResponse::Approved {
                    approved: true,
                    reason: verdict.reason,
                    amount_found: verdict.amount_found,
                })
            }
            VerdictAction::KeepPending { note } => {
                let verdict = verdict.unwrap_or_default();
                self.recharge_repo.set_notes(recharge.id, &note).await?;
                Ok(VerifyPixResponse::NeedsReview {
                    approved: false,
                    reason: verdict.reason,
                    amount_found: verdict.amount_found,
                    is_valid: verdict.is_valid,
                    amount_matches: verdict.amount_matches,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clients::storage::ProofImage, db::ProfileRepository};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    struct NeverCalled;

    #[async_trait]
    impl ReceiptVerifier for NeverCalled {
        async fn verify_receipt(
            &self,
            _proof: &ProofImage,
            _expected_amount: &str,
        ) -> Result<Option<ReceiptVerdict>, AppError> {
            panic!("o verificador não deveria ser chamado");
        }
    }

    fn service(verifier: Option<Arc<dyn ReceiptVerifier>>) -> PixVerificationService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/chipeira_test")
            .unwrap();
        let recharge_repo = RechargeRepository::new(pool.clone());
        let ledger = LedgerService::new(
            recharge_repo.clone(),
            ProfileRepository::new(pool.clone()),
            pool,
        );
        PixVerificationService::new(recharge_repo, ledger, None, verifier)
    }

    fn verdict(is_valid: bool, amount_matches: bool) -> ReceiptVerdict {
        ReceiptVerdict {
            is_valid,
            amount_found: Some(Decimal::new(5000, 2)),
            amount_matches,
            reason: "conferido".into(),
        }
    }

    #[tokio::test]
    async fn missing_ai_key_is_reported_first() {
        let err = service(None).verify(Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, AppError::AiNotConfigured));
    }

    #[tokio::test]
    async fn missing_recharge_id_is_bad_request() {
        let err = service(Some(Arc::new(NeverCalled)))
            .verify(Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn valid_matching_receipt_is_approved_with_reason() {
        assert_eq!(
            decide(Some(&verdict(true, true))),
            VerdictAction::Approve { note: "Auto-aprovado por IA: conferido".into() }
        );
    }

    #[test]
    fn mismatch_keeps_request_pending_with_review_note() {
        assert_eq!(
            decide(Some(&verdict(true, false))),
            VerdictAction::KeepPending {
                note: "IA: conferido (valor encontrado: R$ 50.00)".into()
            }
        );
        assert!(matches!(
            decide(Some(&verdict(false, true))),
            VerdictAction::KeepPending { .. }
        ));
    }

    #[test]
    fn no_tool_call_is_unreadable() {
        assert_eq!(decide(None), VerdictAction::Unreadable);
    }
}
