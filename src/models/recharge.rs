// src/models/recharge.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "recharge_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RechargeStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RechargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RechargeStatus::Pending => "pending",
            RechargeStatus::Approved => "approved",
            RechargeStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RechargeRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = 5000)]
    pub amount_cents: i64,
    /// Caminho do comprovante no bucket `pix-proofs`.
    pub pix_proof_url: Option<String>,
    pub status: RechargeStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRechargePayload {
    // Valor mínimo de recarga: R$ 5,00
    #[validate(range(min = 500, message = "Valor mínimo de recarga é R$ 5,00"))]
    pub amount_cents: i64,
    #[validate(length(min = 1, max = 500, message = "Anexe o comprovante PIX."))]
    pub pix_proof_url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewRechargePayload {
    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PixPayloadQuery {
    #[validate(range(min = 500, message = "Valor mínimo de recarga é R$ 5,00"))]
    pub amount_cents: i64,
}

/// PIX "copia e cola" para o valor escolhido, com o QR Code em SVG.
#[derive(Debug, Serialize, ToSchema)]
pub struct PixPayloadResponse {
    pub amount_cents: i64,
    pub payload: String,
    pub qr_code_svg: String,
}

/// Resultado de um crédito aplicado no saldo.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerReceipt {
    pub recharge_id: Uuid,
    pub user_id: Uuid,
    pub credited_cents: i64,
    pub balance_cents: i64,
}

// ---
// verify-pix
// ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPixPayload {
    pub recharge_id: Option<Uuid>,
}

/// Argumentos da função `verify_pix_receipt` devolvidos pelo modelo.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReceiptVerdict {
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub amount_found: Option<Decimal>,
    #[serde(default)]
    pub amount_matches: bool,
    #[serde(default)]
    pub reason: String,
}

impl ReceiptVerdict {
    pub fn approves(&self) -> bool {
        self.is_valid && self.amount_matches
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum VerifyPixResponse {
    Approved {
        approved: bool,
        reason: String,
        #[schema(value_type = Option<f64>)]
        amount_found: Option<Decimal>,
    },
    NeedsReview {
        approved: bool,
        reason: String,
        #[schema(value_type = Option<f64>)]
        amount_found: Option<Decimal>,
        is_valid: bool,
        amount_matches: bool,
    },
    Unreadable {
        error: String,
        approved: bool,
    },
}

/// Formata centavos como `50.00` (sem símbolo de moeda).
pub fn format_cents(amount_cents: i64) -> String {
    Decimal::new(amount_cents, 2).to_string()
}

/// Nota gravada quando a IA não aprova o comprovante.
pub fn review_note(verdict: &ReceiptVerdict) -> String {
    let found = verdict
        .amount_found
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "?".to_string());
    format!("IA: {} (valor encontrado: R$ {})", verdict.reason, found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn cents_are_formatted_with_two_decimals() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(5), "0.05");
    }

    #[test]
    fn review_note_reports_amount_or_placeholder() {
        let mut verdict = ReceiptVerdict {
            is_valid: true,
            amount_found: Some(Decimal::from_str("49.9").unwrap()),
            amount_matches: false,
            reason: "valor divergente".into(),
        };
        assert_eq!(
            review_note(&verdict),
            "IA: valor divergente (valor encontrado: R$ 49.90)"
        );

        verdict.amount_found = None;
        assert!(review_note(&verdict).ends_with("R$ ?)"));
    }

    #[test]
    fn only_valid_and_matching_receipts_approve() {
        let verdict = |is_valid, amount_matches| ReceiptVerdict {
            is_valid,
            amount_found: None,
            amount_matches,
            reason: String::new(),
        };
        assert!(verdict(true, true).approves());
        assert!(!verdict(true, false).approves());
        assert!(!verdict(false, true).approves());
    }

    #[test]
    fn verdict_parses_float_amounts() {
        let verdict: ReceiptVerdict = serde_json::from_str(
            r#"{"is_valid":true,"amount_found":50.0,"amount_matches":true,"reason":"ok"}"#,
        )
        .unwrap();
        assert_eq!(verdict.amount_found, Some(Decimal::from(50)));
        assert!(verdict.approves());
    }
}
