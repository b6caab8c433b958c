// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{orders::OrderStatus, recharge::RechargeStatus};

// Todas as falhas da API passam por aqui e saem como `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("API key ausente")]
    ApiKeyRequired,

    #[error("API key inválida ou inativa")]
    InvalidApiKey,

    #[error("{0}")]
    Forbidden(String),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("{0}")]
    NotFound(String),

    #[error("Payload muito grande")]
    PayloadTooLarge,

    #[error("Saldo insuficiente")]
    InsufficientBalance,

    // --- Recargas / PIX ---
    #[error("Recarga já processada ({status})")]
    RechargeAlreadyProcessed { status: RechargeStatus },

    #[error("Comprovante já utilizado")]
    DuplicateProof,

    // --- Pedidos ---
    #[error("Pedido não pode sair do status {status}")]
    InvalidOrderTransition { status: OrderStatus },

    #[error("IA não configurada")]
    AiNotConfigured,

    #[error("Gateway de IA limitou a taxa de requisições")]
    AiRateLimited,

    #[error("Cota do gateway de IA esgotada")]
    AiQuotaExhausted,

    #[error("Erro no gateway de IA: {0}")]
    AiGatewayError(String),

    #[error("Erro no storage de comprovantes: {0}")]
    StorageError(String),

    #[error("Chave PIX não configurada")]
    PixNotConfigured,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::InsufficientBalance
            | AppError::RechargeAlreadyProcessed { .. }
            | AppError::InvalidOrderTransition { .. }
            | AppError::DuplicateProof => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::ApiKeyRequired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::InvalidApiKey | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::AiRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::AiQuotaExhausted => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            AppError::BadRequest(msg) | AppError::Forbidden(msg) | AppError::NotFound(msg) => {
                json!({ "error": msg })
            }
            AppError::EmailAlreadyExists => json!({ "error": "Este e-mail já está em uso." }),
            AppError::InvalidCredentials => json!({ "error": "E-mail ou senha inválidos." }),
            AppError::InvalidToken => json!({ "error": "Unauthorized" }),
            AppError::ApiKeyRequired => json!({ "error": "API key required" }),
            AppError::InvalidApiKey => json!({ "error": "Invalid or inactive API key" }),
            AppError::UserNotFound => json!({ "error": "Usuário não encontrado." }),
            AppError::PayloadTooLarge => json!({ "error": "Payload too large" }),
            AppError::InsufficientBalance => {
                json!({ "error": "Saldo insuficiente para esta operação." })
            }
            AppError::RechargeAlreadyProcessed { status } => json!({
                "error": "Recharge already processed",
                "status": status,
            }),
            AppError::InvalidOrderTransition { status } => json!({
                "error": "Este pedido não pode mais mudar para esse status.",
                "status": status,
            }),
            AppError::DuplicateProof => json!({
                "error": "Este comprovante já foi utilizado em outra recarga.",
                "approved": false,
            }),
            AppError::AiNotConfigured => json!({ "error": "AI not configured" }),
            AppError::AiRateLimited => json!({
                "error": "Serviço temporariamente indisponível. Tente novamente em alguns segundos."
            }),
            AppError::AiQuotaExhausted => json!({ "error": "Serviço de verificação indisponível." }),
            AppError::AiGatewayError(_) => json!({ "error": "Erro na verificação automática" }),
            AppError::StorageError(_) => json!({ "error": "Could not access proof file" }),
            AppError::PixNotConfigured => json!({ "error": "PIX not configured" }),
            // Banco, bcrypt, JWT e anyhow: detalhe só no log.
            _ => json!({ "error": "Ocorreu um erro inesperado." }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn duplicate_proof_reports_not_approved() {
        let (status, body) = body_of(AppError::DuplicateProof).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["approved"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("comprovante"));
    }

    #[tokio::test]
    async fn already_processed_carries_current_status() {
        let (status, body) = body_of(AppError::RechargeAlreadyProcessed {
            status: RechargeStatus::Approved,
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], json!("approved"));
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) =
            body_of(AppError::InternalServerError(anyhow::anyhow!("pool exausto"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("pool"));
    }

    #[tokio::test]
    async fn finished_order_reports_its_status() {
        let (status, body) = body_of(AppError::InvalidOrderTransition {
            status: OrderStatus::Cancelled,
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], json!("cancelled"));
    }

    #[test]
    fn ai_gateway_failures_keep_distinct_statuses() {
        assert_eq!(AppError::AiRateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AppError::AiQuotaExhausted.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            AppError::AiGatewayError("503".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_failures_split_between_401_and_403() {
        assert_eq!(AppError::ApiKeyRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidApiKey.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
    }
}
