// src/clients/ai_gateway.rs

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::{
    clients::storage::ProofImage,
    common::error::AppError,
    models::recharge::ReceiptVerdict,
};

const TOOL_NAME: &str = "verify_pix_receipt";

const SYSTEM_PROMPT: &str = "Você é um verificador de comprovantes PIX. Analise a imagem do comprovante e extraia o valor da transação.
Responda APENAS usando a função fornecida. Seja preciso com o valor encontrado.
Se não for um comprovante PIX válido ou não conseguir identificar o valor, retorne is_valid como false.";

/// Analisa uma imagem de comprovante contra o valor esperado.
/// `Ok(None)` quando o modelo responde sem chamar a função.
#[async_trait]
pub trait ReceiptVerifier: Send + Sync {
    async fn verify_receipt(
        &self,
        proof: &ProofImage,
        expected_amount: &str,
    ) -> Result<Option<ReceiptVerdict>, AppError>;
}

#[derive(Clone)]
pub struct AiGatewayClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl AiGatewayClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            client: Client::new(),
        }
    }
}

pub fn build_request(model: &str, data_url: &str, expected_amount: &str) -> Value {
    let user_prompt = format!(
        "Analise este comprovante PIX. O valor esperado é R$ {expected_amount}. Verifique se:
1. É um comprovante PIX válido
2. O valor do comprovante corresponde ao valor esperado (R$ {expected_amount})
Extraia o valor encontrado no comprovante."
    );

    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": user_prompt },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }
        ],
        "tools": [{
            "type": "function",
            "function": {
                "name": TOOL_NAME,
                "description": "Report PIX receipt verification results",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "is_valid": {
                            "type": "boolean",
                            "description": "Whether this is a valid PIX receipt"
                        },
                        "amount_found": {
                            "type": "number",
                            "description": "The monetary amount found on the receipt in BRL (e.g. 50.00)"
                        },
                        "amount_matches": {
                            "type": "boolean",
                            "description": "Whether the amount found matches the expected amount"
                        },
                        "reason": {
                            "type": "string",
                            "description": "Brief explanation of the verification result"
                        }
                    },
                    "required": ["is_valid", "amount_found", "amount_matches", "reason"],
                    "additionalProperties": false
                }
            }
        }],
        "tool_choice": { "type": "function", "function": { "name": TOOL_NAME } }
    })
}

/// Lê os argumentos da primeira chamada de função na resposta.
pub fn extract_verdict(body: &Value) -> Result<Option<ReceiptVerdict>, AppError> {
    let arguments = body
        .pointer("/choices/0/message/tool_calls/0/function/arguments")
        .and_then(Value::as_str)
        .filter(|args| !args.trim().is_empty());

    match arguments {
        None => Ok(None),
        Some(args) => serde_json::from_str::<ReceiptVerdict>(args)
            .map(Some)
            .map_err(|e| AppError::AiGatewayError(format!("argumentos inválidos: {e}"))),
    }
}

#[async_trait]
impl ReceiptVerifier for AiGatewayClient {
    async fn verify_receipt(
        &self,
        proof: &ProofImage,
        expected_amount: &str,
    ) -> Result<Option<ReceiptVerdict>, AppError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = build_request(&self.model, &proof.to_data_url(), expected_amount);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AiGatewayError(e.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(AppError::AiRateLimited),
            StatusCode::PAYMENT_REQUIRED => return Err(AppError::AiQuotaExhausted),
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                tracing::error!("AI error: {} {}", status, text);
                return Err(AppError::AiGatewayError(status.to_string()));
            }
            _ => {}
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::AiGatewayError(e.to_string()))?;

        extract_verdict(&payload)
    }
}
