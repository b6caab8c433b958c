// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Tipos de serviço (enum `service_type` no Postgres)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Recebimento de um SMS de verificação.
    Verification,
    /// Número alugado por `duration_minutes`.
    Rental,
}

/// Item vendável da loja, mantido por um colaborador ou admin.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Verificação WhatsApp")]
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[schema(example = 1500)]
    pub price_cents: i64,
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Criação e edição usam o mesmo formulário.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ServicePayload {
    #[validate(length(min = 1, max = 100, message = "O nome do serviço é obrigatório (máx. 100)."))]
    pub name: String,
    #[validate(length(max = 500, message = "A descrição deve ter no máximo 500 caracteres."))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[validate(range(min = 0, message = "O preço não pode ser negativo."))]
    pub price_cents: i64,
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 minuto."))]
    pub duration_minutes: Option<i32>,
}

impl ServicePayload {
    pub fn trimmed_description(&self) -> Option<&str> {
        self.description.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_reads_type_field() {
        let payload: ServicePayload = serde_json::from_value(json!({
            "name": "Aluguel 24h",
            "type": "rental",
            "price_cents": 2500,
            "duration_minutes": 1440
        }))
        .unwrap();
        assert_eq!(payload.service_type, ServiceType::Rental);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn negative_price_and_zero_duration_are_rejected() {
        let payload = ServicePayload {
            name: "SMS".into(),
            description: Some("   ".into()),
            service_type: ServiceType::Verification,
            price_cents: -1,
            duration_minutes: Some(0),
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price_cents"));
        assert!(fields.contains_key("duration_minutes"));
        assert_eq!(payload.trimmed_description(), None);
    }

    #[test]
    fn unknown_type_does_not_parse() {
        let parsed = serde_json::from_value::<ServicePayload>(json!({
            "name": "x", "type": "subscription", "price_cents": 100
        }));
        assert!(parsed.is_err());
    }
}
