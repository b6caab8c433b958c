// src/models/device.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Sem heartbeat por mais que isso, o modem é tratado como offline.
pub const MODEM_STALE_AFTER_SECS: i64 = 120;
// Janela em que a chipeira (location) aparece como online no painel.
pub const LOCATION_ONLINE_WINDOW_SECS: i64 = 300;

// ---
// Linhas do banco
// ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Chipeira Centro")]
    pub name: String,
    pub description: Option<String>,
    pub api_key: String,
    pub is_active: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Modem {
    pub id: Uuid,
    pub location_id: Uuid,
    #[schema(example = "/dev/ttyUSB0")]
    pub port_name: String,
    pub imei: Option<String>,
    pub operator: Option<String>,
    #[schema(example = -71)]
    pub signal_strength: Option<i32>,
    #[schema(example = "online")]
    pub status: String,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Chip {
    pub id: Uuid,
    pub modem_id: Uuid,
    #[schema(example = "+5511999990000")]
    pub phone_number: String,
    pub iccid: Option<String>,
    pub operator: Option<String>,
    #[schema(example = "active")]
    pub status: String,
    pub detected_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Visão do painel (Dashboard)
// ---

#[derive(Debug, Serialize, ToSchema)]
pub struct ModemOverview {
    #[serde(flatten)]
    pub modem: Modem,
    /// `offline` quando o último heartbeat é antigo, mesmo que o status salvo diga `online`.
    pub effective_status: String,
    pub chips: Vec<Chip>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationOverview {
    #[serde(flatten)]
    pub location: Location,
    pub is_online: bool,
    pub modems: Vec<ModemOverview>,
}

pub fn effective_modem_status(
    status: &str,
    last_seen_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let fresh = last_seen_at
        .map(|seen| now - seen < Duration::seconds(MODEM_STALE_AFTER_SECS))
        .unwrap_or(false);

    if status == "online" && !fresh {
        "offline".to_string()
    } else {
        status.to_string()
    }
}

pub fn is_location_online(last_seen_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_seen_at
        .map(|seen| now - seen < Duration::seconds(LOCATION_ONLINE_WINDOW_SECS))
        .unwrap_or(false)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocationPayload {
    #[validate(length(min = 1, max = 100, message = "O nome da chipeira é obrigatório (máx. 100)."))]
    pub name: String,
    #[validate(length(max = 500, message = "A descrição deve ter no máximo 500 caracteres."))]
    pub description: Option<String>,
}

// ---
// Payload do gateway (enviado pelo cliente da chipeira)
// ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncPayload {
    pub modems: Vec<ModemReport>,
}

// Campos chegam como JSON cru: tipo errado vira erro de validação do campo,
// não "Invalid request body".
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModemReport {
    #[schema(value_type = String)]
    pub port_name: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub imei: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub operator: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub signal_strength: Option<Value>,
    #[schema(value_type = String)]
    pub status: Option<Value>,
    #[serde(default)]
    pub chips: Vec<ChipReport>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChipReport {
    #[schema(value_type = String)]
    pub phone_number: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub iccid: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub operator: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub status: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyncResponse {
    pub success: bool,
    pub location_id: Uuid,
}

// Formas já validadas e sanitizadas, prontas para o upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct ModemSync {
    pub port_name: String,
    pub imei: Option<String>,
    pub operator: Option<String>,
    pub signal_strength: Option<i32>,
    pub status: String,
    pub chips: Vec<ChipSync>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChipSync {
    pub phone_number: String,
    pub iccid: Option<String>,
    pub operator: Option<String>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_modem_goes_stale_after_two_minutes() {
        let now = Utc::now();
        let recent = Some(now - Duration::seconds(30));
        let old = Some(now - Duration::seconds(121));

        assert_eq!(effective_modem_status("online", recent, now), "online");
        assert_eq!(effective_modem_status("online", old, now), "offline");
        assert_eq!(effective_modem_status("online", None, now), "offline");
    }

    #[test]
    fn non_online_status_is_kept() {
        let now = Utc::now();
        assert_eq!(effective_modem_status("error", None, now), "error");
    }

    #[test]
    fn location_online_window_is_five_minutes() {
        let now = Utc::now();
        assert!(is_location_online(Some(now - Duration::seconds(299)), now));
        assert!(!is_location_online(Some(now - Duration::seconds(301)), now));
        assert!(!is_location_online(None, now));
    }
}
