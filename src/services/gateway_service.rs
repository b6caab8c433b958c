// src/services/gateway_service.rs

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DeviceRepository, LocationRepository},
    models::device::{ChipReport, ChipSync, Location, ModemReport, ModemSync, SyncPayload},
};

pub const MAX_API_KEY_LEN: usize = 128;
pub const MAX_BODY_BYTES: usize = 512_000;
pub const MAX_MODEMS: usize = 50;
pub const MAX_CHIPS_PER_MODEM: usize = 100;

const PORT_NAME_MAX: usize = 100;
const MODEM_STATUS_MAX: usize = 30;
const IMEI_MAX: usize = 20;
const OPERATOR_MAX: usize = 50;
const ICCID_MAX: usize = 30;
const CHIP_STATUS_MAX: usize = 20;
const PHONE_MIN: usize = 3;
const PHONE_MAX: usize = 30;
const SIGNAL_MIN: f64 = -120.0;
const SIGNAL_MAX: f64 = 0.0;

// ---
// Validação e sanitização (tudo antes de qualquer escrita)
// ---

// Só strings JSON contam como texto.
fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

fn is_valid_string(value: Option<&str>, max_len: usize) -> bool {
    value.is_some_and(|v| {
        let len = v.chars().count();
        len > 0 && len <= max_len
    })
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || "+-().@".contains(c)
}

/// trim, corta em `max_len` caracteres e remove o que não for `[\w\s+\-().@]`.
pub fn sanitize(value: &str, max_len: usize) -> String {
    value
        .trim()
        .chars()
        .take(max_len)
        .filter(|c| is_allowed_char(*c))
        .collect()
}

pub fn is_valid_phone_number(value: &str) -> bool {
    let len = value.chars().count();
    (PHONE_MIN..=PHONE_MAX).contains(&len)
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
}

// Ausente ou null passa; qualquer outra coisa precisa ser número em [-120, 0].
fn signal_strength(value: Option<&Value>) -> Result<Option<f64>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .filter(|n| n.is_finite() && (SIGNAL_MIN..=SIGNAL_MAX).contains(n))
            .map(Some)
            .ok_or_else(|| AppError::BadRequest("Invalid signal_strength".into())),
    }
}

// Campo opcional inválido vira null, não derruba a requisição.
fn optional_field(value: Option<&Value>, max_len: usize) -> Option<String> {
    text(value)
        .filter(|v| is_valid_string(Some(v), max_len))
        .map(|v| sanitize(v, max_len))
        .filter(|v| !v.is_empty())
}

fn validate_chip(chip: &ChipReport) -> Result<ChipSync, AppError> {
    let phone_number = text(chip.phone_number.as_ref())
        .filter(|p| is_valid_phone_number(p))
        .ok_or_else(|| AppError::BadRequest("Invalid phone_number".into()))?;

    Ok(ChipSync {
        phone_number: phone_number.trim().to_string(),
        iccid: optional_field(chip.iccid.as_ref(), ICCID_MAX),
        operator: optional_field(chip.operator.as_ref(), OPERATOR_MAX),
        status: optional_field(chip.status.as_ref(), CHIP_STATUS_MAX)
            .unwrap_or_else(|| "active".to_string()),
    })
}

fn validate_modem(modem: &ModemReport) -> Result<ModemSync, AppError> {
    let port_name = text(modem.port_name.as_ref());
    if !is_valid_string(port_name, PORT_NAME_MAX) {
        return Err(AppError::BadRequest("Invalid port_name".into()));
    }
    let status = text(modem.status.as_ref());
    if !is_valid_string(status, MODEM_STATUS_MAX) {
        return Err(AppError::BadRequest("Invalid modem status".into()));
    }
    let signal = signal_strength(modem.signal_strength.as_ref())?;

    let port_name = sanitize(port_name.unwrap_or_default(), PORT_NAME_MAX);
    let status = sanitize(status.unwrap_or_default(), MODEM_STATUS_MAX);
    if port_name.is_empty() || status.is_empty() {
        return Err(AppError::BadRequest("Invalid port_name".into()));
    }

    // Só os primeiros 100 chips de cada modem são considerados.
    let chips = modem
        .chips
        .iter()
        .take(MAX_CHIPS_PER_MODEM)
        .map(validate_chip)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ModemSync {
        port_name,
        imei: optional_field(modem.imei.as_ref(), IMEI_MAX),
        operator: optional_field(modem.operator.as_ref(), OPERATOR_MAX),
        signal_strength: signal.map(|v| v.round() as i32),
        status,
        chips,
    })
}

/// Tudo ou nada: um campo inválido rejeita a requisição inteira com 400.
pub fn validate_sync(payload: &SyncPayload) -> Result<Vec<ModemSync>, AppError> {
    if payload.modems.len() > MAX_MODEMS {
        return Err(AppError::BadRequest(format!(
            "Too many modems (max {MAX_MODEMS})"
        )));
    }
    payload.modems.iter().map(validate_modem).collect()
}

pub fn parse_sync_body(body: &[u8]) -> Result<SyncPayload, AppError> {
    serde_json::from_slice::<SyncPayload>(body)
        .map_err(|_| AppError::BadRequest("Invalid request body".into()))
}

#[derive(Clone)]
pub struct GatewayService {
    location_repo: LocationRepository,
    device_repo: DeviceRepository,
    pool: PgPool,
}

impl GatewayService {
    pub fn new(location_repo: LocationRepository, device_repo: DeviceRepository, pool: PgPool) -> Self {
        Self { location_repo, device_repo, pool }
    }

    pub async fn authenticate(&self, api_key: &str) -> Result<Location, AppError> {
        self.location_repo
            .find_active_by_api_key(api_key)
            .await?
            .ok_or(AppError::InvalidApiKey)
    }

    /// Heartbeat + upserts numa transação só.
    pub async fn sync_location(
        &self,
        location_id: Uuid,
        modems: &[ModemSync],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.location_repo.touch_heartbeat(&mut *tx, location_id).await?;

        let mut chip_count = 0usize;
        for modem in modems {
            let modem_id = self
                .device_repo
                .upsert_modem(&mut *tx, location_id, modem)
                .await?;

            for chip in &modem.chips {
                self.device_repo.upsert_chip(&mut *tx, modem_id, chip).await?;
                chip_count += 1;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "📡 Heartbeat da chipeira {}: {} modem(s), {} chip(s)",
            location_id,
            modems.len(),
            chip_count
        );
        Ok(())
    }

    pub async fn handle_sync(&self, api_key: &str, body: &[u8]) -> Result<Uuid, AppError> {
        let location = self.authenticate(api_key).await?;
        let payload = parse_sync_body(body)?;
        let modems = validate_sync(&payload)?;
        self.sync_location(location.id, &modems).await?;
        Ok(location.id)
    }
}
