// src/services/pix_payload.rs

use qrcode::{render::svg, QrCode};

use crate::{common::error::AppError, models::recharge::format_cents};

// Limites do BR Code para nome e cidade do recebedor.
const MERCHANT_NAME_MAX: usize = 25;
const MERCHANT_CITY_MAX: usize = 15;
const QR_MIN_DIMENSION: u32 = 240;

/// Recebedor do PIX exibido na tela de recarga.
#[derive(Debug, Clone)]
pub struct PixMerchant {
    pub key: String,
    pub name: String,
    pub city: String,
}

// Campo EMV: id + tamanho com dois dígitos + valor.
fn field(id: &str, value: &str) -> String {
    format!("{id}{:02}{value}", value.len())
}

/// CRC16/CCITT-FALSE (polinômio 0x1021, início 0xFFFF).
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for byte in data {
        crc ^= u16::from(*byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

/// Payload "copia e cola" (BR Code estático). Sem valor quando `amount_cents` não é positivo.
pub fn build_br_code(merchant: &PixMerchant, amount_cents: Option<i64>) -> String {
    let account = field("00", "br.gov.bcb.pix") + &field("01", &merchant.key);
    let name: String = merchant.name.chars().take(MERCHANT_NAME_MAX).collect();
    let city: String = merchant.city.chars().take(MERCHANT_CITY_MAX).collect();

    let mut payload = field("00", "01");
    payload.push_str(&field("26", &account));
    payload.push_str(&field("52", "0000"));
    payload.push_str(&field("53", "986"));
    if let Some(cents) = amount_cents.filter(|c| *c > 0) {
        payload.push_str(&field("54", &format_cents(cents)));
    }
    payload.push_str(&field("58", "BR"));
    payload.push_str(&field("59", &name));
    payload.push_str(&field("60", &city));
    payload.push_str(&field("62", &field("05", "***")));
    payload.push_str("6304");

    let crc = crc16_ccitt(payload.as_bytes());
    format!("{payload}{crc:04X}")
}

pub fn render_qr_svg(payload: &str) -> Result<String, AppError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merchant() -> PixMerchant {
        PixMerchant {
            key: "pix@chipeira.com.br".into(),
            name: "CHIPEIRA".into(),
            city: "SAO PAULO".into(),
        }
    }

    #[test]
    fn crc_matches_ccitt_false_check_value() {
        assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
    }

    #[test]
    fn payload_carries_amount_and_checksum() {
        assert_eq!(
            build_br_code(&merchant(), Some(5_000)),
            "00020126410014br.gov.bcb.pix0119pix@chipeira.com.br520400005303986540550.00\
             5802BR5908CHIPEIRA6009SAO PAULO62070503***63046B30"
        );
    }

    #[test]
    fn amount_field_is_left_out_when_not_positive() {
        let payload = build_br_code(&merchant(), Some(0));
        assert_eq!(payload, build_br_code(&merchant(), None));
        assert!(!payload.contains("5405"));
        assert!(payload.ends_with("6304E7C6"));
    }

    #[test]
    fn checksum_covers_everything_before_it() {
        let payload = build_br_code(&merchant(), Some(1_234));
        let (body, crc) = payload.split_at(payload.len() - 4);
        assert!(body.ends_with("6304"));
        assert_eq!(crc, format!("{:04X}", crc16_ccitt(body.as_bytes())));
        assert!(body.contains("540512.34"));
    }

    #[test]
    fn long_merchant_name_and_city_are_truncated() {
        let merchant = PixMerchant {
            name: "N".repeat(40),
            city: "C".repeat(20),
            ..merchant()
        };
        let payload = build_br_code(&merchant, None);
        assert!(payload.contains(&format!("5925{}", "N".repeat(25))));
        assert!(payload.contains(&format!("6015{}", "C".repeat(15))));
    }

    #[test]
    fn qr_code_renders_as_svg() {
        let svg = render_qr_svg(&build_br_code(&merchant(), Some(5_000))).unwrap();
        assert!(svg.contains("<svg"));
    }
}
