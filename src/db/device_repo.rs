// src/db/device_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::device::{ChipSync, ModemSync},
};

// Escritas do gateway: sempre "insert-or-update" atômico (ON CONFLICT).
// Roda dentro da transação do sync.
#[derive(Clone, Default)]
pub struct DeviceRepository;

impl DeviceRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn upsert_modem<'e, E>(
        &self,
        executor: E,
        location_id: Uuid,
        modem: &ModemSync,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let modem_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO modems (
                location_id, port_name, imei, operator,
                signal_strength, status, last_seen_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, now())
            ON CONFLICT (location_id, port_name) DO UPDATE SET
                imei = EXCLUDED.imei,
                operator = EXCLUDED.operator,
                signal_strength = EXCLUDED.signal_strength,
                status = EXCLUDED.status,
                last_seen_at = EXCLUDED.last_seen_at,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(location_id)
        .bind(&modem.port_name)
        .bind(&modem.imei)
        .bind(&modem.operator)
        .bind(modem.signal_strength)
        .bind(&modem.status)
        .fetch_one(executor)
        .await?;
        Ok(modem_id)
    }

    pub async fn upsert_chip<'e, E>(
        &self,
        executor: E,
        modem_id: Uuid,
        chip: &ChipSync,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let chip_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO chips (modem_id, phone_number, iccid, operator, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (modem_id, phone_number) DO UPDATE SET
                iccid = EXCLUDED.iccid,
                operator = EXCLUDED.operator,
                status = EXCLUDED.status,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(modem_id)
        .bind(&chip.phone_number)
        .bind(&chip.iccid)
        .bind(&chip.operator)
        .bind(&chip.status)
        .fetch_one(executor)
        .await?;
        Ok(chip_id)
    }
}
