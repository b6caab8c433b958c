// src/db/location_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::device::{Chip, Location, Modem},
};

const LOCATION_COLUMNS: &str =
    "id, user_id, name, description, api_key, is_active, last_seen_at, created_at, updated_at";

#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Autenticação da chipeira
    // ---

    pub async fn find_active_by_api_key(&self, api_key: &str) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE api_key = $1 AND is_active"
        ))
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(location)
    }

    pub async fn touch_heartbeat<'e, E>(&self, executor: E, location_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE locations SET last_seen_at = now(), updated_at = now() WHERE id = $1")
            .bind(location_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // ---
    // CRUD do painel
    // ---

    pub async fn create_location(
        &self,
        user_id: Uuid,
        name: &str,
        description: Option<&str>,
        api_key: &str,
    ) -> Result<Location, AppError> {
        let location = sqlx::query_as::<_, Location>(&format!(
            r#"
            INSERT INTO locations (user_id, name, description, api_key)
            VALUES ($1, $2, $3, $4)
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(api_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(location)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(location)
    }

    /// `owner = None` devolve todas as chipeiras (visão do admin).
    pub async fn list_locations(&self, owner: Option<Uuid>) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS} FROM locations
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    pub async fn delete_location(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn modems_for_locations(&self, location_ids: &[Uuid]) -> Result<Vec<Modem>, AppError> {
        let modems = sqlx::query_as::<_, Modem>(
            r#"
            SELECT id, location_id, port_name, imei, operator, signal_strength,
                   status, last_seen_at, created_at, updated_at
            FROM modems
            WHERE location_id = ANY($1)
            ORDER BY port_name ASC
            "#,
        )
        .bind(location_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(modems)
    }

    pub async fn chips_for_modems(&self, modem_ids: &[Uuid]) -> Result<Vec<Chip>, AppError> {
        let chips = sqlx::query_as::<_, Chip>(
            r#"
            SELECT id, modem_id, phone_number, iccid, operator, status,
                   detected_at, created_at, updated_at
            FROM chips
            WHERE modem_id = ANY($1)
            ORDER BY phone_number ASC
            "#,
        )
        .bind(modem_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(chips)
    }
}
