// src/db/service_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Service, ServicePayload},
};

const SERVICE_COLUMNS: &str = "id, user_id, name, description, type, price_cents, \
     duration_minutes, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: Uuid, payload: &ServicePayload) -> Result<Service, AppError> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            INSERT INTO services (user_id, name, description, type, price_cents, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SERVICE_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(payload.name.trim())
        .bind(payload.trimmed_description())
        .bind(payload.service_type)
        .bind(payload.price_cents)
        .bind(payload.duration_minutes)
        .fetch_one(&self.pool)
        .await?;
        Ok(service)
    }

    /// Trocar o preço não mexe nos pedidos já feitos: eles guardam o próprio valor.
    pub async fn update(&self, id: Uuid, payload: &ServicePayload) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            UPDATE services
            SET name = $2, description = $3, type = $4, price_cents = $5,
                duration_minutes = $6, updated_at = now()
            WHERE id = $1
            RETURNING {SERVICE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.trimmed_description())
        .bind(payload.service_type)
        .bind(payload.price_cents)
        .bind(payload.duration_minutes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>(&format!(
            "UPDATE services SET is_active = NOT is_active, updated_at = now() WHERE id = $1 RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    /// Serviço com pedidos não pode ser apagado, só desativado.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::BadRequest(
                            "Este serviço já tem pedidos. Desative-o em vez de excluir.".into(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    /// Vitrine: só ativos, do mais barato para o mais caro.
    pub async fn list_active(&self) -> Result<Vec<Service>, AppError> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE is_active ORDER BY price_cents, name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    /// `owner_id = None` lista o catálogo inteiro (admin).
    pub async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Service>, AppError> {
        let services = sqlx::query_as::<_, Service>(&format!(
            r#"
            SELECT {SERVICE_COLUMNS} FROM services
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }
}
