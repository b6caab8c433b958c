// src/db/profile_repo.rs

use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub full_name: Option<String>,
    pub balance_cents: i64,
}

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        full_name: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO profiles (user_id, full_name) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(full_name)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        let profile = sqlx::query_as::<_, ProfileRow>(
            "SELECT full_name, balance_cents FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Soma `delta` ao saldo numa única instrução.
    /// `None` quando o perfil não existe ou o saldo ficaria negativo.
    pub async fn apply_delta<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        delta_cents: i64,
    ) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE profiles
            SET balance_cents = balance_cents + $2, updated_at = now()
            WHERE user_id = $1 AND balance_cents + $2 >= 0
            RETURNING balance_cents
            "#,
        )
        .bind(user_id)
        .bind(delta_cents)
        .fetch_optional(executor)
        .await?;
        Ok(balance)
    }

    pub async fn exists<'e, E>(&self, executor: E, user_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM profiles WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(found)
    }
}
