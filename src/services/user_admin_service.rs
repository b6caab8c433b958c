// src/services/user_admin_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProfileRepository, RoleRepository, UserRepository},
    models::{
        auth::AppRole,
        users::{
            BalanceResponse, CreateUserCommand, CreatedUser, UserAdminCommand, UserAdminResponse,
            UserSummary,
        },
    },
    services::{auth::hash_password, ledger_service::LedgerService},
};

#[derive(Clone)]
pub struct UserAdminService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
    profile_repo: ProfileRepository,
    ledger: LedgerService,
    pool: PgPool,
}

impl UserAdminService {
    pub fn new(
        user_repo: UserRepository,
        role_repo: RoleRepository,
        profile_repo: ProfileRepository,
        ledger: LedgerService,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, role_repo, profile_repo, ledger, pool }
    }

    /// Despacha uma ação já validada. `caller_id` é o admin autenticado.
    pub async fn execute(
        &self,
        caller_id: Uuid,
        command: UserAdminCommand,
    ) -> Result<UserAdminResponse, AppError> {
        match command {
            UserAdminCommand::List => Ok(UserAdminResponse::Users(self.list_users().await?)),
            UserAdminCommand::Create(cmd) => {
                Ok(UserAdminResponse::Created(self.create_user(cmd).await?))
            }
            UserAdminCommand::Delete { user_id } => {
                self.delete_user(caller_id, user_id).await?;
                Ok(UserAdminResponse::success())
            }
            UserAdminCommand::UpdateRole { user_id, role } => {
                self.update_role(user_id, role).await?;
                Ok(UserAdminResponse::success())
            }
            UserAdminCommand::AddBalance { user_id, amount_cents } => {
                let balance_cents = self.ledger.adjust_balance(user_id, amount_cents).await?;
                Ok(UserAdminResponse::Balance(BalanceResponse { user_id, balance_cents }))
            }
            UserAdminCommand::ResetPassword { user_id, password } => {
                self.reset_password(user_id, &password).await?;
                Ok(UserAdminResponse::success())
            }
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, AppError> {
        let rows = self.user_repo.list_with_profiles().await?;
        Ok(rows.into_iter().map(UserSummary::from).collect())
    }

    /// Conta já confirmada, com perfil e exatamente um cargo.
    pub async fn create_user(&self, cmd: CreateUserCommand) -> Result<CreatedUser, AppError> {
        let hashed_password = hash_password(&cmd.password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(&mut *tx, &cmd.email, &hashed_password, true)
            .await?;
        self.profile_repo
            .create_profile(&mut *tx, user.id, cmd.full_name.as_deref())
            .await?;
        self.role_repo.insert_role(&mut *tx, user.id, cmd.role).await?;

        tx.commit().await?;

        tracing::info!("👤 Admin criou o usuário {} ({})", user.id, cmd.role);
        Ok(CreatedUser { id: user.id, email: user.email })
    }

    pub async fn delete_user(&self, caller_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if caller_id == user_id {
            return Err(AppError::BadRequest(
                "ID inválido ou não pode deletar a si mesmo".into(),
            ));
        }

        if !self.user_repo.delete_user(&self.pool, user_id).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!("🗑️ Usuário {} removido por {}", user_id, caller_id);
        Ok(())
    }

    /// Remove todos os cargos e grava o novo na mesma transação.
    pub async fn update_role(&self, user_id: Uuid, role: AppRole) -> Result<(), AppError> {
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(AppError::UserNotFound);
        }

        let mut tx = self.pool.begin().await?;
        self.role_repo.clear_roles(&mut *tx, user_id).await?;
        self.role_repo.insert_role(&mut *tx, user_id, role).await?;
        tx.commit().await?;

        tracing::info!("🔑 Cargo de {} alterado para {}", user_id, role);
        Ok(())
    }

    pub async fn reset_password(&self, user_id: Uuid, password: &str) -> Result<(), AppError> {
        let hashed_password = hash_password(password).await?;

        if !self
            .user_repo
            .update_password(&self.pool, user_id, &hashed_password)
            .await?
        {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RechargeRepository;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> UserAdminService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/chipeira_test")
            .unwrap();
        let ledger = LedgerService::new(
            RechargeRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            pool.clone(),
        );
        UserAdminService::new(
            UserRepository::new(pool.clone()),
            RoleRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            ledger,
            pool,
        )
    }

    #[tokio::test]
    async fn self_delete_is_rejected_before_touching_the_database() {
        let admin = Uuid::new_v4();
        let err = service().delete_user(admin, admin).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("a si mesmo")));
    }

    #[test]
    fn responses_serialize_in_the_wire_shape() {
        let ok = serde_json::to_value(UserAdminResponse::success()).unwrap();
        assert_eq!(ok, serde_json::json!({ "success": true }));

        let id = Uuid::new_v4();
        let created = serde_json::to_value(UserAdminResponse::Created(CreatedUser {
            id,
            email: "a@b.com".into(),
        }))
        .unwrap();
        assert_eq!(created["email"], "a@b.com");
        assert_eq!(created["id"], id.to_string());

        let list = serde_json::to_value(UserAdminResponse::Users(vec![])).unwrap();
        assert!(list.as_array().unwrap().is_empty());
    }
}
