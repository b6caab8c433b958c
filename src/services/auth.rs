// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProfileRepository, RoleRepository, UserRepository},
    models::auth::{AppRole, Claims, MeResponse, User},
};

const TOKEN_TTL_DAYS: i64 = 7;

/// Hash bcrypt fora do runtime assíncrono.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
    profile_repo: ProfileRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        role_repo: RoleRepository,
        profile_repo: ProfileRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, role_repo, profile_repo, jwt_secret, pool }
    }

    /// Cria conta + perfil + um cargo numa transação e devolve o token.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        role: AppRole,
    ) -> Result<String, AppError> {
        // Auto-cadastro nunca concede admin.
        if role == AppRole::Admin {
            return Err(AppError::Forbidden("Cargo não permitido no cadastro.".into()));
        }

        let hashed_password = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(&mut *tx, email, &hashed_password, false)
            .await?;
        self.profile_repo
            .create_profile(&mut *tx, new_user.id, full_name)
            .await?;
        self.role_repo.insert_role(&mut *tx, new_user.id, role).await?;

        tx.commit().await?;

        tracing::info!("👤 Novo usuário {} ({})", new_user.id, role);
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        // Conta apagada depois da emissão do token = não autenticado.
        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn roles_of(&self, user_id: Uuid) -> Result<Vec<AppRole>, AppError> {
        self.role_repo.roles_for_user(user_id).await
    }

    pub async fn me(&self, user: User) -> Result<MeResponse, AppError> {
        let roles = self.role_repo.roles_for_user(user.id).await?;
        let profile = self.profile_repo.find_by_user(user.id).await?;

        Ok(MeResponse {
            full_name: profile.as_ref().and_then(|p| p.full_name.clone()),
            balance_cents: profile.map(|p| p.balance_cents).unwrap_or(0),
            roles,
            user,
        })
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/chipeira_test")
            .unwrap();
        AuthService::new(
            UserRepository::new(pool.clone()),
            RoleRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            secret.to_string(),
            pool,
        )
    }

    #[tokio::test]
    async fn token_round_trips_subject() {
        let auth = service("segredo");
        let user_id = Uuid::new_v4();
        let token = auth.create_token(user_id).unwrap();
        assert_eq!(auth.decode_token(&token).unwrap().sub, user_id);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = service("a").create_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            service("b").decode_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("segredo1").await.unwrap();
        assert!(verify("segredo1", &hashed).unwrap());
        assert!(!verify("outra", &hashed).unwrap());
    }
}
