// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Cargos da aplicação (enum `app_role` no Postgres)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "app_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    Collaborator,
    Customer,
}

impl AppRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(AppRole::Admin),
            "collaborator" => Some(AppRole::Collaborator),
            "customer" => Some(AppRole::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "admin",
            AppRole::Collaborator => "collaborator",
            AppRole::Customer => "customer",
        }
    }

    /// Admin é superconjunto de qualquer outro cargo.
    pub fn is_granted(held: &[AppRole], required: AppRole) -> bool {
        held.iter().any(|r| *r == required || *r == AppRole::Admin)
    }
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Conta de autenticação vinda do banco
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub email_confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(max = 120, message = "O nome deve ter no máximo 120 caracteres."))]
    pub full_name: Option<String>,
    // Só "customer" ou "collaborator" no auto-cadastro
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub full_name: Option<String>,
    pub balance_cents: i64,
    pub roles: Vec<AppRole>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_satisfies_every_role() {
        let held = [AppRole::Admin];
        assert!(AppRole::is_granted(&held, AppRole::Collaborator));
        assert!(AppRole::is_granted(&held, AppRole::Customer));
        assert!(AppRole::is_granted(&held, AppRole::Admin));
    }

    #[test]
    fn customer_is_not_collaborator() {
        let held = [AppRole::Customer];
        assert!(!AppRole::is_granted(&held, AppRole::Collaborator));
        assert!(!AppRole::is_granted(&[], AppRole::Customer));
    }

    #[test]
    fn parse_rejects_unknown_roles() {
        assert_eq!(AppRole::parse("collaborator"), Some(AppRole::Collaborator));
        assert_eq!(AppRole::parse("Admin"), None);
        assert_eq!(AppRole::parse("superuser"), None);
    }
}
