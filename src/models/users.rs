// src/models/users.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{common::error::AppError, models::auth::AppRole};

// Linha agregada (usuário + perfil + cargos) usada pelo `list`
#[derive(Debug, Clone, FromRow)]
pub struct UserSummaryRow {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub balance_cents: i64,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub balance_cents: i64,
    pub roles: Vec<AppRole>,
}

impl From<UserSummaryRow> for UserSummary {
    fn from(row: UserSummaryRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            created_at: row.created_at,
            full_name: row.full_name,
            balance_cents: row.balance_cents,
            roles: row.roles.iter().filter_map(|r| AppRole::parse(r)).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub user_id: Uuid,
    pub balance_cents: i64,
}

/// Resposta do `POST /manage-users`; o formato depende da ação.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UserAdminResponse {
    Users(Vec<UserSummary>),
    Created(CreatedUser),
    Balance(BalanceResponse),
    Success { success: bool },
}

impl UserAdminResponse {
    pub fn success() -> Self {
        Self::Success { success: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserCommand {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: AppRole,
}

/// Ações aceitas pelo `POST /manage-users`, já validadas campo a campo.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAdminCommand {
    List,
    Create(CreateUserCommand),
    Delete { user_id: Uuid },
    UpdateRole { user_id: Uuid, role: AppRole },
    AddBalance { user_id: Uuid, amount_cents: i64 },
    ResetPassword { user_id: Uuid, password: String },
}

const MIN_PASSWORD_LEN: usize = 6;

fn str_field<'a>(body: &'a Value, name: &str) -> Option<&'a str> {
    body.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn uuid_field(body: &Value, name: &str) -> Option<Uuid> {
    str_field(body, name).and_then(|s| Uuid::parse_str(s).ok())
}

fn password_field(body: &Value) -> Option<String> {
    str_field(body, "password")
        .filter(|p| p.chars().count() >= MIN_PASSWORD_LEN)
        .map(str::to_string)
}

impl UserAdminCommand {
    pub fn parse(body: &Value) -> Result<Self, AppError> {
        let invalid = || AppError::BadRequest("Dados inválidos".into());

        match body.get("action").and_then(Value::as_str) {
            Some("list") => Ok(Self::List),

            Some("create") => {
                let email = str_field(body, "email").filter(|e| e.validate_email());
                let password = password_field(body);
                let (Some(email), Some(password)) = (email, password) else {
                    return Err(AppError::BadRequest(
                        "Email e senha (min 6 chars) obrigatórios".into(),
                    ));
                };
                // Cargo inválido ou ausente vira "customer".
                let role = str_field(body, "role")
                    .and_then(AppRole::parse)
                    .unwrap_or(AppRole::Customer);

                Ok(Self::Create(CreateUserCommand {
                    email: email.trim().to_lowercase(),
                    password,
                    full_name: str_field(body, "full_name").map(str::to_string),
                    role,
                }))
            }

            Some("delete") => {
                let user_id = uuid_field(body, "user_id").ok_or_else(|| {
                    AppError::BadRequest("ID inválido ou não pode deletar a si mesmo".into())
                })?;
                Ok(Self::Delete { user_id })
            }

            Some("update_role") => {
                let user_id = uuid_field(body, "user_id").ok_or_else(invalid)?;
                let role = str_field(body, "role")
                    .and_then(AppRole::parse)
                    .ok_or_else(invalid)?;
                Ok(Self::UpdateRole { user_id, role })
            }

            Some("add_balance") => {
                let user_id = uuid_field(body, "user_id").ok_or_else(invalid)?;
                let amount_cents = body
                    .get("amount_cents")
                    .and_then(Value::as_i64)
                    .filter(|v| *v != 0)
                    .ok_or_else(invalid)?;
                Ok(Self::AddBalance { user_id, amount_cents })
            }

            Some("reset_password") => {
                let user_id = uuid_field(body, "user_id").ok_or_else(invalid)?;
                let password = password_field(body).ok_or_else(|| {
                    AppError::BadRequest("Senha (min 6 chars) obrigatória".into())
                })?;
                Ok(Self::ResetPassword { user_id, password })
            }

            _ => Err(AppError::BadRequest("Invalid action".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bad_request_message(result: Result<UserAdminCommand, AppError>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("esperava BadRequest, veio {:?}", other),
        }
    }

    #[test]
    fn unknown_or_missing_action_is_rejected() {
        assert_eq!(
            bad_request_message(UserAdminCommand::parse(&json!({ "action": "nuke" }))),
            "Invalid action"
        );
        assert_eq!(
            bad_request_message(UserAdminCommand::parse(&json!({}))),
            "Invalid action"
        );
    }

    #[test]
    fn create_defaults_invalid_role_to_customer() {
        let cmd = UserAdminCommand::parse(&json!({
            "action": "create",
            "email": "Novo@Exemplo.com",
            "password": "segredo1",
            "role": "superuser",
        }))
        .unwrap();

        match cmd {
            UserAdminCommand::Create(c) => {
                assert_eq!(c.role, AppRole::Customer);
                assert_eq!(c.email, "novo@exemplo.com");
                assert_eq!(c.full_name, None);
            }
            other => panic!("comando inesperado: {:?}", other),
        }
    }

    #[test]
    fn create_requires_six_char_password() {
        let msg = bad_request_message(UserAdminCommand::parse(&json!({
            "action": "create",
            "email": "a@b.com",
            "password": "12345",
        })));
        assert!(msg.contains("min 6"));
    }

    #[test]
    fn update_role_requires_valid_role() {
        let user_id = Uuid::new_v4();
        assert!(UserAdminCommand::parse(&json!({
            "action": "update_role",
            "user_id": user_id.to_string(),
            "role": "owner",
        }))
        .is_err());

        assert_eq!(
            UserAdminCommand::parse(&json!({
                "action": "update_role",
                "user_id": user_id.to_string(),
                "role": "collaborator",
            }))
            .unwrap(),
            UserAdminCommand::UpdateRole { user_id, role: AppRole::Collaborator }
        );
    }

    #[test]
    fn add_balance_rejects_zero_and_non_integers() {
        let user_id = Uuid::new_v4().to_string();
        for amount in [json!(0), json!("100"), json!(1.5)] {
            assert!(UserAdminCommand::parse(&json!({
                "action": "add_balance",
                "user_id": user_id,
                "amount_cents": amount,
            }))
            .is_err());
        }
    }

    #[test]
    fn delete_requires_a_uuid() {
        let msg = bad_request_message(UserAdminCommand::parse(&json!({
            "action": "delete",
            "user_id": "not-a-uuid",
        })));
        assert!(msg.contains("ID inválido"));
    }
}
