// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AppRole, User},
};

/// Um cargo exigido por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> AppRole;
    fn denied_message() -> String {
        format!("Você precisa do cargo '{}' para realizar esta ação.", Self::role())
    }
}

/// Guardião: 401 sem usuário, 403 sem o cargo. Admin passa em qualquer checagem.
/// Carrega o usuário e os cargos que ele possui.
pub struct RequireRole<T> {
    pub user: User,
    pub roles: Vec<AppRole>,
    _role: PhantomData<T>,
}

impl<T> RequireRole<T> {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&AppRole::Admin)
    }
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let AuthenticatedUser(user) = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        let roles = app_state.auth_service.roles_of(user.id).await?;

        if !AppRole::is_granted(&roles, T::role()) {
            return Err(AppError::Forbidden(T::denied_message()));
        }

        Ok(RequireRole { user, roles, _role: PhantomData })
    }
}

// ---
// DEFINIÇÃO DOS CARGOS (TIPOS)
// ---

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn role() -> AppRole { AppRole::Admin }
    fn denied_message() -> String { "Admin only".to_string() }
}

pub struct CollaboratorRole;
impl RoleDef for CollaboratorRole {
    fn role() -> AppRole { AppRole::Collaborator }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_guard_answers_admin_only() {
        assert_eq!(AdminRole::denied_message(), "Admin only");
        assert!(CollaboratorRole::denied_message().contains("collaborator"));
    }

    #[test]
    fn admin_satisfies_collaborator_guard() {
        assert!(AppRole::is_granted(&[AppRole::Admin], CollaboratorRole::role()));
        assert!(!AppRole::is_granted(&[AppRole::Customer], CollaboratorRole::role()));
    }
}
