// src/services/catalog_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ServiceRepository,
    models::catalog::{Service, ServicePayload},
};

/// Colaborador só mexe nos próprios serviços; admin mexe em todos.
pub fn ensure_can_manage(service: &Service, caller_id: Uuid, is_admin: bool) -> Result<(), AppError> {
    if service.user_id == caller_id || is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Você não tem permissão para alterar este serviço.".into(),
        ))
    }
}

#[derive(Clone)]
pub struct CatalogService {
    service_repo: ServiceRepository,
}

impl CatalogService {
    pub fn new(service_repo: ServiceRepository) -> Self {
        Self { service_repo }
    }

    pub async fn list_store(&self) -> Result<Vec<Service>, AppError> {
        self.service_repo.list_active().await
    }

    pub async fn list_managed(&self, caller_id: Uuid, is_admin: bool) -> Result<Vec<Service>, AppError> {
        self.service_repo.list((!is_admin).then_some(caller_id)).await
    }

    pub async fn create(&self, owner_id: Uuid, payload: &ServicePayload) -> Result<Service, AppError> {
        let service = self.service_repo.create(owner_id, payload).await?;
        tracing::info!("🛒 Serviço {} criado por {}", service.id, owner_id);
        Ok(service)
    }

    pub async fn update(
        &self,
        caller_id: Uuid,
        is_admin: bool,
        id: Uuid,
        payload: &ServicePayload,
    ) -> Result<Service, AppError> {
        self.managed(caller_id, is_admin, id).await?;
        self.service_repo
            .update(id, payload)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn toggle_active(&self, caller_id: Uuid, is_admin: bool, id: Uuid) -> Result<Service, AppError> {
        self.managed(caller_id, is_admin, id).await?;
        let service = self.service_repo.toggle_active(id).await?.ok_or_else(not_found)?;
        tracing::info!("🛒 Serviço {} agora is_active={}", id, service.is_active);
        Ok(service)
    }

    pub async fn delete(&self, caller_id: Uuid, is_admin: bool, id: Uuid) -> Result<(), AppError> {
        self.managed(caller_id, is_admin, id).await?;
        if !self.service_repo.delete(id).await? {
            return Err(not_found());
        }
        tracing::info!("🗑️ Serviço {} removido por {}", id, caller_id);
        Ok(())
    }

    async fn managed(&self, caller_id: Uuid, is_admin: bool, id: Uuid) -> Result<Service, AppError> {
        let service = self.service_repo.find_by_id(id).await?.ok_or_else(not_found)?;
        ensure_can_manage(&service, caller_id, is_admin)?;
        Ok(service)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Serviço não encontrado.".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::ServiceType;
    use chrono::Utc;

    fn service(owner: Uuid) -> Service {
        Service {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "SMS WhatsApp".into(),
            description: None,
            service_type: ServiceType::Verification,
            price_cents: 1_500,
            duration_minutes: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_and_admin_may_manage() {
        let owner = Uuid::new_v4();
        let svc = service(owner);
        assert!(ensure_can_manage(&svc, owner, false).is_ok());
        assert!(ensure_can_manage(&svc, Uuid::new_v4(), true).is_ok());
        assert!(matches!(
            ensure_can_manage(&svc, Uuid::new_v4(), false),
            Err(AppError::Forbidden(_))
        ));
    }
}
