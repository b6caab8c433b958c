// src/services/earnings_service.rs

use uuid::Uuid;

use crate::{common::error::AppError, db::EarningsRepository, models::earnings::EarningsSummary};

#[derive(Clone)]
pub struct EarningsService {
    earnings_repo: EarningsRepository,
}

impl EarningsService {
    pub fn new(earnings_repo: EarningsRepository) -> Self {
        Self { earnings_repo }
    }

    pub async fn summary_for(&self, collaborator_id: Uuid) -> Result<EarningsSummary, AppError> {
        let row = self.earnings_repo.revenue_for_collaborator(collaborator_id).await?;
        Ok(EarningsSummary::from(row))
    }
}
