// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    clients::{AiGatewayClient, ProofStorage, ReceiptVerifier, StorageClient},
    db::{
        DeviceRepository, EarningsRepository, LocationRepository, OrderRepository,
        ProfileRepository, RechargeRepository, RoleRepository, ServiceRepository, UserRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, earnings_service::EarningsService,
        gateway_service::GatewayService, ledger_service::LedgerService,
        location_service::LocationService, order_service::OrderService,
        pix_payload::PixMerchant, pix_service::PixVerificationService,
        recharge_service::RechargeService,
        user_admin_service::UserAdminService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_AI_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev";
const DEFAULT_AI_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_PIX_MERCHANT_NAME: &str = "CHIPEIRA";
const DEFAULT_PIX_MERCHANT_CITY: &str = "SAO PAULO";

// Tudo que vem do ambiente, lido uma vez no boot.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub storage_url: Option<String>,
    pub storage_service_key: Option<String>,
    pub ai_gateway_url: String,
    pub ai_gateway_api_key: Option<String>,
    pub ai_model: String,
    pub pix_key: Option<String>,
    pub pix_merchant_name: String,
    pub pix_merchant_city: String,
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn pix_merchant(&self) -> Option<PixMerchant> {
        self.pix_key.as_ref().map(|key| PixMerchant {
            key: key.clone(),
            name: self.pix_merchant_name.clone(),
            city: self.pix_merchant_city.clone(),
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let max_connections = match optional_var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: optional_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            max_connections,
            storage_url: optional_var("STORAGE_URL"),
            storage_service_key: optional_var("STORAGE_SERVICE_KEY"),
            ai_gateway_url: optional_var("AI_GATEWAY_URL")
                .unwrap_or_else(|| DEFAULT_AI_GATEWAY_URL.into()),
            ai_gateway_api_key: optional_var("AI_GATEWAY_API_KEY"),
            ai_model: optional_var("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.into()),
            pix_key: optional_var("PIX_KEY"),
            pix_merchant_name: optional_var("PIX_MERCHANT_NAME")
                .unwrap_or_else(|| DEFAULT_PIX_MERCHANT_NAME.into()),
            pix_merchant_city: optional_var("PIX_MERCHANT_CITY")
                .unwrap_or_else(|| DEFAULT_PIX_MERCHANT_CITY.into()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub gateway_service: GatewayService,
    pub user_admin_service: UserAdminService,
    pub pix_service: PixVerificationService,
    pub recharge_service: RechargeService,
    pub location_service: LocationService,
    pub earnings_service: EarningsService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::build(settings, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(settings: &Settings, db_pool: PgPool) -> Self {
        let storage: Option<Arc<dyn ProofStorage>> =
            match (&settings.storage_url, &settings.storage_service_key) {
                (Some(url), Some(key)) => {
                    Some(Arc::new(StorageClient::new(url.clone(), key.clone())))
                }
                _ => {
                    tracing::warn!("⚠️ Storage não configurado: verify-pix não conseguirá baixar comprovantes");
                    None
                }
            };

        let verifier: Option<Arc<dyn ReceiptVerifier>> =
            settings.ai_gateway_api_key.as_ref().map(|key| {
                Arc::new(AiGatewayClient::new(
                    settings.ai_gateway_url.clone(),
                    key.clone(),
                    settings.ai_model.clone(),
                )) as Arc<dyn ReceiptVerifier>
            });

        Self::with_clients(settings, db_pool, storage, verifier)
    }

    pub fn with_clients(
        settings: &Settings,
        db_pool: PgPool,
        storage: Option<Arc<dyn ProofStorage>>,
        verifier: Option<Arc<dyn ReceiptVerifier>>,
    ) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let role_repo = RoleRepository::new(db_pool.clone());
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let location_repo = LocationRepository::new(db_pool.clone());
        let recharge_repo = RechargeRepository::new(db_pool.clone());
        let earnings_repo = EarningsRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            role_repo.clone(),
            profile_repo.clone(),
            settings.jwt_secret.clone(),
            db_pool.clone(),
        );
        let ledger = LedgerService::new(recharge_repo.clone(), profile_repo.clone(), db_pool.clone());
        let gateway_service =
            GatewayService::new(location_repo.clone(), DeviceRepository::new(), db_pool.clone());
        let user_admin_service = UserAdminService::new(
            user_repo,
            role_repo,
            profile_repo,
            ledger.clone(),
            db_pool.clone(),
        );
        let pix_service =
            PixVerificationService::new(recharge_repo.clone(), ledger.clone(), storage, verifier);
        let recharge_service =
            RechargeService::new(recharge_repo, ledger.clone(), settings.pix_merchant());
        let location_service = LocationService::new(location_repo);
        let earnings_service = EarningsService::new(earnings_repo);
        let catalog_service = CatalogService::new(ServiceRepository::new(db_pool.clone()));
        let order_service =
            OrderService::new(OrderRepository::new(db_pool.clone()), ledger, db_pool.clone());

        Self {
            db_pool,
            auth_service,
            gateway_service,
            user_admin_service,
            pix_service,
            recharge_service,
            location_service,
            earnings_service,
            catalog_service,
            order_service,
        }
    }
}
