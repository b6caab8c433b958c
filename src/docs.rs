// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Gateway ---
        handlers::gateway::sync,

        // --- Admin ---
        handlers::manage_users::manage_users,
        handlers::recharges::list_all_recharges,
        handlers::recharges::approve_recharge,
        handlers::recharges::reject_recharge,

        // --- Recharges ---
        handlers::recharges::create_recharge,
        handlers::recharges::list_my_recharges,
        handlers::recharges::pix_payload,
        handlers::verify_pix::verify_pix,

        // --- Locations ---
        handlers::locations::create_location,
        handlers::locations::list_locations,
        handlers::locations::delete_location,
        handlers::earnings::get_earnings,

        // --- Store ---
        handlers::catalog::list_store_services,
        handlers::catalog::list_my_services,
        handlers::catalog::create_service,
        handlers::catalog::update_service,
        handlers::catalog::toggle_service,
        handlers::catalog::delete_service,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_my_orders,
        handlers::orders::list_managed_orders,
        handlers::orders::activate_order,
        handlers::orders::complete_order,
        handlers::orders::cancel_order,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::AppRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,

            // --- Device ---
            models::device::Location,
            models::device::Modem,
            models::device::Chip,
            models::device::ModemOverview,
            models::device::LocationOverview,
            models::device::CreateLocationPayload,
            models::device::SyncPayload,
            models::device::ModemReport,
            models::device::ChipReport,
            models::device::SyncResponse,

            // --- Users ---
            models::users::UserSummary,
            models::users::CreatedUser,
            models::users::BalanceResponse,
            models::users::UserAdminResponse,

            // --- Recharges ---
            models::recharge::RechargeStatus,
            models::recharge::RechargeRequest,
            models::recharge::CreateRechargePayload,
            models::recharge::ReviewRechargePayload,
            models::recharge::LedgerReceipt,
            models::recharge::VerifyPixPayload,
            models::recharge::VerifyPixResponse,
            models::recharge::PixPayloadResponse,

            // --- Store ---
            models::catalog::ServiceType,
            models::catalog::Service,
            models::catalog::ServicePayload,

            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::Order,
            models::orders::OrderWithService,
            models::orders::CreateOrderPayload,
            models::orders::ActivateOrderPayload,
            models::orders::CancelledOrder,

            // --- Earnings ---
            models::earnings::EarningsSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário, Cargos e Saldo"),
        (name = "Gateway", description = "Heartbeat das chipeiras (x-api-key)"),
        (name = "Admin", description = "Gestão de Usuários e Aprovação de Recargas"),
        (name = "Recharges", description = "Recargas PIX e Verificação Automática"),
        (name = "Locations", description = "Chipeiras, Modems, Chips e Comissões"),
        (name = "Store", description = "Catálogo de Serviços"),
        (name = "Orders", description = "Pedidos: Compra, Ativação, Conclusão e Cancelamento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
