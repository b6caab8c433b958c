//src/main.rs

use axum::{
    http::{header, HeaderName, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod clients;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;


use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Cabeçalhos aceitos pelos clientes web e pelas chipeiras.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
        ])
}

pub fn app(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Chipeiras se autenticam pela x-api-key, não por JWT
    let gateway_routes = Router::new().route(
        "/gsm-gateway",
        post(handlers::gateway::sync).fallback(handlers::gateway::not_found),
    );

    // Vitrine da loja, sem login
    let store_routes = Router::new().route(
        "/api/store/services",
        get(handlers::catalog::list_store_services),
    );

    // Tudo abaixo exige Bearer
    let protected_routes = Router::new()
        .route("/api/users/me", get(handlers::auth::get_me))
        .route("/manage-users", post(handlers::manage_users::manage_users))
        .route("/verify-pix", post(handlers::verify_pix::verify_pix))
        .route(
            "/api/recharges",
            post(handlers::recharges::create_recharge).get(handlers::recharges::list_my_recharges),
        )
        .route("/api/recharges/pix-payload", get(handlers::recharges::pix_payload))
        .route("/api/admin/recharges", get(handlers::recharges::list_all_recharges))
        .route(
            "/api/admin/recharges/{recharge_id}/approve",
            post(handlers::recharges::approve_recharge),
        )
        .route(
            "/api/admin/recharges/{recharge_id}/reject",
            post(handlers::recharges::reject_recharge),
        )
        .route(
            "/api/locations",
            post(handlers::locations::create_location).get(handlers::locations::list_locations),
        )
        .route(
            "/api/locations/{location_id}",
            delete(handlers::locations::delete_location),
        )
        .route("/api/collaborator/earnings", get(handlers::earnings::get_earnings))
        .route(
            "/api/services",
            post(handlers::catalog::create_service).get(handlers::catalog::list_my_services),
        )
        .route(
            "/api/services/{service_id}",
            put(handlers::catalog::update_service).delete(handlers::catalog::delete_service),
        )
        .route(
            "/api/services/{service_id}/toggle",
            post(handlers::catalog::toggle_service),
        )
        .route(
            "/api/orders",
            post(handlers::orders::create_order).get(handlers::orders::list_my_orders),
        )
        .route("/api/admin/orders", get(handlers::orders::list_managed_orders))
        .route(
            "/api/admin/orders/{order_id}/activate",
            post(handlers::orders::activate_order),
        )
        .route(
            "/api/admin/orders/{order_id}/complete",
            post(handlers::orders::complete_order),
        )
        .route(
            "/api/admin/orders/{order_id}/cancel",
            post(handlers::orders::cancel_order),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(gateway_routes)
        .merge(store_routes)
        .merge(protected_routes)
        .fallback(handlers::gateway::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
