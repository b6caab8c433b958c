pub mod auth;
pub mod catalog_service;
pub mod earnings_service;
pub mod gateway_service;
pub mod ledger_service;
pub mod location_service;
pub mod order_service;
pub mod pix_payload;
pub mod pix_service;
pub mod recharge_service;
pub mod user_admin_service;
