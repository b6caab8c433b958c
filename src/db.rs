pub mod user_repo;
pub use user_repo::UserRepository;
pub mod role_repo;
pub use role_repo::RoleRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod location_repo;
pub use location_repo::LocationRepository;
pub mod device_repo;
pub use device_repo::DeviceRepository;
pub mod recharge_repo;
pub use recharge_repo::RechargeRepository;
pub mod earnings_repo;
pub use earnings_repo::EarningsRepository;
pub mod service_repo;
pub use service_repo::ServiceRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
