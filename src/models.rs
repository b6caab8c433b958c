pub mod auth;
pub mod catalog;
pub mod device;
pub mod earnings;
pub mod orders;
pub mod recharge;
pub mod users;
