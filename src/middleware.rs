pub mod auth;
pub mod device;
pub mod rbac;
