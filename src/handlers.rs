pub mod auth;
pub mod catalog;
pub mod earnings;
pub mod gateway;
pub mod locations;
pub mod manage_users;
pub mod orders;
pub mod recharges;
pub mod verify_pix;
