pub mod account;
pub mod appointment;
pub mod auth;
pub mod error;
