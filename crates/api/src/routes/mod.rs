//! HTTP route handlers.

pub mod devices;
pub mod health;
pub mod homes;
pub mod profiles;
pub mod register;
