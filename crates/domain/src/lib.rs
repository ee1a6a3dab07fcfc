//! Domain layer for the homegraph backend.
//!
//! This crate contains:
//! - Documents (Profile, Home, Room, Device) and request/response payloads
//! - The document store ports implemented by the persistence crate
//! - Ownership checks, the authorization guard, device placement and the
//!   resource lifecycle services
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{ServiceError, StoreError};
pub use store::{DeviceStore, HomeStore, ProfileStore, Store};
