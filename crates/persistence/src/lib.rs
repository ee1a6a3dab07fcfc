//! Persistence layer for the homegraph backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - `PgStore` and `MemoryStore`, the two implementations of the domain store ports

pub mod db;
pub mod entities;
pub mod memory;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use store::PgStore;
