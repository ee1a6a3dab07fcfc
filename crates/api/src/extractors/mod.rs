//! Custom Axum extractors.

pub mod profile_auth;

pub use profile_auth::ProfileAuth;
