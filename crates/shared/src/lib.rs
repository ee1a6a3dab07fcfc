//! Shared utilities and common types for the homegraph backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Resource identifier parsing
//! - API token generation and hashing
//! - JWT access token verification
//! - Common validation logic

pub mod crypto;
pub mod ids;
pub mod jwt;
pub mod validation;
