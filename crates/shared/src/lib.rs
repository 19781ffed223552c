//! Shared types and configuration for Rebar.
//!
//! This crate provides common types used across all other crates:
//! - Configuration management
//! - JWT claims and token handling
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use jwt::{JwtError, JwtService};
