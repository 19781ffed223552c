//! Core business logic for Rebar.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `budget` - Budget variance analysis and impact projection
//! - `costing` - Cost total calculation and input validation
//! - `workflow` - Cost allocation approval state machine and roles
//! - `alert` - Budget alert evaluation
//! - `auth` - Password hashing

pub mod alert;
pub mod auth;
pub mod budget;
pub mod costing;
pub mod workflow;
