//! Schema model and migration engine for Stint.
//!
//! This crate contains the pure schema logic and the migration runner with ZERO
//! database dependencies. Stores are plugged in through the traits in
//! [`migration::store`].
//!
//! # Modules
//!
//! - `schema` - Collection and field definitions, validation, snapshot planning
//! - `migration` - Migration steps, registry, runner and the in-memory store

pub mod migration;
pub mod schema;
