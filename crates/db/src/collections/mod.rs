//! Application collection migrations.
//!
//! Each module defines one step; [`registry`] assembles them explicitly.
//! File names carry the step identifier, a creation timestamp.

use stint_core::migration::{MigrationError, MigrationRegistry};

pub mod m1769902000_init_users_collection;
pub mod m1769902879_add_sessions_collection;

/// Builds the registry of every application migration.
///
/// # Errors
///
/// Returns an error if a step's collection document is invalid or two steps
/// share an identifier.
pub fn registry() -> Result<MigrationRegistry, MigrationError> {
    let mut registry = MigrationRegistry::new();
    registry
        .register(m1769902000_init_users_collection::migration()?)?
        .register(m1769902879_add_sessions_collection::migration()?)?;
    Ok(registry)
}
