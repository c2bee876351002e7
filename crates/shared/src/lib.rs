//! Shared identifiers and configuration for Stint.
//!
//! This crate provides common types used across all other crates:
//! - Typed identifiers for collections, fields and migration steps
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{CollectionId, FieldId, MigrationId};
