//! Schema definition model.
//!
//! This module describes collections declaratively:
//! - Field definitions with type-specific constraints
//! - Collection definitions with opaque access rules
//! - Definition-time validation
//! - Snapshot planning for sets of schema changes
//! - Error types for schema operations

pub mod collection;
pub mod error;
pub mod field;
pub mod plan;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use collection::{Access, AccessRules, CollectionDefinition, CollectionType, RuleOperation};
pub use error::SchemaError;
pub use field::{
    AutodateOptions, DateOptions, DomainOptions, EditorOptions, FieldDefinition, FieldKind,
    JsonOptions, NumberOptions, PasswordOptions, RelationOptions, SelectOptions, TextOptions,
};
pub use plan::{SchemaChange, SchemaPlan, import_changes, parse_collections};
pub use validation::{validate_collection, validate_field};
