//! Definition-time validation of collections and fields.
//!
//! These checks look at a single collection in isolation. Checks that need
//! the rest of the schema (relations, name uniqueness) live in `plan`.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use super::collection::CollectionDefinition;
use super::error::SchemaError;
use super::field::{FieldDefinition, FieldKind};

/// Validates a collection definition.
///
/// Rules enforced:
/// 1. Collection and field names are non-empty word characters
/// 2. Field names and field IDs are unique (names case-insensitively)
/// 3. Each field's constraints are consistent
/// 4. Exactly one field is the primary key and it is system-flagged
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_collection(collection: &CollectionDefinition) -> Result<(), SchemaError> {
    if !is_valid_name(&collection.name) {
        return Err(SchemaError::InvalidName(collection.name.clone()));
    }
    if collection.id.as_str().trim().is_empty() {
        return Err(SchemaError::InvalidName(format!(
            "{} (empty id)",
            collection.name
        )));
    }

    let mut names = HashSet::with_capacity(collection.fields.len());
    let mut ids = HashSet::with_capacity(collection.fields.len());

    for field in &collection.fields {
        if !is_valid_name(&field.name) {
            return Err(SchemaError::InvalidName(format!(
                "{}.{}",
                collection.name, field.name
            )));
        }
        if !names.insert(field.name.to_ascii_lowercase()) {
            return Err(SchemaError::DuplicateField {
                collection: collection.name.clone(),
                field: field.name.clone(),
            });
        }
        if !ids.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateField {
                collection: collection.name.clone(),
                field: field.id.to_string(),
            });
        }
        validate_field(&collection.name, field)?;
    }

    validate_primary_key(collection)
}

fn validate_primary_key(collection: &CollectionDefinition) -> Result<(), SchemaError> {
    let keys: Vec<&FieldDefinition> = collection
        .fields
        .iter()
        .filter(|field| field.is_primary_key())
        .collect();

    let invalid = |reason: String| SchemaError::InvalidPrimaryKey {
        collection: collection.name.clone(),
        reason,
    };

    match keys.as_slice() {
        [] => Err(invalid("no primary key field".to_string())),
        [key] if !key.system => Err(invalid(format!(
            "primary key '{}' must be a system field",
            key.name
        ))),
        [_] => Ok(()),
        many => Err(invalid(format!(
            "expected one primary key field, found {}",
            many.len()
        ))),
    }
}

/// Validates the constraints of a single field.
///
/// # Errors
///
/// Returns `InvalidConstraint` describing the first inconsistency.
pub fn validate_field(collection: &str, field: &FieldDefinition) -> Result<(), SchemaError> {
    let invalid = |reason: String| SchemaError::InvalidConstraint {
        collection: collection.to_string(),
        field: field.name.clone(),
        reason,
    };

    match &field.kind {
        FieldKind::Text(text) => {
            check_length_bounds(text.min, text.max).map_err(&invalid)?;
            check_pattern("pattern", &text.pattern).map_err(&invalid)?;
            check_pattern("autogeneratePattern", &text.autogenerate_pattern).map_err(&invalid)?;
        }
        FieldKind::Password(password) => {
            check_length_bounds(password.min, password.max).map_err(&invalid)?;
            check_pattern("pattern", &password.pattern).map_err(&invalid)?;
        }
        FieldKind::Number(number) => {
            for bound in [number.min, number.max].into_iter().flatten() {
                if !bound.is_finite() {
                    return Err(invalid(format!("bound {bound} is not finite")));
                }
                if number.only_int && bound.fract() != 0.0 {
                    return Err(invalid(format!(
                        "bound {bound} is not an integer but onlyInt is set"
                    )));
                }
            }
            if let (Some(min), Some(max)) = (number.min, number.max) {
                if min > max {
                    return Err(invalid(format!("min {min} is greater than max {max}")));
                }
            }
        }
        FieldKind::Email(domains) | FieldKind::Url(domains) => {
            if !domains.only_domains.is_empty() && !domains.except_domains.is_empty() {
                return Err(invalid(
                    "onlyDomains and exceptDomains are mutually exclusive".to_string(),
                ));
            }
        }
        FieldKind::Date(date) => {
            let min = parse_date_bound(&date.min).map_err(&invalid)?;
            let max = parse_date_bound(&date.max).map_err(&invalid)?;
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(invalid(format!(
                        "min {} is after max {}",
                        date.min, date.max
                    )));
                }
            }
        }
        FieldKind::Autodate(autodate) => {
            if !autodate.on_create && !autodate.on_update {
                return Err(invalid(
                    "at least one of onCreate and onUpdate must be set".to_string(),
                ));
            }
        }
        FieldKind::Select(select) => {
            if select.values.is_empty() {
                return Err(invalid("select needs at least one value".to_string()));
            }
            if select.max_select as usize > select.values.len() {
                return Err(invalid(format!(
                    "maxSelect {} exceeds the {} available values",
                    select.max_select,
                    select.values.len()
                )));
            }
        }
        FieldKind::Relation(relation) => {
            if relation.collection_id.as_str().trim().is_empty() {
                return Err(invalid("relation has no target collection".to_string()));
            }
            if relation.max_select > 0 && relation.min_select > relation.max_select {
                return Err(invalid(format!(
                    "minSelect {} is greater than maxSelect {}",
                    relation.min_select, relation.max_select
                )));
            }
        }
        FieldKind::Bool | FieldKind::Editor(_) | FieldKind::Json(_) => {}
    }

    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_length_bounds(min: u32, max: u32) -> Result<(), String> {
    // max == 0 means unbounded
    if max > 0 && min > max {
        return Err(format!("min {min} is greater than max {max}"));
    }
    Ok(())
}

fn check_pattern(label: &str, pattern: &str) -> Result<(), String> {
    if pattern.is_empty() {
        return Ok(());
    }
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| format!("{label} is not a valid regular expression: {e}"))
}

fn parse_date_bound(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.fZ")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| format!("'{raw}' is not a valid date"))
}
