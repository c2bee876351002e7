//! Collection definitions and access rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stint_shared::CollectionId;

use super::field::{FieldDefinition, RelationOptions};

/// Collection type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// Regular collection.
    #[default]
    Base,
    /// Read-only collection backed by a query.
    View,
    /// Collection whose records can authenticate.
    Auth,
}

/// Operation gated by an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOperation {
    /// Listing records.
    List,
    /// Viewing a single record.
    View,
    /// Creating a record.
    Create,
    /// Updating a record.
    Update,
    /// Deleting a record.
    Delete,
}

/// Interpretation of a rule slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    /// No rule: only privileged callers may perform the operation.
    Locked,
    /// Empty rule: anyone may perform the operation.
    Public,
    /// Opaque predicate evaluated by the external query engine.
    Expression(&'a str),
}

/// The five access rules of a collection.
///
/// Rules are opaque predicate strings; this crate never evaluates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRules {
    /// Rule for listing records.
    pub list_rule: Option<String>,
    /// Rule for viewing a record.
    pub view_rule: Option<String>,
    /// Rule for creating a record.
    pub create_rule: Option<String>,
    /// Rule for updating a record.
    pub update_rule: Option<String>,
    /// Rule for deleting a record.
    pub delete_rule: Option<String>,
}

impl AccessRules {
    /// Rules that lock every operation.
    #[must_use]
    pub fn locked() -> Self {
        Self::default()
    }

    /// Returns the raw rule for an operation.
    #[must_use]
    pub fn rule(&self, operation: RuleOperation) -> Option<&str> {
        match operation {
            RuleOperation::List => self.list_rule.as_deref(),
            RuleOperation::View => self.view_rule.as_deref(),
            RuleOperation::Create => self.create_rule.as_deref(),
            RuleOperation::Update => self.update_rule.as_deref(),
            RuleOperation::Delete => self.delete_rule.as_deref(),
        }
    }

    /// Returns how an operation is gated.
    #[must_use]
    pub fn access(&self, operation: RuleOperation) -> Access<'_> {
        match self.rule(operation) {
            None => Access::Locked,
            Some(rule) if rule.trim().is_empty() => Access::Public,
            Some(rule) => Access::Expression(rule),
        }
    }
}

/// A named group of records sharing a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDefinition {
    /// Stable collection ID.
    pub id: CollectionId,
    /// Collection name, unique across collections.
    pub name: String,
    /// Collection type.
    #[serde(rename = "type", default)]
    pub kind: CollectionType,
    /// Access rules.
    #[serde(flatten)]
    pub rules: AccessRules,
    /// Ordered field definitions.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Index definitions, passed through to the store.
    #[serde(default)]
    pub indexes: Vec<String>,
    /// Whether the collection is managed by the system.
    #[serde(default)]
    pub system: bool,
    /// Type-specific options (view query, auth settings, ...), kept verbatim.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl CollectionDefinition {
    /// Creates an empty base collection with locked rules.
    #[must_use]
    pub fn new(id: impl Into<CollectionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: CollectionType::Base,
            rules: AccessRules::locked(),
            fields: Vec::new(),
            indexes: Vec::new(),
            system: false,
            options: Map::new(),
        }
    }

    /// Sets the collection type.
    #[must_use]
    pub fn with_kind(mut self, kind: CollectionType) -> Self {
        self.kind = kind;
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Replaces the access rules.
    #[must_use]
    pub fn with_rules(mut self, rules: AccessRules) -> Self {
        self.rules = rules;
        self
    }

    /// Finds a field by name (case-insensitive).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    /// Returns the first primary key field.
    #[must_use]
    pub fn primary_key(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.is_primary_key())
    }

    /// Iterates over relation fields.
    pub fn relations(&self) -> impl Iterator<Item = (&FieldDefinition, &RelationOptions)> {
        self.fields
            .iter()
            .filter_map(|field| field.relation().map(|options| (field, options)))
    }

    /// Returns field names in display order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }
}
