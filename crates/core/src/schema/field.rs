//! Field definitions and their type-specific options.
//!
//! Field documents use the camelCase interchange shape, with the field type
//! carried in a `type` tag next to the common flags.

use serde::{Deserialize, Serialize};
use stint_shared::{CollectionId, FieldId};

/// A typed, constrained attribute of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Stable field ID.
    pub id: FieldId,
    /// Field name, unique within its collection.
    pub name: String,
    /// Whether the field is managed by the system.
    #[serde(default)]
    pub system: bool,
    /// Whether the field is hidden from API responses.
    #[serde(default)]
    pub hidden: bool,
    /// Whether the field is used when presenting related records.
    #[serde(default)]
    pub presentable: bool,
    /// Whether a value is required.
    #[serde(default)]
    pub required: bool,
    /// Type tag and type-specific options.
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDefinition {
    /// Creates a non-system, optional field.
    #[must_use]
    pub fn new(id: impl Into<FieldId>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            system: false,
            hidden: false,
            presentable: false,
            required: false,
            kind,
        }
    }

    /// Creates the standard 15-character primary key field.
    #[must_use]
    pub fn primary_key(id: impl Into<FieldId>) -> Self {
        Self {
            system: true,
            required: true,
            ..Self::new(
                id,
                "id",
                FieldKind::Text(TextOptions {
                    min: 15,
                    max: 15,
                    pattern: "^[a-z0-9]+$".to_string(),
                    autogenerate_pattern: "[a-z0-9]{15}".to_string(),
                    primary_key: true,
                }),
            )
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns true if this field is the collection's primary key.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        matches!(&self.kind, FieldKind::Text(text) if text.primary_key)
    }

    /// Returns the relation options if this is a relation field.
    #[must_use]
    pub fn relation(&self) -> Option<&RelationOptions> {
        match &self.kind {
            FieldKind::Relation(options) => Some(options),
            _ => None,
        }
    }
}

/// Field type with its constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Plain text.
    Text(TextOptions),
    /// Numeric value.
    Number(NumberOptions),
    /// Boolean flag.
    Bool,
    /// Email address.
    Email(DomainOptions),
    /// URL.
    Url(DomainOptions),
    /// Rich text (HTML).
    Editor(EditorOptions),
    /// Date and time.
    Date(DateOptions),
    /// Date set automatically on create and/or update.
    Autodate(AutodateOptions),
    /// One or more values from a fixed list.
    Select(SelectOptions),
    /// Reference to records of another collection.
    Relation(RelationOptions),
    /// Arbitrary JSON.
    Json(JsonOptions),
    /// Hashed password.
    Password(PasswordOptions),
}

impl FieldKind {
    /// Returns the interchange type tag.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool => "bool",
            Self::Email(_) => "email",
            Self::Url(_) => "url",
            Self::Editor(_) => "editor",
            Self::Date(_) => "date",
            Self::Autodate(_) => "autodate",
            Self::Select(_) => "select",
            Self::Relation(_) => "relation",
            Self::Json(_) => "json",
            Self::Password(_) => "password",
        }
    }
}

/// Options of a text field. A `max` of zero means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    /// Minimum length.
    #[serde(default)]
    pub min: u32,
    /// Maximum length (0 = unbounded).
    #[serde(default)]
    pub max: u32,
    /// Regular expression values must match (empty = any).
    #[serde(default)]
    pub pattern: String,
    /// Regular expression used to generate values when none is given.
    #[serde(default)]
    pub autogenerate_pattern: String,
    /// Whether this field is the primary key.
    #[serde(default)]
    pub primary_key: bool,
}

/// Options of a number field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberOptions {
    /// Inclusive lower bound.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default)]
    pub max: Option<f64>,
    /// Whether only integers are accepted.
    #[serde(default)]
    pub only_int: bool,
}

/// Domain allow/deny lists shared by email and URL fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOptions {
    /// Domains that are rejected.
    #[serde(default)]
    pub except_domains: Vec<String>,
    /// Domains that are exclusively accepted.
    #[serde(default)]
    pub only_domains: Vec<String>,
}

/// Options of a rich text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    /// Maximum size in bytes (0 = default limit).
    #[serde(default)]
    pub max_size: u64,
    /// Whether relative URLs are rewritten.
    #[serde(default, rename = "convertURLs")]
    pub convert_urls: bool,
}

/// Options of a date field. Empty bounds are unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOptions {
    /// Earliest accepted date.
    #[serde(default)]
    pub min: String,
    /// Latest accepted date.
    #[serde(default)]
    pub max: String,
}

/// Options of an autodate field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutodateOptions {
    /// Set when the record is created.
    #[serde(default)]
    pub on_create: bool,
    /// Set whenever the record is updated.
    #[serde(default)]
    pub on_update: bool,
}

/// Options of a select field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptions {
    /// Allowed values.
    #[serde(default)]
    pub values: Vec<String>,
    /// Maximum number of selected values.
    #[serde(default)]
    pub max_select: u32,
}

/// Options of a relation field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationOptions {
    /// Target collection ID.
    pub collection_id: CollectionId,
    /// Whether deleting the target deletes the referencing record.
    #[serde(default)]
    pub cascade_delete: bool,
    /// Minimum number of related records.
    #[serde(default)]
    pub min_select: u32,
    /// Maximum number of related records (0 = unbounded).
    #[serde(default)]
    pub max_select: u32,
}

/// Options of a JSON field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOptions {
    /// Maximum size in bytes (0 = default limit).
    #[serde(default)]
    pub max_size: u64,
}

/// Options of a password field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordOptions {
    /// Minimum length.
    #[serde(default)]
    pub min: u32,
    /// Maximum length (0 = unbounded).
    #[serde(default)]
    pub max: u32,
    /// Regular expression values must match (empty = any).
    #[serde(default)]
    pub pattern: String,
    /// Hashing cost (0 = default).
    #[serde(default)]
    pub cost: u32,
}
