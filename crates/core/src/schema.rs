//! Declarative entity schemas and document validation.
//!
//! A [`Schema`] is `static` data: the entity name, the collection it is stored
//! in, and an ordered list of [`Field`]s. Storage backends never look at the
//! Rust entity structs; they validate raw JSON documents against the schema
//! and hand back [`Document`]s, which callers decode into entities.
//!
//! Validation follows these rules, field by field in declaration order:
//!
//! - missing or `null` with a default: the default is written;
//! - missing or `null` and required: [`FieldError::Required`];
//! - present with the wrong JSON type: [`FieldError::Cast`];
//! - keys the schema does not declare are dropped.
//!
//! Every error is collected, so one failed write reports all bad fields.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::Email;

/// The JSON shape a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON string holding an email address, stored normalized.
    Email,
    /// Any JSON number.
    Number,
    /// JSON number without a fractional part.
    Integer,
    /// JSON boolean.
    Boolean,
    /// JSON array whose elements all have the inner kind.
    Array(&'static FieldKind),
    /// JSON object with arbitrary keys whose values all have the inner kind.
    Map(&'static FieldKind),
    /// Generated id of a document in the named entity.
    Ref(&'static str),
    /// Embedded sub-document with its own fields.
    Object(&'static [Field]),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Email => f.write_str("email address"),
            Self::Number => f.write_str("number"),
            Self::Integer => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
            Self::Array(inner) => write!(f, "array of {inner}"),
            Self::Map(inner) => write!(f, "map of {inner}"),
            Self::Ref(entity) => write!(f, "{entity} id"),
            Self::Object(_) => f.write_str("object"),
        }
    }
}

/// Value written when a field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// A fixed string.
    Str(&'static str),
    /// A fixed boolean.
    Bool(bool),
    /// `{}`
    EmptyMap,
    /// `[]`
    EmptyArray,
}

impl DefaultValue {
    fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.to_owned()),
            Self::Bool(b) => Value::Bool(b),
            Self::EmptyMap => Value::Object(Map::new()),
            Self::EmptyArray => Value::Array(Vec::new()),
        }
    }
}

/// One declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Key in the stored document.
    pub name: &'static str,
    /// Expected JSON shape.
    pub kind: FieldKind,
    /// Absent values are rejected unless a default exists.
    pub required: bool,
    /// Backends reject a second document with the same value.
    pub unique: bool,
    /// Value written when the field is absent.
    pub default: Option<DefaultValue>,
}

impl Field {
    /// An optional field with no default.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            unique: false,
            default: None,
        }
    }

    /// Shorthand for a required field.
    #[must_use]
    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Mark the field unique across the collection.
    #[must_use]
    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    /// Give the field a default.
    #[must_use]
    pub const fn with_default(self, value: DefaultValue) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }
}

/// A persisted entity's shape.
///
/// Every stored document also gets `createdAt` and `updatedAt`, set by the
/// backend rather than declared here.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    /// Entity name, the registry key (e.g. `"User"`).
    pub name: &'static str,
    /// Backing collection / table name (e.g. `"users"`).
    pub collection: &'static str,
    /// Declared fields, in validation order.
    pub fields: &'static [Field],
}

impl Schema {
    /// Look up a declared top-level field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Top-level fields marked unique.
    pub fn unique_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.unique)
    }

    /// Validate a document against this schema.
    ///
    /// Returns the cleaned document: defaults filled in, undeclared keys
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every missing or mistyped field.
    pub fn validate(&self, mut doc: Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        let mut errors = Vec::new();
        let cleaned = validate_fields(self.fields, &mut doc, "", &mut errors);

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(ValidationError {
                entity: self.name,
                errors,
            })
        }
    }
}

fn validate_fields(
    fields: &[Field],
    input: &mut Map<String, Value>,
    prefix: &str,
    errors: &mut Vec<FieldError>,
) -> Map<String, Value> {
    let mut out = Map::new();

    for field in fields {
        let path = if prefix.is_empty() {
            field.name.to_owned()
        } else {
            format!("{prefix}.{}", field.name)
        };

        match input.remove(field.name) {
            None | Some(Value::Null) => {
                if let Some(default) = field.default {
                    out.insert(field.name.to_owned(), default.to_value());
                } else if field.required {
                    errors.push(FieldError::Required { path });
                }
            }
            Some(value) => {
                if let Some(value) = check_kind(field.kind, value, &path, errors) {
                    out.insert(field.name.to_owned(), value);
                }
            }
        }
    }

    out
}

fn check_kind(
    kind: FieldKind,
    value: Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    match (kind, value) {
        (FieldKind::String, v @ Value::String(_))
        | (FieldKind::Number, v @ Value::Number(_))
        | (FieldKind::Boolean, v @ Value::Bool(_)) => Some(v),
        (FieldKind::Email, Value::String(raw)) => match Email::parse(&raw) {
            Ok(email) => Some(Value::String(email.into())),
            Err(_) => cast_error(kind, path, errors),
        },
        (FieldKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Some(Value::Number(n))
        }
        (FieldKind::Ref(_), Value::Number(n))
            if n.as_i64().is_some_and(|id| i32::try_from(id).is_ok()) =>
        {
            Some(Value::Number(n))
        }
        (FieldKind::Array(inner), Value::Array(items)) => {
            let before = errors.len();
            let mut checked = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                if let Some(item) = check_kind(*inner, item, &format!("{path}.{index}"), errors) {
                    checked.push(item);
                }
            }
            (errors.len() == before).then_some(Value::Array(checked))
        }
        (FieldKind::Map(inner), Value::Object(entries)) => {
            let before = errors.len();
            let mut checked = Map::new();
            for (key, item) in entries {
                if let Some(item) = check_kind(*inner, item, &format!("{path}.{key}"), errors) {
                    checked.insert(key, item);
                }
            }
            (errors.len() == before).then_some(Value::Object(checked))
        }
        (FieldKind::Object(fields), Value::Object(mut entries)) => Some(Value::Object(
            validate_fields(fields, &mut entries, path, errors),
        )),
        (kind, _) => cast_error(kind, path, errors),
    }
}

fn cast_error(kind: FieldKind, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    errors.push(FieldError::Cast {
        path: path.to_owned(),
        expected: kind.to_string(),
    });
    None
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// A required field is missing or null.
    #[error("{path} is required")]
    Required {
        /// Dotted path to the field.
        path: String,
    },
    /// A field has the wrong JSON type.
    #[error("{path} must be {expected}")]
    Cast {
        /// Dotted path to the field.
        path: String,
        /// Description of the expected kind.
        expected: String,
    },
}

impl FieldError {
    /// Dotted path of the offending field (`items.0.quantity`).
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Required { path } | Self::Cast { path, .. } => path,
        }
    }
}

/// A document failed its schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} validation failed: {}", join_errors(.errors))]
pub struct ValidationError {
    /// Entity whose schema rejected the document.
    pub entity: &'static str,
    /// Every failing field, in declaration order.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Whether the given field path is among the failures.
    #[must_use]
    pub fn has_field(&self, path: &str) -> bool {
        self.errors.iter().any(|error| error.path() == path)
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A stored document as returned by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Generated id.
    pub id: i32,
    /// Validated fields, keyed by their stored names.
    pub fields: Map<String, Value>,
    /// Set once on insert.
    pub created_at: DateTime<Utc>,
    /// Bumped on every update.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// A top-level field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Whether the document contains `filter`: every key is present and its
    /// value contains the filter's value.
    ///
    /// Objects match on a subset of their keys, and an array matches when
    /// each filter element is contained in some stored element.
    #[must_use]
    pub fn matches(&self, filter: &Map<String, Value>) -> bool {
        filter
            .iter()
            .all(|(key, expected)| self.fields.get(key).is_some_and(|v| contains(v, expected)))
    }

    /// The full JSON view: stored fields plus `id`, `createdAt`, `updatedAt`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".to_owned(), Value::from(self.id));
        map.insert(
            "createdAt".to_owned(),
            Value::String(self.created_at.to_rfc3339()),
        );
        map.insert(
            "updatedAt".to_owned(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        Value::Object(map)
    }

    /// Decode into a typed entity.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the stored shape does not fit `E`.
    pub fn decode<E: Entity>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}

fn contains(stored: &Value, expected: &Value) -> bool {
    match (stored, expected) {
        (Value::Object(stored), Value::Object(expected)) => expected
            .iter()
            .all(|(key, want)| stored.get(key).is_some_and(|have| contains(have, want))),
        (Value::Array(stored), Value::Array(expected)) => expected
            .iter()
            .all(|want| stored.iter().any(|have| contains(have, want))),
        (stored, expected) => stored == expected,
    }
}

/// A Rust type backed by a schema.
pub trait Entity: DeserializeOwned {
    /// Typed id for documents of this entity.
    type Id: Copy + From<i32> + Into<i32>;

    /// The schema documents of this entity are validated against.
    fn schema() -> &'static Schema;
}
