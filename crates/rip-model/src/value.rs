//! Decoded field values.
//!
//! Every integer width widens to `i64`; the schema's declared field kind
//! decides how the value is narrowed again on encode and export.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::pptr::PPtr;

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f32),
    String(String),
    Bytes(Vec<u8>),
    PPtr(PPtr),
    Record(Record),
    Array(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::PPtr(_) => "pptr",
            Self::Record(_) => "record",
            Self::Array(_) => "array",
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_pptr(&self) -> Option<PPtr> {
        match self {
            Self::PPtr(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(value) => Some(value),
            _ => None,
        }
    }
}

/// Field values of one decoded type instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    type_name: String,
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    /// Builder form of [`Record::set`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set(field, value);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field value, or [`ModelError::MissingField`].
    pub fn require(&self, field: &str) -> Result<&Value> {
        self.fields
            .get(field)
            .ok_or_else(|| ModelError::MissingField {
                type_name: self.type_name.clone(),
                field: field.to_string(),
            })
    }

    pub fn int(&self, field: &str) -> Result<i64> {
        self.require(field)?
            .as_int()
            .ok_or_else(|| field_type(field, "an integer"))
    }

    pub fn float(&self, field: &str) -> Result<f32> {
        self.require(field)?
            .as_float()
            .ok_or_else(|| field_type(field, "a float"))
    }

    pub fn bool(&self, field: &str) -> Result<bool> {
        self.require(field)?
            .as_bool()
            .ok_or_else(|| field_type(field, "a bool"))
    }

    pub fn bytes(&self, field: &str) -> Result<&[u8]> {
        self.require(field)?
            .as_bytes()
            .ok_or_else(|| field_type(field, "a byte list"))
    }

    pub fn pptr(&self, field: &str) -> Result<PPtr> {
        self.require(field)?
            .as_pptr()
            .ok_or_else(|| field_type(field, "a pptr"))
    }

    pub fn string(&self, field: &str) -> Result<&str> {
        self.require(field)?
            .as_str()
            .ok_or_else(|| field_type(field, "a string"))
    }

    pub fn record(&self, field: &str) -> Result<&Record> {
        self.require(field)?
            .as_record()
            .ok_or_else(|| field_type(field, "a record"))
    }

    pub fn array(&self, field: &str) -> Result<&[Value]> {
        self.require(field)?
            .as_array()
            .ok_or_else(|| field_type(field, "an array"))
    }
}

fn field_type(field: &str, expected: &'static str) -> ModelError {
    ModelError::FieldType {
        field: field.to_string(),
        expected,
    }
}
