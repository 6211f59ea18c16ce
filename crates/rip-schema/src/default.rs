//! Default rules for fields absent at a given version.
//!
//! [`default_value`] is the single place that decides what an absent field
//! holds. Decode fills records with it, encode writes it when a record lacks
//! a field, and export renders it for fields the source version never wrote.

use rip_model::{PPtr, Record, Value, Version};
use serde::Deserialize;

use crate::catalog::SchemaCatalog;
use crate::kind::FieldKind;
use crate::schema::FieldDecl;

/// Compiled default rule of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultRule {
    /// Zero value of the field's kind.
    Zero,
    /// Fixed value.
    Literal(Value),
    /// Value picked by the integer value of an earlier field.
    Derived {
        field: String,
        cases: Vec<(i64, Value)>,
        otherwise: Value,
    },
}

/// Default rule as written in a schema table.
///
/// `default = 1.0` is a literal; a table with `field`, `cases` and
/// `otherwise` keys is a derived rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawDefault {
    Derived(RawDerived),
    Literal(toml::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawDerived {
    pub field: String,
    #[serde(default)]
    pub cases: Vec<RawCase>,
    pub otherwise: toml::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawCase {
    pub when: i64,
    pub value: toml::Value,
}

/// Convert a literal from a schema table into a value of `kind`.
///
/// Record literals are not supported; record fields default to their zero
/// record.
pub(crate) fn literal_value(kind: &FieldKind, literal: &toml::Value) -> Result<Value, String> {
    let mismatch = || format!("`{literal}` is not a valid {kind} literal");
    match (kind, literal) {
        (FieldKind::Bool, toml::Value::Boolean(value)) => Ok(Value::Bool(*value)),
        (FieldKind::Bool, toml::Value::Integer(value @ (0 | 1))) => Ok(Value::Bool(*value == 1)),
        (kind, toml::Value::Integer(value)) if kind.is_integer() => {
            if kind.fits(*value) {
                Ok(Value::Int(*value))
            } else {
                Err(format!("{value} does not fit {kind}"))
            }
        }
        (FieldKind::F32, toml::Value::Float(value)) => Ok(Value::Float(*value as f32)),
        (FieldKind::F32, toml::Value::Integer(value)) => Ok(Value::Float(*value as f32)),
        (FieldKind::String, toml::Value::String(value)) => Ok(Value::String(value.clone())),
        (FieldKind::Bytes, toml::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_integer()
                    .and_then(|byte| u8::try_from(byte).ok())
                    .ok_or_else(mismatch)
            })
            .collect::<Result<Vec<u8>, String>>()
            .map(Value::Bytes),
        (FieldKind::Array(inner), toml::Value::Array(items)) => items
            .iter()
            .map(|item| literal_value(inner, item))
            .collect::<Result<Vec<Value>, String>>()
            .map(Value::Array),
        _ => Err(mismatch()),
    }
}

/// Zero value of a kind at `version`.
///
/// Record kinds produce a record whose fields all hold their own defaults.
#[must_use]
pub fn zero_value(catalog: &SchemaCatalog, kind: &FieldKind, version: Version) -> Value {
    match kind {
        FieldKind::Bool => Value::Bool(false),
        FieldKind::U8
        | FieldKind::I16
        | FieldKind::U16
        | FieldKind::I32
        | FieldKind::U32
        | FieldKind::I64
        | FieldKind::U64 => Value::Int(0),
        FieldKind::F32 => Value::Float(0.0),
        FieldKind::String => Value::String(String::new()),
        FieldKind::Bytes => Value::Bytes(Vec::new()),
        FieldKind::PPtr => Value::PPtr(PPtr::NULL),
        FieldKind::Array(_) => Value::Array(Vec::new()),
        FieldKind::Record(name) => Value::Record(default_record(catalog, name, version)),
    }
}

/// Record of type `type_name` with every field set to its default.
#[must_use]
pub fn default_record(catalog: &SchemaCatalog, type_name: &str, version: Version) -> Record {
    let mut record = Record::new(type_name);
    if let Some(schema) = catalog.get(type_name) {
        for field in schema.fields() {
            let value = default_value(catalog, field, version, &record);
            record.set(field.name(), value);
        }
    }
    record
}

/// Value an absent field holds at `version`.
///
/// Derived rules look at fields of `record` that precede `field`; the catalog
/// guarantees such a field exists and is an integer.
#[must_use]
pub fn default_value(
    catalog: &SchemaCatalog,
    field: &FieldDecl,
    version: Version,
    record: &Record,
) -> Value {
    match field.default() {
        DefaultRule::Zero => zero_value(catalog, field.kind(), version),
        DefaultRule::Literal(value) => value.clone(),
        DefaultRule::Derived {
            field: source,
            cases,
            otherwise,
        } => {
            let key = record.get(source).and_then(Value::as_int);
            key.and_then(|key| {
                cases
                    .iter()
                    .find(|(when, _)| *when == key)
                    .map(|(_, value)| value.clone())
            })
            .unwrap_or_else(|| otherwise.clone())
        }
    }
}
