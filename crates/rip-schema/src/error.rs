#![deny(unsafe_code)]

use std::path::PathBuf;

use rip_binary::BinaryError;
use rip_model::Version;

/// Errors raised while loading and compiling a schema catalog.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema table {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate type `{type_name}`")]
    DuplicateType { type_name: String },

    #[error("class id {class_id} is declared by both `{first}` and `{second}`")]
    DuplicateClassId {
        class_id: i32,
        first: String,
        second: String,
    },

    #[error("duplicate field `{field}` in `{type_name}`")]
    DuplicateField { type_name: String, field: String },

    #[error("`{type_name}` extends unknown base `{base}`")]
    UnknownBase { type_name: String, base: String },

    #[error("base chain of `{type_name}` is cyclic")]
    BaseCycle { type_name: String },

    #[error("record `{type_name}` contains itself through `{field}`")]
    RecordCycle { type_name: String, field: String },

    #[error("field `{field}` of `{type_name}` refers to unknown record type `{record}`")]
    UnknownRecordType {
        type_name: String,
        field: String,
        record: String,
    },

    #[error("`{type_name}` refers to undeclared field `{field}`")]
    UnknownField { type_name: String, field: String },

    #[error("`{type_name}` refers to unknown predicate `{predicate}`")]
    UnknownPredicate { type_name: String, predicate: String },

    #[error("invalid kind `{kind}` for field `{field}` of `{type_name}`")]
    InvalidKind {
        type_name: String,
        field: String,
        kind: String,
    },

    #[error("invalid layout step #{index} in `{type_name}`: {message}")]
    InvalidStep {
        type_name: String,
        index: usize,
        message: String,
    },

    #[error("invalid default for field `{field}` of `{type_name}`: {message}")]
    InvalidDefault {
        type_name: String,
        field: String,
        message: String,
    },

    #[error("invalid alignment {alignment} in `{type_name}`")]
    InvalidAlignment { type_name: String, alignment: usize },
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn step(type_name: &str, index: usize, message: impl Into<String>) -> Self {
        Self::InvalidStep {
            type_name: type_name.to_string(),
            index,
            message: message.into(),
        }
    }

    pub(crate) fn default(type_name: &str, field: &str, message: impl Into<String>) -> Self {
        Self::InvalidDefault {
            type_name: type_name.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised while decoding, encoding or exporting an object.
///
/// Variants produced while walking a buffer carry the type being processed,
/// the buffer's version and the byte offset at which the failure happened.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(
        "buffer underrun decoding `{type_name}` ({version}) at offset {offset}: needed {needed} bytes, {available} available"
    )]
    BufferUnderrun {
        type_name: String,
        version: Version,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("`{type_name}` has no layout for version {version}")]
    UnsupportedVersion {
        type_name: String,
        version: Version,
        offset: usize,
    },

    #[error("unknown type `{type_name}`")]
    UnknownType { type_name: String },

    #[error("no type is registered for class id {class_id}")]
    UnknownClassId { class_id: i32 },

    #[error("malformed `{type_name}` ({version}) at offset {offset}: {source}")]
    Malformed {
        type_name: String,
        version: Version,
        offset: usize,
        #[source]
        source: BinaryError,
    },

    #[error(
        "field `{field}` of `{type_name}` ({version}) expects {expected}, found {found} (offset {offset})"
    )]
    ValueMismatch {
        type_name: String,
        field: String,
        version: Version,
        offset: usize,
        expected: String,
        found: &'static str,
    },

    #[error(
        "value {value} of field `{field}` in `{type_name}` ({version}) does not fit {wire} (offset {offset})"
    )]
    ValueOutOfRange {
        type_name: String,
        field: String,
        version: Version,
        offset: usize,
        value: i64,
        wire: String,
    },

    #[error(
        "array in `{type_name}` ({version}) at offset {offset} claims {count} zero-width items with {remaining} bytes left"
    )]
    ImplausibleCount {
        type_name: String,
        version: Version,
        offset: usize,
        count: usize,
        remaining: usize,
    },

    #[error(
        "`{type_name}` ({version}) consumed {consumed} bytes, but the object is {expected} bytes long"
    )]
    LengthMismatch {
        type_name: String,
        version: Version,
        offset: usize,
        expected: usize,
        consumed: usize,
    },
}

impl EngineError {
    /// Wrap a cursor failure with the type and version being processed.
    pub(crate) fn cursor(
        source: BinaryError,
        type_name: &str,
        version: Version,
        position: usize,
    ) -> Self {
        match source {
            BinaryError::BufferUnderrun {
                offset,
                needed,
                available,
            } => Self::BufferUnderrun {
                type_name: type_name.to_string(),
                version,
                offset,
                needed,
                available,
            },
            other => Self::Malformed {
                type_name: type_name.to_string(),
                version,
                offset: other.offset().unwrap_or(position),
                source: other,
            },
        }
    }

    /// Type the error refers to, when it names one.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::BufferUnderrun { type_name, .. }
            | Self::UnsupportedVersion { type_name, .. }
            | Self::UnknownType { type_name }
            | Self::Malformed { type_name, .. }
            | Self::ValueMismatch { type_name, .. }
            | Self::ValueOutOfRange { type_name, .. }
            | Self::ImplausibleCount { type_name, .. }
            | Self::LengthMismatch { type_name, .. } => Some(type_name),
            Self::UnknownClassId { .. } => None,
        }
    }

    /// Byte offset the error refers to, when it has one.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::BufferUnderrun { offset, .. }
            | Self::UnsupportedVersion { offset, .. }
            | Self::Malformed { offset, .. }
            | Self::ValueMismatch { offset, .. }
            | Self::ValueOutOfRange { offset, .. }
            | Self::ImplausibleCount { offset, .. }
            | Self::LengthMismatch { offset, .. } => Some(*offset),
            Self::UnknownType { .. } | Self::UnknownClassId { .. } => None,
        }
    }
}

/// Result type alias for catalog operations.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
