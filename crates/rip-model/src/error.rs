use thiserror::Error;

/// Errors raised by the model types.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Version string could not be parsed.
    #[error("invalid version '{input}': {reason}")]
    VersionParse { input: String, reason: String },

    /// Channel format byte outside the element size table.
    #[error("unknown channel format {format}")]
    UnknownFormat { format: u8 },

    /// Record does not carry the requested field.
    #[error("{type_name} has no field {field}")]
    MissingField { type_name: String, field: String },

    /// Record field holds a value of another kind.
    #[error("field {field} is not {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
    pub(crate) fn version_parse(input: &str, reason: impl Into<String>) -> Self {
        Self::VersionParse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
