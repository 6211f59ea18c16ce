//! Error types for export.

use rip_schema::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("`{type_name}` has no class id and cannot be exported as a document")]
    MissingClassId { type_name: String },

    #[error("field `{field}` of `{type_name}` is declared {expected}, but the record holds {found}")]
    ValueMismatch {
        type_name: String,
        field: String,
        expected: String,
        found: &'static str,
    },
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
