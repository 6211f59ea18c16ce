//! Error types for batch loading.

use rip_schema::EngineError;

/// Why one object of a batch was not loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("path id {path_id} appears more than once in the file")]
    DuplicatePathId { path_id: i64 },
}

impl LoadError {
    /// The engine error behind this failure, if any.
    #[must_use]
    pub const fn engine(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(error) => Some(error),
            Self::DuplicatePathId { .. } => None,
        }
    }
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;
