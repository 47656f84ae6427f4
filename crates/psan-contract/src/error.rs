//! Error types for the suite contract.

/// Errors raised while building or reading an execution configuration.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// A template was registered twice without an explicit override.
    #[error("duplicate substitution template {0:?}")]
    DuplicateTemplate(String),

    /// A serialized config carries an unexpected schema identifier.
    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
