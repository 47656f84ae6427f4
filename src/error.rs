//! Resolution errors
//!
//! A missing required attribute aborts resolution of the scope outright;
//! no partial execution config is ever returned.

use psan_contract::ContractError;

/// Errors that abort resolution of a suite scope
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A required fact is absent or falsy.
    #[error(
        "No attribute '{name}' in suite configuration! You may need to resolve \
         from your build directory or add this attribute to the site config"
    )]
    MissingAttribute { name: String },

    /// The parent chain did not reach a root within the walk bound.
    #[error("scope '{scope}' has no root within {limit} parent links (cyclic scope chain?)")]
    ScopeChain { scope: String, limit: usize },

    /// A scope id that does not belong to the tree.
    #[error("unknown scope id {0}")]
    UnknownScope(usize),

    #[error("substitution table error: {0}")]
    Contract(#[from] ContractError),
}

impl ResolveError {
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingAttribute { name: name.into() }
    }
}
