//! Engine errors

use footnote_dom::DomError;

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, FixedFootnotesError>;

/// Engine error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedFootnotesError {
    #[error("No element matches fixed container location '{0}'")]
    HostNotFound(String),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
