//! DOM operation errors

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("Node not found")]
    NotFound,

    /// Hierarchy error (e.g., inserting an ancestor into its own subtree)
    #[error("Hierarchy request error")]
    HierarchyRequest,

    /// Invalid node type for the operation
    #[error("Invalid node type")]
    InvalidNodeType,

    /// Node is not a child of the given parent
    #[error("Node is not a child")]
    NotAChild,

    /// Selector could not be parsed
    #[error("Invalid selector '{selector}': {message}")]
    Syntax { selector: String, message: String },
}

impl DomError {
    pub(crate) fn syntax(selector: &str, message: impl Into<String>) -> Self {
        Self::Syntax {
            selector: selector.to_string(),
            message: message.into(),
        }
    }
}
