//! Error types for value-level failures.
//!
//! These errors are raised by identifier rendering, endpoint construction, and
//! attribute validation. Graph-level errors wrap [`CoreError`] transparently.

use thiserror::Error;

/// Errors detectable without knowledge of the enclosing graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Markup content whose angle brackets do not balance.
    ///
    /// Markup is opaque until it is emitted, so this is only reported while
    /// producing text.
    #[error("Malformed markup <{markup}>: unbalanced angle brackets")]
    MalformedMarkup { markup: String },

    /// A compass point outside `n ne e se s sw w nw c _`.
    #[error("Invalid compass point: {0:?}")]
    InvalidCompassPoint(String),

    /// The attribute name is reserved in this position.
    #[error("Attribute {0:?} is reserved")]
    ReservedAttribute(String),
}
