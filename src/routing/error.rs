//! Routing errors.

/// Errors raised while building or querying the routing tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Missing handler or a pattern with no usable segment.
    #[error("invalid registration for `{pattern}`: {reason}")]
    InvalidRegistration {
        pattern: String,
        reason: &'static str,
    },

    /// Duplicate route, or a second dynamic name at the same level.
    #[error("route conflict for `{pattern}`: {reason}")]
    RouteConflict { pattern: String, reason: String },

    /// No node matches the request path.
    #[error("no route matches `{0}`")]
    NotFound(String),
}
