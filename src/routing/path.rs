//! Path tokenization.
//!
//! # Responsibilities
//! - Split a URL path into `/`-delimited segment tokens
//! - Identify dynamic (wildcard) segments
//!
//! # Design Decisions
//! - Exactly one leading and one trailing `/` are stripped, nothing else
//! - Registration and lookup both walk `segments()`, so empty tokens are
//!   elided on both sides and `//` never splits a route in two

/// Prefix marking a segment as dynamic.
pub const DYNAMIC_MARKER: char = ':';

/// Split a path into its raw tokens.
///
/// Strips one leading and one trailing `/` and splits the rest on `/`.
/// Empty input yields a single empty token.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    path.split('/').collect()
}

/// Non-empty tokens of `path`, in order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    split_path(path).into_iter().filter(|s| !s.is_empty())
}

/// Returns true if the token is a dynamic segment such as `:id`.
pub fn is_dynamic(segment: &str) -> bool {
    segment.starts_with(DYNAMIC_MARKER)
}
