//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     pattern + handler + filters
//!     → path.rs (tokenize, drop empty segments)
//!     → router.rs (RouterBuilder grows the tree, rejects conflicts)
//!     → build() freezes it as an immutable Router
//!
//! Incoming Request path
//!     → path.rs (tokenize)
//!     → router.rs (walk the tree: exact segment, else dynamic child)
//!     → Return: matched Node or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - One tree level per path segment, no regex
//! - A segment starting with `:` matches any single value at its level;
//!   the value is not captured, handlers read it from the request path
//! - Registration errors are returned, the caller decides whether to abort

pub mod error;
pub mod node;
pub mod path;
pub mod router;

pub use error::RouteError;
pub use node::{filter, handler, Filter, Handler, Node};
pub use path::{is_dynamic, segments, split_path, DYNAMIC_MARKER};
pub use router::{Fallback, Router, RouterBuilder};
