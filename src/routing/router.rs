//! Route registration and lookup.
//!
//! # Responsibilities
//! - Grow the routing tree from path patterns during setup
//! - Reject duplicate routes and competing dynamic names
//! - Resolve a request path to a tree node
//!
//! # Design Decisions
//! - Two types: `RouterBuilder` is the only way to mutate the tree,
//!   `Router` is frozen and shared between request workers without locks
//! - Exact segment matches win over the dynamic child
//! - At most one dynamic child per level, so the fallback scan is
//!   deterministic regardless of map order

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::http::{Request, ResponseWriter};
use crate::routing::error::RouteError;
use crate::routing::node::{Filter, Handler, Node};
use crate::routing::path::{is_dynamic, segments};
use crate::static_files::{FileServerMode, StaticFiles};

/// Secondary handler invoked when no route matches.
///
/// Receives the transport's own response sink, not the buffered one.
pub trait Fallback: Send + Sync {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request);
}

/// Mutable routing tree used during the setup phase.
pub struct RouterBuilder<C> {
    root: HashMap<String, Node<C>>,
    context: C,
    fallback: Option<Box<dyn Fallback>>,
}

impl<C: Default> Default for RouterBuilder<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> RouterBuilder<C> {
    /// Create an empty builder. `context` is passed to every handler.
    pub fn new(context: C) -> Self {
        Self {
            root: HashMap::new(),
            context,
            fallback: None,
        }
    }

    /// Register `handler` and its `filters` at `pattern`.
    ///
    /// Filters run in the given order before the handler.
    pub fn register(
        &mut self,
        pattern: &str,
        handler: Option<Handler<C>>,
        filters: Vec<Filter>,
    ) -> Result<(), RouteError> {
        let handler = handler.ok_or_else(|| RouteError::InvalidRegistration {
            pattern: pattern.to_string(),
            reason: "handler is required",
        })?;

        let mut segments = segments(pattern);
        let first = segments
            .next()
            .ok_or_else(|| RouteError::InvalidRegistration {
                pattern: pattern.to_string(),
                reason: "path has no segment",
            })?;

        let mut node = child_for(&mut self.root, first, pattern)?;
        for segment in segments {
            node = child_for(&mut node.children, segment, pattern)?;
        }

        if node.handler.is_some() {
            return Err(RouteError::RouteConflict {
                pattern: pattern.to_string(),
                reason: "a handler is already registered for this path".to_string(),
            });
        }
        node.handler = Some(handler);
        node.filters = filters;

        tracing::debug!(pattern = %pattern, "Route registered");
        Ok(())
    }

    /// Register a closure without filters.
    pub fn handle<F>(&mut self, pattern: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(&C, &mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    {
        self.register(pattern, Some(Box::new(f)), Vec::new())
    }

    /// Register a closure guarded by `filters`.
    pub fn handle_filtered<F>(
        &mut self,
        pattern: &str,
        filters: Vec<Filter>,
        f: F,
    ) -> Result<(), RouteError>
    where
        F: Fn(&C, &mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
    {
        self.register(pattern, Some(Box::new(f)), filters)
    }

    /// Delegate unmatched requests to `fallback`.
    pub fn fallback(&mut self, fallback: impl Fallback + 'static) -> &mut Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Serve files under `root` for unmatched requests.
    pub fn serve_static_at(&mut self, root: impl Into<PathBuf>, mode: FileServerMode) -> &mut Self {
        self.fallback(StaticFiles::new(root, mode))
    }

    /// Freeze the tree.
    pub fn build(self) -> Router<C> {
        Router {
            root: self.root,
            context: self.context,
            fallback: self.fallback,
        }
    }
}

/// Child of `children` for `segment`, created if missing.
fn child_for<'a, C>(
    children: &'a mut HashMap<String, Node<C>>,
    segment: &str,
    pattern: &str,
) -> Result<&'a mut Node<C>, RouteError> {
    if is_dynamic(segment) {
        if let Some(existing) = children
            .keys()
            .find(|key| is_dynamic(key) && key.as_str() != segment)
        {
            return Err(RouteError::RouteConflict {
                pattern: pattern.to_string(),
                reason: format!(
                    "dynamic segment `{}` already registered at this level as `{}`",
                    segment, existing
                ),
            });
        }
    }
    Ok(children
        .entry(segment.to_string())
        .or_insert_with(Node::new))
}

/// Immutable routing tree, shared by all request workers.
pub struct Router<C = ()> {
    pub(crate) root: HashMap<String, Node<C>>,
    pub(crate) context: C,
    pub(crate) fallback: Option<Box<dyn Fallback>>,
}

impl<C> Router<C> {
    /// Resolve `path` to a node.
    ///
    /// The node may be an intermediate one without a handler.
    pub fn lookup(&self, path: &str) -> Result<&Node<C>, RouteError> {
        let not_found = || RouteError::NotFound(path.to_string());

        let mut children = &self.root;
        let mut matched = None;
        for segment in segments(path) {
            let node = match children.get(segment) {
                Some(node) => node,
                None => children
                    .iter()
                    .find(|(key, _)| is_dynamic(key))
                    .map(|(_, node)| node)
                    .ok_or_else(not_found)?,
            };
            children = &node.children;
            matched = Some(node);
        }
        matched.ok_or_else(not_found)
    }

    /// The dispatch context passed to handlers.
    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl<C> fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("root", &self.root)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
