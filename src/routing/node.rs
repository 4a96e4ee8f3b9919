//! Routing tree node.

use std::collections::HashMap;
use std::fmt;

use crate::http::{Request, ResponseWriter};

/// Endpoint callback. Receives the router's dispatch context.
pub type Handler<C> = Box<dyn Fn(&C, &mut dyn ResponseWriter, &Request) + Send + Sync>;

/// Pre-handler guard.
///
/// Returning `false` stops the chain. The filter is then responsible for
/// the status and body of the response.
pub type Filter = Box<dyn Fn(&mut dyn ResponseWriter, &Request) -> bool + Send + Sync>;

/// Box a closure as a [`Handler`].
pub fn handler<C, F>(f: F) -> Handler<C>
where
    F: Fn(&C, &mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    Box::new(f)
}

/// Box a closure as a [`Filter`].
pub fn filter<F>(f: F) -> Filter
where
    F: Fn(&mut dyn ResponseWriter, &Request) -> bool + Send + Sync + 'static,
{
    Box::new(f)
}

/// One path segment of the routing tree.
///
/// Only the terminal node of a registered pattern carries a handler;
/// intermediate nodes exist purely to hold children.
pub struct Node<C> {
    pub(crate) handler: Option<Handler<C>>,
    pub(crate) filters: Vec<Filter>,
    pub(crate) children: HashMap<String, Node<C>>,
}

impl<C> Node<C> {
    pub(crate) fn new() -> Self {
        Self {
            handler: None,
            filters: Vec::new(),
            children: HashMap::new(),
        }
    }

    pub fn handler(&self) -> Option<&Handler<C>> {
        self.handler.as_ref()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn children(&self) -> &HashMap<String, Node<C>> {
        &self.children
    }

    pub fn is_endpoint(&self) -> bool {
        self.handler.is_some()
    }
}

impl<C> fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("endpoint", &self.is_endpoint())
            .field("filters", &self.filters.len())
            .field("children", &self.children)
            .finish()
    }
}
