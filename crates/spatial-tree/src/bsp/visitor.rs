//! Visitor pattern for BSP tree traversal.
//!
//! Visitors allow custom processing of nodes during tree traversal
//! without coupling traversal logic to specific queries.

use super::node::BspNode;

/// Visitor for processing nodes during BSP tree traversal.
///
/// Implement this trait to run a query over the tree, e.g. frustum culling
/// or ray picking against the primitives stored at each node.
pub trait BspVisitor<P> {
    /// Called once for every visited node.
    fn visit(&mut self, node: &BspNode<P>);
}

/// A simple visitor that collects the primitives of every visited node.
#[derive(Debug)]
pub struct CollectingVisitor<P> {
    collected: Vec<P>,
}

impl<P> Default for CollectingVisitor<P> {
    fn default() -> Self {
        Self {
            collected: Vec::new(),
        }
    }
}

impl<P> CollectingVisitor<P> {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected primitives.
    pub fn into_primitives(self) -> Vec<P> {
        self.collected
    }

    /// Returns a reference to the collected primitives.
    pub fn primitives(&self) -> &[P] {
        &self.collected
    }
}

impl<P: Clone> BspVisitor<P> for CollectingVisitor<P> {
    fn visit(&mut self, node: &BspNode<P>) {
        self.collected.extend(node.primitives().iter().cloned());
    }
}

/// A visitor that calls a closure for each node.
pub struct FnVisitor<F> {
    func: F,
}

impl<F> FnVisitor<F> {
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<P, F> BspVisitor<P> for FnVisitor<F>
where
    F: FnMut(&BspNode<P>),
{
    fn visit(&mut self, node: &BspNode<P>) {
        (self.func)(node);
    }
}
