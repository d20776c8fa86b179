use crate::ids::NodeId;
use crate::tree::Tree;

/// Signal returned by a downward visitor after each node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visit {
    /// Descend into the node's children.
    Continue,
    /// Leave this node's children out but keep walking its siblings.
    SkipSubtree,
    /// Stop the whole traversal.
    Abort,
}

/// Read-only pre-order visitor. `depth` is 0 at the node the walk started on.
pub trait Visitor<P> {
    fn visit(&mut self, tree: &Tree<P>, node: NodeId, depth: usize) -> Visit;
}

/// Pre-order visitor allowed to mutate the tree it walks.
///
/// Children are read after the visitor returns, so a visitor may rewrite or
/// drop the children of the node it is looking at.
pub trait VisitorMut<P> {
    fn visit(&mut self, tree: &mut Tree<P>, node: NodeId, depth: usize) -> Visit;
}

impl<P, F> Visitor<P> for F
where
    F: FnMut(&Tree<P>, NodeId, usize) -> Visit,
{
    fn visit(&mut self, tree: &Tree<P>, node: NodeId, depth: usize) -> Visit {
        self(tree, node, depth)
    }
}

impl<P, F> VisitorMut<P> for F
where
    F: FnMut(&mut Tree<P>, NodeId, usize) -> Visit,
{
    fn visit(&mut self, tree: &mut Tree<P>, node: NodeId, depth: usize) -> Visit {
        self(tree, node, depth)
    }
}
