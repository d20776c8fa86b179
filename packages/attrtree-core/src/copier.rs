//! Deep copies of (sub)trees with optional pruning and per-node rewriting.

use crate::ids::NodeId;
use crate::tree::Tree;

type Filter<'a, P> = Box<dyn Fn(&Tree<P>, NodeId) -> bool + 'a>;
type Processor<'a, P> = Box<dyn Fn(Tree<P>) -> Tree<P> + 'a>;

/// Copies a node and everything below it into a new, disjoint tree.
///
/// Leaves keep their payload; inner nodes get `P::default()`. A filter that
/// rejects a node drops its whole subtree. The processor sees every freshly
/// built copy, bottom-up, and may return a modified or replacement tree.
pub struct TreeCopier<'a, P> {
    filter: Option<Filter<'a, P>>,
    processor: Option<Processor<'a, P>>,
}

impl<'a, P> Default for TreeCopier<'a, P> {
    fn default() -> Self {
        Self {
            filter: None,
            processor: None,
        }
    }
}

impl<'a, P: Clone + Default> TreeCopier<'a, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Fn(&Tree<P>, NodeId) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn with_processor(mut self, processor: impl Fn(Tree<P>) -> Tree<P> + 'a) -> Self {
        self.processor = Some(Box::new(processor));
        self
    }

    /// `None` when `node` is unknown or rejected by the filter.
    pub fn copy(&self, tree: &Tree<P>, node: NodeId) -> Option<Tree<P>> {
        if !tree.contains(node) {
            return None;
        }
        if let Some(filter) = &self.filter {
            if !filter(tree, node) {
                return None;
            }
        }

        let name = tree.name(node).map(str::to_string);
        let payload = if tree.is_leaf(node) {
            tree.payload(node).cloned().unwrap_or_default()
        } else {
            P::default()
        };
        let mut copy = Tree::new(name, payload);
        let root = copy.root();
        for &child in tree.children(node) {
            if let Some(child_copy) = self.copy(tree, child) {
                copy.graft(root, child_copy).ok()?;
            }
        }

        Some(match &self.processor {
            Some(processor) => processor(copy),
            None => copy,
        })
    }
}

/// Unfiltered deep copy of `node` and its subtree.
pub fn copy_tree<P: Clone + Default>(tree: &Tree<P>, node: NodeId) -> Tree<P> {
    TreeCopier::new()
        .copy(tree, node)
        .unwrap_or_else(|| Tree::new(tree.name(node).map(str::to_string), P::default()))
}
