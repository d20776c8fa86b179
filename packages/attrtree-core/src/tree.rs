use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::path::Path;
use crate::traits::{Visit, Visitor, VisitorMut};

#[derive(Clone, Debug)]
struct NodeState<P> {
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    payload: P,
}

impl<P> NodeState<P> {
    fn new(name: Option<String>, parent: Option<NodeId>, payload: P) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            payload,
        }
    }
}

/// Named, ordered tree whose nodes each carry a payload `P`.
///
/// Nodes live in an id-addressed map; children are owned through the
/// parent's child list and parents are plain back-references. Child names are
/// unique by convention only: duplicates are kept in insertion order and
/// lookups return the first match.
///
/// Cloning a tree yields a fully disjoint copy.
#[derive(Clone, Debug)]
pub struct Tree<P> {
    nodes: HashMap<NodeId, NodeState<P>>,
    next_id: u64,
}

impl<P: Default> Default for Tree<P> {
    fn default() -> Self {
        Self::new(None, P::default())
    }
}

impl<P> Tree<P> {
    pub fn new(root_name: Option<String>, payload: P) -> Self {
        let mut tree = Self::empty();
        let root = tree.allocate();
        tree.nodes
            .insert(root, NodeState::new(root_name, None, payload));
        tree
    }

    pub fn named(root_name: impl Into<String>) -> Self
    where
        P: Default,
    {
        Self::new(Some(root_name.into()), P::default())
    }

    fn empty() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
        }
    }

    fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn state(&self, node: NodeId) -> Result<&NodeState<P>> {
        self.nodes
            .get(&node)
            .ok_or_else(|| Error::InvalidOperation(format!("unknown node {}", node.0)))
    }

    fn state_mut(&mut self, node: NodeId) -> Result<&mut NodeState<P>> {
        self.nodes
            .get_mut(&node)
            .ok_or_else(|| Error::InvalidOperation(format!("unknown node {}", node.0)))
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|n| n.name.as_deref())
    }

    pub fn rename(&mut self, node: NodeId, name: impl Into<String>) -> Result<()> {
        self.state_mut(node)?.name = Some(name.into());
        Ok(())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.children(node).is_empty()
    }

    pub fn payload(&self, node: NodeId) -> Option<&P> {
        self.nodes.get(&node).map(|n| &n.payload)
    }

    pub fn payload_mut(&mut self, node: NodeId) -> Option<&mut P> {
        self.nodes.get_mut(&node).map(|n| &mut n.payload)
    }

    /// Names from the root down to `node`. The root's path is a single
    /// segment holding its own name (empty when unnamed).
    pub fn path(&self, node: NodeId) -> Path {
        let mut names = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(state) = self.nodes.get(&id) else {
                break;
            };
            names.push(state.name.clone().unwrap_or_default());
            current = state.parent;
        }
        names.reverse();
        Path::from_segments(names)
    }

    /// Path from the ancestor whose absolute path equals `ancestor_path`
    /// down to `node`, excluding the ancestor's own name. `None` when no
    /// ancestor (or `node` itself) has that path.
    pub fn relative_path(&self, node: NodeId, ancestor_path: &Path) -> Option<Path> {
        let mut names = Vec::new();
        let mut current = node;
        loop {
            if &self.path(current) == ancestor_path {
                names.reverse();
                return Some(Path::from_segments(names));
            }
            names.push(self.name(current).unwrap_or_default().to_string());
            current = self.parent(current)?;
        }
    }

    /// Path from the ancestor node `ancestor` down to `node`.
    pub fn path_from(&self, ancestor: NodeId, node: NodeId) -> Option<Path> {
        let mut names = Vec::new();
        let mut current = node;
        while current != ancestor {
            names.push(self.name(current).unwrap_or_default().to_string());
            current = self.parent(current)?;
        }
        names.reverse();
        Some(Path::from_segments(names))
    }

    pub fn child_by_name(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|child| self.name(*child) == Some(name))
    }

    /// Follow `path` from `start` through named children. The empty path
    /// resolves to `start` itself.
    pub fn resolve(&self, start: NodeId, path: &Path) -> Option<NodeId> {
        if !self.contains(start) {
            return None;
        }
        path.segments()
            .iter()
            .try_fold(start, |node, segment| self.child_by_name(node, segment))
    }

    /// Create a named child at the end of `parent`'s child list.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        payload: P,
    ) -> Result<NodeId> {
        self.state(parent)?;
        let id = self.allocate();
        self.nodes
            .insert(id, NodeState::new(Some(name.into()), Some(parent), payload));
        self.state_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Reparent each node under `parent`, appending in iteration order.
    pub fn add_children(
        &mut self,
        parent: NodeId,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Result<()> {
        for node in nodes {
            self.move_node(node, parent)?;
        }
        Ok(())
    }

    /// Move `node` (with its subtree) to the end of `new_parent`'s children.
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId) -> Result<()> {
        if node == NodeId::ROOT {
            return Err(Error::InvalidOperation("cannot move the root".into()));
        }
        self.state(node)?;
        self.state(new_parent)?;
        if self.introduces_cycle(node, new_parent) {
            return Err(Error::InvalidOperation(
                "cannot move a node below itself".into(),
            ));
        }
        self.unlink(node);
        self.state_mut(new_parent)?.children.push(node);
        self.state_mut(node)?.parent = Some(new_parent);
        Ok(())
    }

    /// Move every node of `subtree` into this tree as the last child of
    /// `parent`. Returns the new id of the subtree's root.
    pub fn graft(&mut self, parent: NodeId, subtree: Tree<P>) -> Result<NodeId> {
        self.state(parent)?;
        let mut source = subtree.nodes;
        let id = transplant(&mut source, NodeId::ROOT, self, Some(parent))
            .ok_or_else(|| Error::InvalidOperation("grafted tree has no root".into()))?;
        self.state_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Remove `node` and its subtree, returning them as a standalone tree.
    pub fn detach(&mut self, node: NodeId) -> Result<Tree<P>> {
        if node == NodeId::ROOT {
            return Err(Error::InvalidOperation("cannot detach the root".into()));
        }
        self.state(node)?;
        self.unlink(node);
        let mut detached = Tree::empty();
        transplant(&mut self.nodes, node, &mut detached, None);
        Ok(detached)
    }

    /// Remove every child of `parent` named `name`; returns how many went.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> usize {
        let doomed: Vec<NodeId> = self
            .children(parent)
            .iter()
            .copied()
            .filter(|child| self.name(*child) == Some(name))
            .collect();
        for child in &doomed {
            self.unlink(*child);
            for id in self.descendants(*child) {
                self.nodes.remove(&id);
            }
        }
        doomed.len()
    }

    /// Drop the children sharing the subtree root's name, then graft it.
    pub fn replace_child(&mut self, parent: NodeId, subtree: Tree<P>) -> Result<NodeId> {
        if let Some(name) = subtree.name(NodeId::ROOT).map(str::to_string) {
            self.remove_child(parent, &name);
        }
        self.graft(parent, subtree)
    }

    /// `start` and all nodes below it, in pre-order.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(state) = self.nodes.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(state.children.iter().rev().copied());
        }
        out
    }

    /// Pre-order walk from `start`. Returns `Visit::Abort` when the visitor
    /// stopped the walk, `Visit::Continue` otherwise.
    pub fn visit<V>(&self, start: NodeId, visitor: &mut V) -> Visit
    where
        V: Visitor<P> + ?Sized,
    {
        let mut stack = vec![(start, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if !self.contains(node) {
                continue;
            }
            match visitor.visit(self, node, depth) {
                Visit::Continue => {
                    stack.extend(self.children(node).iter().rev().map(|c| (*c, depth + 1)));
                }
                Visit::SkipSubtree => {}
                Visit::Abort => return Visit::Abort,
            }
        }
        Visit::Continue
    }

    /// Like [`Tree::visit`], handing the visitor mutable access.
    pub fn visit_mut<V>(&mut self, start: NodeId, visitor: &mut V) -> Visit
    where
        V: VisitorMut<P> + ?Sized,
    {
        let mut stack = vec![(start, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if !self.contains(node) {
                continue;
            }
            match visitor.visit(self, node, depth) {
                Visit::Continue => {
                    let children: Vec<(NodeId, usize)> = self
                        .children(node)
                        .iter()
                        .rev()
                        .map(|c| (*c, depth + 1))
                        .collect();
                    stack.extend(children);
                }
                Visit::SkipSubtree => {}
                Visit::Abort => return Visit::Abort,
            }
        }
        Visit::Continue
    }

    /// Walk from `start` up to the root. The index starts at 0 and drops by
    /// one per level.
    pub fn visit_upward<F>(&self, start: NodeId, mut visitor: F)
    where
        F: FnMut(&Tree<P>, NodeId, isize),
    {
        let mut index = 0isize;
        let mut current = self.contains(start).then_some(start);
        while let Some(node) = current {
            visitor(self, node, index);
            index -= 1;
            current = self.parent(node);
        }
    }

    /// Check parent/child consistency and acyclicity. Intended for tests and
    /// debugging.
    pub fn validate_invariants(&self) -> Result<()> {
        for (id, state) in &self.nodes {
            let mut seen = HashSet::new();
            for child in &state.children {
                if !seen.insert(child) {
                    return Err(Error::InvalidOperation("duplicate child entry".into()));
                }
                match self.nodes.get(child) {
                    Some(child_state) if child_state.parent == Some(*id) => {}
                    Some(_) => {
                        return Err(Error::InvalidOperation("child parent mismatch".into()))
                    }
                    None => {
                        return Err(Error::InvalidOperation(
                            "child not present in nodes".into(),
                        ))
                    }
                }
            }
            if let Some(parent) = state.parent {
                let listed = self
                    .nodes
                    .get(&parent)
                    .map(|p| p.children.contains(id))
                    .unwrap_or(false);
                if !listed {
                    return Err(Error::InvalidOperation("orphaned node".into()));
                }
            }
        }

        for node in self.nodes.keys() {
            if self.has_cycle_from(*node) {
                return Err(Error::InvalidOperation("cycle detected".into()));
            }
        }
        Ok(())
    }

    fn has_cycle_from(&self, start: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(start);
        while let Some(n) = current {
            if !visited.insert(n) {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    fn introduces_cycle(&self, node: NodeId, potential_parent: NodeId) -> bool {
        let mut current = Some(potential_parent);
        while let Some(n) = current {
            if n == node {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| c != &node);
            }
        }
        if let Some(state) = self.nodes.get_mut(&node) {
            state.parent = None;
        }
    }
}

/// Move the subtree rooted at `id` out of `from` into `to`, renumbering it.
/// With no `parent` the subtree becomes `to`'s root, so `to` must be empty.
fn transplant<P>(
    from: &mut HashMap<NodeId, NodeState<P>>,
    id: NodeId,
    to: &mut Tree<P>,
    parent: Option<NodeId>,
) -> Option<NodeId> {
    let state = from.remove(&id)?;
    let new_id = to.allocate();
    to.nodes
        .insert(new_id, NodeState::new(state.name, parent, state.payload));
    let mut children = Vec::with_capacity(state.children.len());
    for child in state.children {
        if let Some(moved) = transplant(from, child, to, Some(new_id)) {
            children.push(moved);
        }
    }
    if let Some(moved) = to.nodes.get_mut(&new_id) {
        moved.children = children;
    }
    Some(new_id)
}
