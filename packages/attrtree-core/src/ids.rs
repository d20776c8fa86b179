#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle of a node inside one [`Tree`](crate::tree::Tree).
///
/// Ids are only meaningful for the tree that issued them; a subtree moved to
/// another tree is renumbered.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub u64);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}
