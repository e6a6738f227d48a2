//! Quad-tree node identifiers and the extent function that places them on the map.

mod node;
mod tree;

pub use node::{Ancestors, QuadNode};
pub use tree::QuadTree;

/// Ordered set of nodes, as produced by a quad-tree traversal.
pub type NodeSet = std::collections::BTreeSet<QuadNode>;
