//! The quad tree's extent function.

use glam::DVec2;
use quadtile_coords::Mbr;

use crate::QuadNode;

/// A quad tree laid over a rectangle of some local coordinate system.
///
/// The tree only derives keys and extents; which nodes are visible is decided
/// by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadTree {
    mbr: Mbr,
    min_level: u8,
    max_level: u8,
}

impl QuadTree {
    /// Create a tree covering `mbr`, loading nodes between `min_level` and
    /// `max_level` inclusive.
    ///
    /// # Panics
    ///
    /// Panics if `mbr` has no area or the level range is empty or too deep.
    #[must_use]
    pub fn new(mbr: Mbr, min_level: u8, max_level: u8) -> Self {
        assert!(!mbr.is_degenerate(), "quad tree extent has no area: {mbr:?}");
        assert!(
            min_level <= max_level && max_level <= QuadNode::MAX_LEVEL,
            "invalid level range {min_level}..={max_level}"
        );
        Self {
            mbr,
            min_level,
            max_level,
        }
    }

    /// Extent covered by the root node.
    #[must_use]
    pub fn mbr(&self) -> Mbr {
        self.mbr
    }

    /// Shallowest loadable level.
    #[must_use]
    pub fn min_level(&self) -> u8 {
        self.min_level
    }

    /// Deepest loadable level.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    /// True if `node` sits inside this tree's level range and grid.
    #[must_use]
    pub fn is_valid_node(&self, node: &QuadNode) -> bool {
        node.level >= self.min_level && node.level <= self.max_level && node.is_well_formed()
    }

    /// Extent of a node in the tree's local coordinate system.
    #[must_use]
    pub fn generate_mbr_for_node(&self, node: &QuadNode) -> Mbr {
        let cells = f64::from(QuadNode::grid_size(node.level));
        let size = self.mbr.span() / cells;
        let ll = self.mbr.ll + size * DVec2::new(f64::from(node.x), f64::from(node.y));
        Mbr { ll, ur: ll + size }
    }

    /// The node at `level` containing `p`, or `None` outside the tree.
    #[must_use]
    pub fn node_at(&self, p: DVec2, level: u8) -> Option<QuadNode> {
        if !self.mbr.contains(p) || level > QuadNode::MAX_LEVEL {
            return None;
        }
        let max_index = QuadNode::grid_size(level) - 1;
        let rel = (p - self.mbr.ll) / self.mbr.span() * f64::from(QuadNode::grid_size(level));
        let x = (rel.x as u32).min(max_index);
        let y = (rel.y as u32).min(max_index);
        Some(QuadNode::new(level, x, y))
    }

    /// All nodes at `level` whose extent overlaps `region`.
    #[must_use]
    pub fn nodes_in(&self, region: &Mbr, level: u8) -> Vec<QuadNode> {
        let Some(clipped) = self.mbr.intersection(region) else {
            return Vec::new();
        };
        let (Some(lo), Some(hi)) = (self.node_at(clipped.ll, level), self.node_at(clipped.ur, level)) else {
            return Vec::new();
        };
        let mut nodes = Vec::new();
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                let node = QuadNode::new(level, x, y);
                if self.generate_mbr_for_node(&node).overlaps(region) {
                    nodes.push(node);
                }
            }
        }
        nodes
    }
}
