//! Unique tile identifier within a quad tree.

use serde::{Deserialize, Serialize};

/// Identifies one node of the quad tree.
///
/// - `level`: depth in the tree. Level 0 is the root covering the whole
///   tree extent; each level doubles the resolution on both axes.
/// - `x`, `y`: grid coordinates at this level, `0 <= x, y < 2^level`.
///   `y = 0` is the bottom row (southernmost on a globe).
///
/// Nodes order by level, then x, then y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuadNode {
    /// Depth in the tree (0 = root).
    pub level: u8,
    /// Column at this level.
    pub x: u32,
    /// Row at this level.
    pub y: u32,
}

impl QuadNode {
    /// Deepest level whose grid still fits in `u32` coordinates.
    pub const MAX_LEVEL: u8 = 31;

    /// The root node.
    pub const ROOT: QuadNode = QuadNode {
        level: 0,
        x: 0,
        y: 0,
    };

    /// Number of nodes along one axis at the given level.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`Self::MAX_LEVEL`].
    #[must_use]
    pub fn grid_size(level: u8) -> u32 {
        assert!(
            level <= Self::MAX_LEVEL,
            "level {level} exceeds MAX_LEVEL {}",
            Self::MAX_LEVEL
        );
        1u32 << level
    }

    /// Construct a node, validating `x` and `y` against the level's grid.
    ///
    /// # Panics
    ///
    /// Panics if the level is too deep or `x`/`y` are out of range.
    #[must_use]
    pub fn new(level: u8, x: u32, y: u32) -> Self {
        let size = Self::grid_size(level);
        assert!(x < size, "x={x} out of range for level {level} (max {size})");
        assert!(y < size, "y={y} out of range for level {level} (max {size})");
        Self { level, x, y }
    }

    /// Construct a node, returning `None` instead of panicking when out of range.
    #[must_use]
    pub fn try_new(level: u8, x: u32, y: u32) -> Option<Self> {
        let node = Self { level, x, y };
        node.is_well_formed().then_some(node)
    }

    /// True if `x`/`y` fit the grid of this node's level.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.level <= Self::MAX_LEVEL && {
            let size = 1u64 << self.level;
            u64::from(self.x) < size && u64::from(self.y) < size
        }
    }

    /// The node one level up that contains this one. `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<QuadNode> {
        if self.level == 0 {
            return None;
        }
        Some(QuadNode {
            level: self.level - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// The four nodes one level down, ordered
    /// \[(2x, 2y), (2x+1, 2y), (2x, 2y+1), (2x+1, 2y+1)\].
    ///
    /// Returns `None` at [`Self::MAX_LEVEL`].
    #[must_use]
    pub fn children(&self) -> Option<[QuadNode; 4]> {
        if self.level >= Self::MAX_LEVEL {
            return None;
        }
        let level = self.level + 1;
        let (cx, cy) = (self.x * 2, self.y * 2);
        Some([
            QuadNode::new(level, cx, cy),
            QuadNode::new(level, cx + 1, cy),
            QuadNode::new(level, cx, cy + 1),
            QuadNode::new(level, cx + 1, cy + 1),
        ])
    }

    /// Iterate over the strict ancestors, nearest first, ending at the root.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: self.parent(),
        }
    }

    /// The ancestor (or self) at `level`. `None` if `level` is deeper than this node.
    #[must_use]
    pub fn ancestor_at(&self, level: u8) -> Option<QuadNode> {
        let shift = self.level.checked_sub(level)?;
        Some(QuadNode {
            level,
            x: self.x >> shift,
            y: self.y >> shift,
        })
    }

    /// True if `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &QuadNode) -> bool {
        self.level < other.level && other.ancestor_at(self.level) == Some(*self)
    }
}

impl std::fmt::Display for QuadNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(level={}, x={}, y={})", self.level, self.x, self.y)
    }
}

/// Iterator over a node's ancestor chain. See [`QuadNode::ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors {
    next: Option<QuadNode>,
}

impl Iterator for Ancestors {
    type Item = QuadNode;

    fn next(&mut self) -> Option<QuadNode> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
