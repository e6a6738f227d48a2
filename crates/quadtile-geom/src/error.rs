//! Tile geometry error types.

use quadtile_coords::Mbr;
use quadtile_quadtree::QuadNode;
use thiserror::Error;

/// Precondition violations reported by the tile geometry manager.
///
/// An operation that returns one of these has not touched the tile map or
/// the change set.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TileGeomError {
    /// The geometry settings cannot produce a tile.
    #[error("invalid geometry settings: {0}")]
    InvalidSettings(String),

    /// The node lies outside the quad tree's level range or grid.
    #[error("node {0} is not part of the quad tree")]
    NodeOutOfTree(QuadNode),

    /// The node's extent does not overlap the managed area.
    #[error("node {0} does not overlap the managed area")]
    NodeOutsideBounds(QuadNode),

    /// The managed area has no extent.
    #[error("managed area has no extent: {0:?}")]
    DegenerateExtent(Mbr),

    /// The node has no loaded tile.
    #[error("node {0} is not loaded")]
    TileNotLoaded(QuadNode),

    /// The tile was built without elevation support.
    #[error("node {0} was built without elevation")]
    ElevationNotIncluded(QuadNode),

    /// An elevation update does not match the tile's sample grid.
    #[error("node {node} expects {expected} heights, got {actual}")]
    ElevationSampleMismatch {
        node: QuadNode,
        expected: usize,
        actual: usize,
    },
}
