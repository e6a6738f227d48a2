//! Tile geometry lifecycle for quad-tree globe and map rendering.
//!
//! [`TileGeomManager`] owns one [`LoadedTile`] per loaded quad-tree node. Each
//! update cycle the caller adds the nodes that became visible and removes the
//! ones that went away; the manager builds or releases the tiles' drawables
//! and keeps exactly one node enabled along every ancestor chain, so coarse
//! tiles hide while finer ones cover their area.
//!
//! All output goes into a [`quadtile_scene::ChangeSet`] that the caller
//! applies to its scene.

mod error;
mod loaded_tile;
mod manager;
mod settings;
mod skirt;

pub use error::TileGeomError;
pub use loaded_tile::LoadedTile;
pub use manager::{ManagerOptions, NodeChanges, TileGeomManager};
pub use settings::TileGeomSettings;
pub use skirt::{EdgeSamples, build_skirt, skirt_edges};
