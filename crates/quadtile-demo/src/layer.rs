//! A tile layer driven by a moving camera focus.

use std::sync::Arc;

use glam::DVec2;
use quadtile_config::Config;
use quadtile_coords::{
    CoordSystemDisplayAdapter, DisplayKind, FlatDisplayAdapter, GeocentricDisplayAdapter, Mbr,
};
use quadtile_geom::{LoadedTile, NodeChanges, TileGeomError, TileGeomManager, TileGeomSettings};
use quadtile_quadtree::{NodeSet, QuadNode, QuadTree};
use quadtile_scene::ChangeSet;
use tracing::debug;

/// How many tile widths around the focus stay loaded.
const VIEW_RADIUS_TILES: f64 = 1.5;

/// Amplitude of the synthetic terrain, in planet radii.
const TERRAIN_AMPLITUDE: f64 = 0.002;

/// Owns a manager and the settings every tile of the layer is built with.
pub struct DemoLayer {
    manager: TileGeomManager,
    settings: TileGeomSettings,
}

impl DemoLayer {
    /// Build the layer described by `config`. Expects a validated config.
    pub fn from_config(config: &Config) -> Result<Self, TileGeomError> {
        let kind = config.tree.coord_system;
        let extent = kind.full_extent();
        let coord_sys = kind.build();
        let adapter: Arc<dyn CoordSystemDisplayAdapter> = match config.tree.display {
            DisplayKind::Globe => Arc::new(GeocentricDisplayAdapter::new()),
            DisplayKind::Flat => {
                Arc::new(FlatDisplayAdapter::new(coord_sys.clone(), DVec2::ZERO, 1.0))
            }
        };
        let tree = QuadTree::new(extent, config.tree.min_level, config.tree.max_level);
        let manager = TileGeomManager::setup(tree, adapter, coord_sys, extent)?
            .with_options(config.manager.clone());
        Ok(Self {
            manager,
            settings: config.geometry.clone(),
        })
    }

    pub fn manager(&self) -> &TileGeomManager {
        &self.manager
    }

    /// Nodes to keep loaded while looking at `focus` from `level`: the nodes
    /// around the focus at that level plus all their ancestors down to the
    /// tree's minimum level.
    pub fn visible_nodes(&self, focus: DVec2, level: u8) -> NodeSet {
        let tree = self.manager.quad_tree();
        let level = level.clamp(tree.min_level(), tree.max_level());
        let tile_size = tree.mbr().span() / f64::from(QuadNode::grid_size(level));
        let half = tile_size * VIEW_RADIUS_TILES;
        let region = Mbr::new(focus - half, focus + half);

        let mut nodes = NodeSet::new();
        for node in tree.nodes_in(&region, level) {
            for ancestor_level in tree.min_level()..=level {
                if let Some(ancestor) = node.ancestor_at(ancestor_level) {
                    nodes.insert(ancestor);
                }
            }
        }
        nodes
    }

    /// Load `target`, drop everything else, and report what changed.
    ///
    /// New tiles are added before stale ones are removed so coarse tiles
    /// keep covering the area until their replacements exist.
    pub fn view(
        &mut self,
        target: &NodeSet,
        changes: &mut ChangeSet,
    ) -> Result<NodeChanges, TileGeomError> {
        let stale: NodeSet = self
            .manager
            .tiles()
            .map(LoadedTile::ident)
            .filter(|node| !target.contains(node))
            .collect();

        let mut result = self.manager.add_tiles(&self.settings, target, changes)?;
        if self.settings.include_elev {
            for node in &result.added_tiles {
                let heights = self.terrain_heights(node);
                self.manager.update_elevation(node, &heights, changes)?;
            }
        }

        let removed = self.manager.remove_tiles(&stale, changes);
        result.enabled_tiles.extend(removed.enabled_tiles);
        result.disabled_tiles.extend(removed.disabled_tiles);
        result.removed_tiles = removed.removed_tiles;
        debug!(
            loaded = self.manager.len(),
            stale = stale.len(),
            "Layer updated"
        );
        Ok(result)
    }

    /// Synthetic rolling terrain sampled on the tile grid.
    fn terrain_heights(&self, node: &QuadNode) -> Vec<f32> {
        let tree = self.manager.quad_tree();
        let mbr = tree.generate_mbr_for_node(node);
        let (sx, sy) = (self.settings.sample_x, self.settings.sample_y);
        let step = mbr.span() / DVec2::new(f64::from(sx), f64::from(sy));

        let mut heights = Vec::with_capacity(self.settings.grid_vertex_count());
        for iy in 0..=sy {
            for ix in 0..=sx {
                let p = mbr.ll + step * DVec2::new(f64::from(ix), f64::from(iy));
                let h = TERRAIN_AMPLITUDE * (3.0 * p.x).sin() * (5.0 * p.y).cos();
                heights.push(h as f32);
            }
        }
        heights
    }
}
