//! The tile geometry manager: owns loaded tiles and keeps one node enabled
//! along every ancestor chain.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use quadtile_coords::{CoordSystem, CoordSystemDisplayAdapter, Mbr};
use quadtile_quadtree::{NodeSet, QuadNode, QuadTree};
use quadtile_scene::{ChangeSet, RgbaColor};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{LoadedTile, TileGeomError, TileGeomSettings};

/// Manager-wide geometry options. Changes apply to tiles built afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerOptions {
    /// Close the gap between the tree's top and bottom rows and the poles.
    pub cover_poles: bool,
    /// Color of the north pole cap. Falls back to the tile color.
    pub north_pole_color: Option<RgbaColor>,
    /// Color of the south pole cap. Falls back to the tile color.
    pub south_pole_color: Option<RgbaColor>,
    /// Hang skirts from tile edges.
    pub build_skirts: bool,
    /// Skirt depth as a fraction of the tile's display size.
    pub skirt_factor: f64,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            cover_poles: true,
            north_pole_color: None,
            south_pole_color: None,
            build_skirts: false,
            skirt_factor: 0.05,
        }
    }
}

/// What one manager call did to the tile map.
///
/// Every list is in node order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeChanges {
    /// Nodes that were built and inserted.
    pub added_tiles: Vec<QuadNode>,
    /// Existing nodes that were switched on.
    pub enabled_tiles: Vec<QuadNode>,
    /// Existing nodes that were switched off.
    pub disabled_tiles: Vec<QuadNode>,
    /// Nodes that were released and erased.
    pub removed_tiles: Vec<QuadNode>,
}

impl NodeChanges {
    /// True if the call changed nothing.
    /// True when no tile is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_tiles.is_empty()
            && self.enabled_tiles.is_empty()
            && self.disabled_tiles.is_empty()
            && self.removed_tiles.is_empty()
    }
}

/// Owns the loaded tiles of one quad-tree layer.
///
/// A loaded node is enabled exactly when none of its descendants is loaded,
/// so along any ancestor chain at most one node draws.
#[derive(Debug)]
pub struct TileGeomManager {
    quad_tree: QuadTree,
    coord_adapter: Arc<dyn CoordSystemDisplayAdapter>,
    coord_sys: Arc<dyn CoordSystem>,
    mbr: Mbr,
    options: ManagerOptions,
    tiles: BTreeMap<QuadNode, LoadedTile>,
    /// Number of loaded strict descendants per node. Zero entries are removed.
    loaded_descendants: FxHashMap<QuadNode, u32>,
    /// Nodes whose enable state may be stale.
    dirty: BTreeSet<QuadNode>,
}

impl TileGeomManager {
    /// Create an empty manager.
    ///
    /// Tiles are laid out by `quad_tree` in `coord_sys` and drawn through
    /// `coord_adapter`. Geometry is clipped to `mbr`, which is expressed in
    /// `coord_sys` too.
    pub fn setup(
        quad_tree: QuadTree,
        coord_adapter: Arc<dyn CoordSystemDisplayAdapter>,
        coord_sys: Arc<dyn CoordSystem>,
        mbr: Mbr,
    ) -> Result<Self, TileGeomError> {
        if mbr.is_degenerate() {
            return Err(TileGeomError::DegenerateExtent(mbr));
        }
        debug!(
            ?mbr,
            min_level = quad_tree.min_level(),
            max_level = quad_tree.max_level(),
            flat = coord_adapter.is_flat(),
            "Tile geometry manager set up"
        );
        Ok(Self {
            quad_tree,
            coord_adapter,
            coord_sys,
            mbr,
            options: ManagerOptions::default(),
            tiles: BTreeMap::new(),
            loaded_descendants: FxHashMap::default(),
            dirty: BTreeSet::new(),
        })
    }

    /// Replace the default options while building the manager.
    #[must_use]
    pub fn with_options(mut self, options: ManagerOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace every option at once.
    pub fn set_options(&mut self, options: ManagerOptions) {
        self.options = options;
    }

    /// Turn pole caps on or off.
    pub fn set_cover_poles(&mut self, cover_poles: bool) {
        self.options.cover_poles = cover_poles;
    }

    /// Override the pole cap colors. `None` uses the tile color.
    pub fn set_pole_colors(&mut self, north: Option<RgbaColor>, south: Option<RgbaColor>) {
        self.options.north_pole_color = north;
        self.options.south_pole_color = south;
    }

    /// Turn skirts on or off and set their depth factor.
    pub fn set_build_skirts(&mut self, build_skirts: bool, skirt_factor: f64) {
        self.options.build_skirts = build_skirts;
        self.options.skirt_factor = skirt_factor;
    }

    /// Options new tiles are built with.
    #[must_use]
    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// The tree that lays out node extents.
    #[must_use]
    pub fn quad_tree(&self) -> &QuadTree {
        &self.quad_tree
    }

    /// Adapter that places tile geometry in display space.
    #[must_use]
    pub fn coord_adapter(&self) -> &dyn CoordSystemDisplayAdapter {
        self.coord_adapter.as_ref()
    }

    /// Coordinate system the quad tree is laid out in.
    #[must_use]
    pub fn coord_sys(&self) -> &dyn CoordSystem {
        self.coord_sys.as_ref()
    }

    /// Area geometry is clipped to.
    #[must_use]
    pub fn mbr(&self) -> Mbr {
        self.mbr
    }

    /// Build and insert every node of `nodes` that is not loaded yet, then
    /// reconcile enable state.
    ///
    /// New tiles are reported in `added_tiles` only, even when they end up
    /// enabled. On error nothing has changed.
    pub fn add_tiles(
        &mut self,
        settings: &TileGeomSettings,
        nodes: &NodeSet,
        changes: &mut ChangeSet,
    ) -> Result<NodeChanges, TileGeomError> {
        let pending = match self.check_request(settings, nodes) {
            Ok(pending) => pending,
            Err(err) => {
                warn!(%err, "Rejected tile add");
                return Err(err);
            }
        };

        let mut result = NodeChanges::default();
        for (node, chunk) in pending {
            let mut tile = LoadedTile::new(node);
            tile.build(self, settings, chunk, changes);
            debug!(%node, drawables = tile.draw_ids().len(), "Loaded tile");
            self.insert_tile(tile);
            result.added_tiles.push(node);
        }

        self.update_parents(
            changes,
            &mut result.enabled_tiles,
            &mut result.disabled_tiles,
        );
        result
            .enabled_tiles
            .retain(|node| result.added_tiles.binary_search(node).is_err());
        Ok(result)
    }

    /// Every node must be in the tree and overlap the managed area.
    ///
    /// Returns the nodes that still need building, each with its clipped
    /// extent, so the build itself cannot fail halfway through a request.
    fn check_request(
        &self,
        settings: &TileGeomSettings,
        nodes: &NodeSet,
    ) -> Result<Vec<(QuadNode, Mbr)>, TileGeomError> {
        settings.validate()?;
        let mut pending = Vec::new();
        for node in nodes {
            if !self.quad_tree.is_valid_node(node) {
                return Err(TileGeomError::NodeOutOfTree(*node));
            }
            let chunk = LoadedTile::clip(self, node)?;
            if !self.tiles.contains_key(node) {
                pending.push((*node, chunk));
            }
        }
        Ok(pending)
    }

    fn insert_tile(&mut self, tile: LoadedTile) {
        let node = tile.ident();
        for ancestor in node.ancestors() {
            *self.loaded_descendants.entry(ancestor).or_default() += 1;
            self.dirty.insert(ancestor);
        }
        self.dirty.insert(node);
        self.tiles.insert(node, tile);
    }

    /// Release and erase every loaded node of `nodes`, then reconcile enable
    /// state. Nodes that are not loaded are skipped.
    pub fn remove_tiles(&mut self, nodes: &NodeSet, changes: &mut ChangeSet) -> NodeChanges {
        let mut result = NodeChanges::default();
        for node in nodes {
            if self.remove_tile(node, changes) {
                result.removed_tiles.push(*node);
            }
        }
        self.update_parents(
            changes,
            &mut result.enabled_tiles,
            &mut result.disabled_tiles,
        );
        result
    }

    fn remove_tile(&mut self, node: &QuadNode, changes: &mut ChangeSet) -> bool {
        let Some(mut tile) = self.tiles.remove(node) else {
            return false;
        };
        tile.remove_drawables(changes);
        for ancestor in node.ancestors() {
            if let Some(count) = self.loaded_descendants.get_mut(&ancestor) {
                *count -= 1;
                if *count == 0 {
                    self.loaded_descendants.remove(&ancestor);
                }
            }
            self.dirty.insert(ancestor);
        }
        self.dirty.remove(node);
        debug!(%node, "Removed tile");
        true
    }

    /// Bring every node touched since the last call to its correct enable
    /// state: on when no strict descendant is loaded, off otherwise.
    ///
    /// Nodes switched on are appended to `enabled`, nodes switched off to
    /// `disabled`.
    pub fn update_parents(
        &mut self,
        changes: &mut ChangeSet,
        enabled: &mut Vec<QuadNode>,
        disabled: &mut Vec<QuadNode>,
    ) {
        for node in std::mem::take(&mut self.dirty) {
            let should_enable = !self.loaded_descendants.contains_key(&node);
            let Some(tile) = self.tiles.get_mut(&node) else {
                continue;
            };
            if tile.is_enabled() == should_enable {
                continue;
            }
            if should_enable {
                tile.enable(changes);
                enabled.push(node);
            } else {
                tile.disable(changes);
                disabled.push(node);
            }
            trace!(%node, enabled = should_enable, "Tile visibility changed");
        }
    }

    /// The loaded tile for `node`, if any.
    #[must_use]
    pub fn get_tile(&self, node: &QuadNode) -> Option<&LoadedTile> {
        self.tiles.get(node)
    }

    /// The loaded tiles among `nodes`, in node order.
    #[must_use]
    pub fn get_tiles(&self, nodes: &NodeSet) -> Vec<&LoadedTile> {
        nodes.iter().filter_map(|node| self.tiles.get(node)).collect()
    }

    /// Push new heights to a loaded tile. See [`LoadedTile::update_elevation`].
    pub fn update_elevation(
        &self,
        node: &QuadNode,
        heights: &[f32],
        changes: &mut ChangeSet,
    ) -> Result<(), TileGeomError> {
        self.tiles
            .get(node)
            .ok_or(TileGeomError::TileNotLoaded(*node))?
            .update_elevation(heights, changes)
    }

    /// Remove every loaded tile.
    pub fn clear(&mut self, changes: &mut ChangeSet) -> NodeChanges {
        let nodes: NodeSet = self.tiles.keys().copied().collect();
        let result = self.remove_tiles(&nodes, changes);
        debug_assert!(self.loaded_descendants.is_empty());
        result
    }

    /// Number of loaded tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Whether `node` has a loaded tile.
    #[must_use]
    pub fn contains(&self, node: &QuadNode) -> bool {
        self.tiles.contains_key(node)
    }

    /// Loaded tiles in node order.
    pub fn tiles(&self) -> impl Iterator<Item = &LoadedTile> {
        self.tiles.values()
    }

    /// Nodes whose drawables are currently on.
    pub fn enabled_nodes(&self) -> impl Iterator<Item = QuadNode> + '_ {
        self.tiles
            .values()
            .filter(|tile| tile.is_enabled())
            .map(LoadedTile::ident)
    }
}
