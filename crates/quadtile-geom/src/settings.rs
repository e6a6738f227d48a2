//! Per-build geometry parameters.

use std::cmp::Ordering;

use quadtile_scene::{ProgramId, RgbaColor};
use serde::{Deserialize, Serialize};

use crate::TileGeomError;

/// Most vertices one drawable can address with `u32` indices.
const MAX_DRAWABLE_VERTICES: u128 = u32::MAX as u128;

/// Geometry settings passed to each tile build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileGeomSettings {
    /// Store vertices relative to the tile's midpoint and carry the midpoint
    /// as the drawable's translation.
    pub use_tile_centers: bool,
    /// Base color for the tiles.
    pub color: RgbaColor,
    /// Shader program used to draw the tiles.
    pub program_id: ProgramId,
    /// Samples across a tile in x.
    pub sample_x: u32,
    /// Samples across a tile in y.
    pub sample_y: u32,
    /// Minimum viewing distance.
    pub min_vis: f64,
    /// Maximum viewing distance.
    pub max_vis: f64,
    /// Draw priority for the tile drawables.
    pub draw_priority: i32,
    /// Build wireframe lines instead of triangles.
    pub line_mode: bool,
    /// Build geometry that accepts elevation updates.
    pub include_elev: bool,
}

impl Default for TileGeomSettings {
    fn default() -> Self {
        Self {
            use_tile_centers: true,
            color: RgbaColor::WHITE,
            program_id: ProgramId::default(),
            sample_x: 10,
            sample_y: 10,
            min_vis: 0.0,
            max_vis: f64::MAX,
            draw_priority: 0,
            line_mode: false,
            include_elev: false,
        }
    }
}

impl TileGeomSettings {
    /// Number of grid vertices one tile surface carries.
    #[must_use]
    pub fn grid_vertex_count(&self) -> usize {
        (self.sample_x as usize + 1) * (self.sample_y as usize + 1)
    }

    /// Check that the settings can produce geometry.
    pub fn validate(&self) -> Result<(), TileGeomError> {
        if self.sample_x == 0 || self.sample_y == 0 {
            return Err(TileGeomError::InvalidSettings(format!(
                "sample counts must be at least 1, got {}x{}",
                self.sample_x, self.sample_y
            )));
        }
        let (sx, sy) = (u128::from(self.sample_x), u128::from(self.sample_y));
        // Surface grid with both pole caps, and the skirt around all four edges.
        let surface = (sx + 1) * (sy + 1) + 2 * (sx + 2);
        let skirt = 8 * (sx + sy);
        if surface.max(skirt) > MAX_DRAWABLE_VERTICES {
            return Err(TileGeomError::InvalidSettings(format!(
                "{}x{} samples overflow 32-bit vertex indices",
                self.sample_x, self.sample_y
            )));
        }
        let ordered = matches!(
            self.min_vis.partial_cmp(&self.max_vis),
            Some(Ordering::Less | Ordering::Equal)
        );
        if !ordered {
            return Err(TileGeomError::InvalidSettings(format!(
                "visible range is empty: [{}, {}]",
                self.min_vis, self.max_vis
            )));
        }
        Ok(())
    }
}
