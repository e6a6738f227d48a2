//! One loaded tile and the drawables that represent it.

use std::collections::BTreeSet;
use std::f64::consts::FRAC_PI_2;

use glam::{DVec2, DVec3};
use quadtile_coords::{Mbr, convert_point};
use quadtile_quadtree::QuadNode;
use quadtile_scene::{BasicDrawable, ChangeSet, DrawableId, Primitive, RgbaColor, TileVertex};
use tracing::trace;

use crate::skirt::{EdgeSamples, build_skirt, skirt_edges, skirt_heights};
use crate::{TileGeomError, TileGeomManager, TileGeomSettings};

/// Latitude distance below which a tile row counts as touching a pole.
const POLE_EPSILON: f64 = 1e-9;

/// Which pole caps were appended to a surface, in build order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct PoleCaps {
    north: bool,
    south: bool,
}

/// Layout of the surface a tile was built with, kept for elevation updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SurfaceLayout {
    surface_id: DrawableId,
    skirt_id: Option<DrawableId>,
    sample_x: u32,
    sample_y: u32,
    has_elevation: bool,
    caps: PoleCaps,
}

/// A tile that has been loaded into memory.
///
/// The tile owns the ids of the drawables built for it. Those ids must be
/// released with [`LoadedTile::remove_drawables`] before the tile is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTile {
    ident: QuadNode,
    enabled: bool,
    draw_ids: BTreeSet<DrawableId>,
    layout: Option<SurfaceLayout>,
}

/// The sampled tile grid in display space.
struct Grid {
    points: Vec<DVec3>,
    normals: Vec<DVec3>,
    tex_coords: Vec<DVec2>,
}

impl LoadedTile {
    /// A tile with no geometry yet. Starts disabled.
    #[must_use]
    pub fn new(ident: QuadNode) -> Self {
        Self {
            ident,
            enabled: false,
            draw_ids: BTreeSet::new(),
            layout: None,
        }
    }

    /// The node this tile represents.
    #[must_use]
    pub fn ident(&self) -> QuadNode {
        self.ident
    }

    /// Whether the tile's drawables are currently switched on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Ids of every drawable this tile owns.
    #[must_use]
    pub fn draw_ids(&self) -> &BTreeSet<DrawableId> {
        &self.draw_ids
    }

    /// The main surface drawable, once built.
    #[must_use]
    pub fn surface_id(&self) -> Option<DrawableId> {
        self.layout.map(|l| l.surface_id)
    }

    /// The skirt drawable, if skirts were built.
    #[must_use]
    pub fn skirt_id(&self) -> Option<DrawableId> {
        self.layout.and_then(|l| l.skirt_id)
    }

    /// Build the drawables for this tile and queue their creation.
    ///
    /// The surface is a `sample_x` × `sample_y` grid over the tile's extent
    /// (clipped to the manager's area). Skirts and pole caps are added
    /// according to the manager's options. Every drawable starts switched
    /// off.
    pub fn make_drawables(
        &mut self,
        manager: &TileGeomManager,
        settings: &TileGeomSettings,
        changes: &mut ChangeSet,
    ) -> Result<(), TileGeomError> {
        settings.validate()?;
        let chunk = Self::clip(manager, &self.ident)?;
        self.build(manager, settings, chunk, changes);
        Ok(())
    }

    /// The part of `node`'s extent that lies inside the managed area.
    pub(crate) fn clip(manager: &TileGeomManager, node: &QuadNode) -> Result<Mbr, TileGeomError> {
        manager
            .quad_tree()
            .generate_mbr_for_node(node)
            .intersection(&manager.mbr())
            .ok_or(TileGeomError::NodeOutsideBounds(*node))
    }

    /// Build geometry over `chunk` with settings that already validated.
    pub(crate) fn build(
        &mut self,
        manager: &TileGeomManager,
        settings: &TileGeomSettings,
        chunk: Mbr,
        changes: &mut ChangeSet,
    ) {
        let adapter = manager.coord_adapter();
        let scene_sys = adapter.coord_system();
        let tile_sys = manager.coord_sys();
        let to_scene = |p: DVec2| convert_point(tile_sys, scene_sys, p.extend(0.0));
        let flat = adapter.is_flat();
        let to_display = |local: DVec3| {
            let mut p = adapter.local_to_display(local);
            if flat {
                p.z = 0.0;
            }
            p
        };

        let center = if settings.use_tile_centers {
            to_display(to_scene(chunk.mid()))
        } else {
            DVec3::ZERO
        };

        let (sx, sy) = (settings.sample_x, settings.sample_y);
        let incr = chunk.span() / DVec2::new(f64::from(sx), f64::from(sy));
        let mut grid = Grid {
            points: Vec::with_capacity(settings.grid_vertex_count()),
            normals: Vec::with_capacity(settings.grid_vertex_count()),
            tex_coords: Vec::with_capacity(settings.grid_vertex_count()),
        };
        for iy in 0..=sy {
            for ix in 0..=sx {
                let local =
                    to_scene(chunk.ll + incr * DVec2::new(f64::from(ix), f64::from(iy)));
                grid.points.push(to_display(local));
                grid.normals.push(adapter.normal_for_local(local));
                grid.tex_coords.push(DVec2::new(
                    f64::from(ix) / f64::from(sx),
                    1.0 - f64::from(iy) / f64::from(sy),
                ));
            }
        }

        let mut surface = self.new_drawable("tile surface", settings, center);
        surface.local_mbr = Some(chunk);
        surface.has_elevation = settings.include_elev;
        surface.reserve(grid.points.len(), 6 * sx as usize * sy as usize);
        for ((point, normal), tex_coord) in
            grid.points.iter().zip(&grid.normals).zip(&grid.tex_coords)
        {
            surface.add_vertex(TileVertex::new(
                (*point - center).as_vec3(),
                normal.as_vec3(),
                tex_coord.as_vec2(),
                settings.color,
            ));
        }

        let row = sx + 1;
        let mut caps = PoleCaps::default();
        if settings.line_mode {
            surface.primitive = Primitive::Lines;
            for iy in 0..=sy {
                for ix in 0..=sx {
                    let org = iy * row + ix;
                    if ix < sx {
                        surface.add_line(org, org + 1);
                    }
                    if iy < sy {
                        surface.add_line(org, org + row);
                    }
                }
            }
        } else {
            for iy in 0..sy {
                for ix in 0..sx {
                    let bl = iy * row + ix;
                    let tl = bl + row;
                    surface.add_triangle(tl, bl, tl + 1);
                    surface.add_triangle(tl + 1, bl, bl + 1);
                }
            }
            if manager.options().cover_poles && !flat {
                caps = self.add_pole_caps(manager, &mut surface, &grid, settings, chunk, center);
            }
        }
        let surface_id = changes.add_drawable(surface);
        self.draw_ids.insert(surface_id);

        // Skirts only make sense under filled geometry.
        let mut skirt_id = None;
        if manager.options().build_skirts && !settings.line_mode {
            let tile_scale =
                (to_display(to_scene(chunk.ur)) - to_display(to_scene(chunk.ll))).length();
            let skirt_depth = manager.options().skirt_factor * tile_scale;
            let mut skirt = self.new_drawable("tile skirt", settings, center);
            skirt.local_mbr = Some(chunk);
            for edge in skirt_edges(sx, sy) {
                let samples =
                    EdgeSamples::gather(&grid.points, &grid.normals, &grid.tex_coords, &edge);
                build_skirt(&mut skirt, &samples, skirt_depth, settings.include_elev, center);
            }
            let id = changes.add_drawable(skirt);
            self.draw_ids.insert(id);
            skirt_id = Some(id);
        }

        self.layout = Some(SurfaceLayout {
            surface_id,
            skirt_id,
            sample_x: sx,
            sample_y: sy,
            has_elevation: settings.include_elev,
            caps,
        });
        trace!(node = %self.ident, drawables = self.draw_ids.len(), "Built tile geometry");
    }

    /// A drawable carrying the shared render state from `settings`.
    fn new_drawable(&self, name: &str, settings: &TileGeomSettings, center: DVec3) -> BasicDrawable {
        let mut draw = BasicDrawable::new(format!("{name} {}", self.ident), Primitive::Triangles);
        draw.color = settings.color;
        draw.program_id = settings.program_id;
        draw.draw_priority = settings.draw_priority;
        draw.min_vis = settings.min_vis;
        draw.max_vis = settings.max_vis;
        draw.on = false;
        draw.translation = settings.use_tile_centers.then_some(center);
        draw
    }

    /// Close the gap between the tree's top/bottom rows and the poles with a
    /// triangle fan. Rows that already reach a pole get no cap.
    fn add_pole_caps(
        &self,
        manager: &TileGeomManager,
        surface: &mut BasicDrawable,
        grid: &Grid,
        settings: &TileGeomSettings,
        chunk: Mbr,
        center: DVec3,
    ) -> PoleCaps {
        let last_row = QuadNode::grid_size(self.ident.level) - 1;
        let (sx, sy) = (settings.sample_x, settings.sample_y);
        let row = (sx + 1) as usize;
        let options = manager.options();
        let tile_sys = manager.coord_sys();
        let short_of = |local_y: f64, pole_lat: f64| {
            let geo = tile_sys.local_to_geographic(DVec3::new(chunk.mid().x, local_y, 0.0));
            (geo.y - pole_lat).abs() > POLE_EPSILON
        };
        let caps = PoleCaps {
            north: self.ident.y == last_row && short_of(chunk.ur.y, FRAC_PI_2),
            south: self.ident.y == 0 && short_of(chunk.ll.y, -FRAC_PI_2),
        };

        if caps.north {
            let color = options.north_pole_color.unwrap_or(settings.color);
            let ring = (sy as usize * row..(sy as usize + 1) * row).collect::<Vec<_>>();
            let (pole, start) = push_cap(manager, surface, grid, &ring, FRAC_PI_2, 0.0, color, center);
            for ix in 0..sx {
                surface.add_triangle(start + ix, start + ix + 1, pole);
            }
        }
        if caps.south {
            let color = options.south_pole_color.unwrap_or(settings.color);
            let ring = (0..row).collect::<Vec<_>>();
            let (pole, start) = push_cap(manager, surface, grid, &ring, -FRAC_PI_2, 1.0, color, center);
            for ix in 0..sx {
                surface.add_triangle(pole, start + ix + 1, start + ix);
            }
        }
        caps
    }

    /// Switch every drawable on.
    pub fn enable(&mut self, changes: &mut ChangeSet) {
        for id in &self.draw_ids {
            changes.set_enabled(*id, true);
        }
        self.enabled = true;
    }

    /// Switch every drawable off.
    pub fn disable(&mut self, changes: &mut ChangeSet) {
        for id in &self.draw_ids {
            changes.set_enabled(*id, false);
        }
        self.enabled = false;
    }

    /// Queue removal of every drawable and forget their ids.
    pub fn remove_drawables(&mut self, changes: &mut ChangeSet) {
        for id in std::mem::take(&mut self.draw_ids) {
            changes.remove_drawable(id);
        }
        self.enabled = false;
        self.layout = None;
    }

    /// Queue new elevation values for the tile surface (and its skirt).
    ///
    /// `heights` holds one value per grid vertex, row by row from the
    /// bottom-left corner, `(sample_x + 1) * (sample_y + 1)` in total.
    pub fn update_elevation(
        &self,
        heights: &[f32],
        changes: &mut ChangeSet,
    ) -> Result<(), TileGeomError> {
        let layout = self
            .layout
            .filter(|l| l.has_elevation)
            .ok_or(TileGeomError::ElevationNotIncluded(self.ident))?;
        let expected = (layout.sample_x as usize + 1) * (layout.sample_y as usize + 1);
        if heights.len() != expected {
            return Err(TileGeomError::ElevationSampleMismatch {
                node: self.ident,
                expected,
                actual: heights.len(),
            });
        }

        changes.set_elevation(layout.surface_id, surface_heights(&layout, heights));
        if let Some(skirt_id) = layout.skirt_id {
            let edges = skirt_edges(layout.sample_x, layout.sample_y);
            changes.set_elevation(skirt_id, skirt_heights(&edges, heights));
        }
        Ok(())
    }
}

/// Heights for the surface drawable: the grid, then each pole cap in build
/// order. A cap's ring repeats its edge row and the pole stays at zero.
fn surface_heights(layout: &SurfaceLayout, heights: &[f32]) -> Vec<f32> {
    let row = layout.sample_x as usize + 1;
    let top = layout.sample_y as usize * row;
    let mut out = heights.to_vec();
    if layout.caps.north {
        out.push(0.0);
        out.extend_from_slice(&heights[top..top + row]);
    }
    if layout.caps.south {
        out.push(0.0);
        out.extend_from_slice(&heights[..row]);
    }
    out
}

/// Append a pole vertex and a copy of the `ring` row, returning the pole's
/// index and the index of the first ring vertex.
#[allow(clippy::too_many_arguments)]
fn push_cap(
    manager: &TileGeomManager,
    surface: &mut BasicDrawable,
    grid: &Grid,
    ring: &[usize],
    pole_lat: f64,
    pole_v: f64,
    color: RgbaColor,
    center: DVec3,
) -> (u32, u32) {
    let adapter = manager.coord_adapter();
    let pole_local = adapter
        .coord_system()
        .geographic_to_local(DVec3::new(0.0, pole_lat, 0.0));
    let pole_tex = DVec2::new(0.5, pole_v).as_vec2();

    let pole = surface.add_vertex(TileVertex::new(
        (adapter.local_to_display(pole_local) - center).as_vec3(),
        adapter.normal_for_local(pole_local).as_vec3(),
        pole_tex,
        color,
    ));
    let start = surface.vertices.len() as u32;
    for &i in ring {
        surface.add_vertex(TileVertex::new(
            (grid.points[i] - center).as_vec3(),
            grid.normals[i].as_vec3(),
            pole_tex,
            color,
        ));
    }
    (pole, start)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::sync::Arc;

    use glam::Vec3;
    use quadtile_coords::{
        CoordSystemKind, FlatDisplayAdapter, GeocentricDisplayAdapter, Mbr, PlateCarree,
        SphericalMercator,
    };
    use quadtile_quadtree::QuadTree;
    use quadtile_scene::{ChangeRequest, DrawableIdAllocator, ProgramId, Scene};

    use super::*;

    fn globe() -> TileGeomManager {
        let mbr = Mbr::new(DVec2::new(-PI, -FRAC_PI_2), DVec2::new(PI, FRAC_PI_2));
        TileGeomManager::setup(
            QuadTree::new(mbr, 0, 6),
            Arc::new(GeocentricDisplayAdapter::new()),
            Arc::new(PlateCarree),
            mbr,
        )
        .unwrap()
    }

    /// A globe laid out in mercator, whose top and bottom rows stop short
    /// of the poles.
    fn mercator_globe() -> TileGeomManager {
        let mbr = CoordSystemKind::SphericalMercator.full_extent();
        TileGeomManager::setup(
            QuadTree::new(mbr, 0, 6),
            Arc::new(GeocentricDisplayAdapter::new()),
            Arc::new(SphericalMercator),
            mbr,
        )
        .unwrap()
    }

    fn flat_map() -> TileGeomManager {
        let mbr = Mbr::new(DVec2::new(-PI, -FRAC_PI_2), DVec2::new(PI, FRAC_PI_2));
        TileGeomManager::setup(
            QuadTree::new(mbr, 0, 6),
            Arc::new(FlatDisplayAdapter::new(Arc::new(PlateCarree), DVec2::ZERO, 1.0)),
            Arc::new(PlateCarree),
            mbr,
        )
        .unwrap()
    }

    fn change_set() -> ChangeSet {
        ChangeSet::new(Arc::new(DrawableIdAllocator::new()))
    }

    fn samples(sample_x: u32, sample_y: u32) -> TileGeomSettings {
        TileGeomSettings {
            sample_x,
            sample_y,
            ..TileGeomSettings::default()
        }
    }

    /// Drawables queued for creation, in order.
    fn built(changes: &ChangeSet) -> Vec<&BasicDrawable> {
        changes
            .requests()
            .iter()
            .filter_map(|r| match r {
                ChangeRequest::AddDrawable { drawable, .. } => Some(drawable.as_ref()),
                _ => None,
            })
            .collect()
    }

    fn world_position(draw: &BasicDrawable, index: usize) -> Vec3 {
        let offset = draw.translation.unwrap_or(DVec3::ZERO).as_vec3();
        Vec3::from_array(draw.vertices[index].position) + offset
    }

    #[test]
    fn test_single_quad_with_skirts() {
        let mut manager = globe();
        manager.set_build_skirts(true, 0.05);
        let mut changes = change_set();
        let mut tile = LoadedTile::new(QuadNode::new(2, 1, 1));
        tile.make_drawables(&manager, &samples(1, 1), &mut changes).unwrap();

        assert_eq!(tile.draw_ids().len(), 2);
        assert!(!tile.is_enabled());
        let draws = built(&changes);
        assert_eq!(draws.len(), 2);
        let (surface, skirt) = (draws[0], draws[1]);
        assert_eq!(surface.vertex_count(), 4);
        assert_eq!(surface.primitive_count(), 2);
        assert_eq!(skirt.primitive_count(), 8);
        assert_eq!(skirt.vertex_count(), 16);
        assert!(surface.indices_in_bounds() && skirt.indices_in_bounds());
        assert_eq!(tile.skirt_id(), changes.requests().get(1).map(ChangeRequest::id));
    }

    #[test]
    fn test_surface_grid_layout() {
        let manager = globe();
        let mut changes = change_set();
        let settings = TileGeomSettings {
            draw_priority: 7,
            program_id: ProgramId(3),
            ..samples(4, 3)
        };
        let mut tile = LoadedTile::new(QuadNode::new(3, 2, 3));
        tile.make_drawables(&manager, &settings, &mut changes).unwrap();

        let surface = built(&changes)[0];
        assert_eq!(surface.vertex_count(), 20);
        assert_eq!(surface.primitive_count(), 24);
        assert!(!surface.on);
        assert!(!surface.has_elevation);
        assert_eq!(surface.draw_priority, 7);
        assert_eq!(surface.program_id, ProgramId(3));
        assert_eq!(surface.vertices[0].tex_coord, [0.0, 1.0]);
        assert_eq!(surface.vertices[19].tex_coord, [1.0, 0.0]);
        for i in 0..surface.vertex_count() {
            assert!((world_position(surface, i).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_without_tile_centers_positions_are_absolute() {
        let manager = globe();
        let mut changes = change_set();
        let settings = TileGeomSettings {
            use_tile_centers: false,
            ..samples(2, 2)
        };
        let mut tile = LoadedTile::new(QuadNode::new(2, 2, 1));
        tile.make_drawables(&manager, &settings, &mut changes).unwrap();
        let surface = built(&changes)[0];
        assert_eq!(surface.translation, None);
        let p = Vec3::from_array(surface.vertices[0].position);
        assert!((p.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_north_cap_on_top_row() {
        let mut manager = mercator_globe();
        let cap = RgbaColor::new(10, 20, 30, 255);
        manager.set_pole_colors(Some(cap), None);
        let mut changes = change_set();
        let mut tile = LoadedTile::new(QuadNode::new(1, 0, 1));
        tile.make_drawables(&manager, &samples(2, 2), &mut changes).unwrap();

        let surface = built(&changes)[0];
        assert_eq!(surface.vertex_count(), 9 + 1 + 3);
        assert_eq!(surface.primitive_count(), 8 + 2);
        assert!(surface.indices_in_bounds());
        let pole = world_position(surface, 9);
        assert!((pole - Vec3::Z).length() < 1e-5);
        assert_eq!(surface.vertices[9].color, cap.to_array());
        assert_eq!(surface.vertices[0].color, RgbaColor::WHITE.to_array());
    }

    #[test]
    fn test_root_gets_both_caps() {
        let mut manager = mercator_globe();
        let north = RgbaColor::new(200, 0, 0, 255);
        let south = RgbaColor::new(0, 0, 200, 255);
        manager.set_pole_colors(Some(north), Some(south));
        let mut changes = change_set();
        let mut tile = LoadedTile::new(QuadNode::ROOT);
        tile.make_drawables(&manager, &samples(2, 2), &mut changes).unwrap();
        let surface = built(&changes)[0];
        assert_eq!(surface.vertex_count(), 9 + 2 * 4);
        assert_eq!(surface.primitive_count(), 8 + 4);
        assert!((world_position(surface, 9) - Vec3::Z).length() < 1e-5);
        assert!((world_position(surface, 13) + Vec3::Z).length() < 1e-5);
        assert!(surface.vertices[9..13].iter().all(|v| v.color == north.to_array()));
        assert!(surface.vertices[13..].iter().all(|v| v.color == south.to_array()));
    }

    #[test]
    fn test_caps_can_be_turned_off() {
        let mut manager = mercator_globe();
        manager.set_cover_poles(false);
        let mut changes = change_set();
        let mut tile = LoadedTile::new(QuadNode::ROOT);
        tile.make_drawables(&manager, &samples(2, 2), &mut changes).unwrap();
        assert_eq!(built(&changes)[0].vertex_count(), 9);
    }

    #[test]
    fn test_rows_at_the_pole_get_no_cap() {
        let manager = globe();
        assert!(manager.options().cover_poles);
        let mut changes = change_set();
        for node in [QuadNode::ROOT, QuadNode::new(2, 1, 3), QuadNode::new(2, 2, 0)] {
            let mut tile = LoadedTile::new(node);
            tile.make_drawables(&manager, &samples(2, 2), &mut changes).unwrap();
        }
        assert!(built(&changes).iter().all(|d| d.vertex_count() == 9));
    }

    #[test]
    fn test_line_mode_outlines_grid() {
        let mut manager = globe();
        manager.set_build_skirts(true, 0.05);
        let mut changes = change_set();
        let settings = TileGeomSettings {
            line_mode: true,
            ..samples(2, 2)
        };
        let mut tile = LoadedTile::new(QuadNode::ROOT);
        tile.make_drawables(&manager, &settings, &mut changes).unwrap();

        assert_eq!(tile.draw_ids().len(), 1);
        let surface = built(&changes)[0];
        assert_eq!(surface.primitive, Primitive::Lines);
        assert_eq!(surface.vertex_count(), 9);
        assert_eq!(surface.primitive_count(), 12);
        assert!(surface.indices_in_bounds());
    }

    #[test]
    fn test_flat_display_is_planar() {
        let mut manager = flat_map();
        manager.set_build_skirts(true, 0.05);
        let mut changes = change_set();
        let mut tile = LoadedTile::new(QuadNode::ROOT);
        tile.make_drawables(&manager, &samples(3, 3), &mut changes).unwrap();

        let surface = built(&changes)[0];
        assert_eq!(surface.vertex_count(), 16);
        assert_eq!(surface.translation.map(|t| t.z), Some(0.0));
        assert!(surface.vertices.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_enable_disable_emit_per_id() {
        let mut manager = globe();
        manager.set_build_skirts(true, 0.05);
        let mut changes = change_set();
        let mut tile = LoadedTile::new(QuadNode::new(2, 1, 2));
        tile.make_drawables(&manager, &samples(1, 1), &mut changes).unwrap();
        let built_len = changes.len();

        tile.enable(&mut changes);
        assert!(tile.is_enabled());
        tile.disable(&mut changes);
        assert!(!tile.is_enabled());
        let toggles: Vec<_> = changes.requests()[built_len..]
            .iter()
            .map(|r| match r {
                ChangeRequest::OnOff { enabled, .. } => *enabled,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(toggles, vec![true, true, false, false]);
    }

    #[test]
    fn test_remove_drawables_releases_every_id() {
        let mut manager = globe();
        manager.set_build_skirts(true, 0.05);
        let mut changes = change_set();
        let mut tile = LoadedTile::new(QuadNode::new(2, 1, 2));
        tile.make_drawables(&manager, &samples(1, 1), &mut changes).unwrap();
        tile.enable(&mut changes);
        let ids = tile.draw_ids().clone();

        let mut removal = change_set();
        tile.remove_drawables(&mut removal);
        assert!(tile.draw_ids().is_empty());
        assert!(!tile.is_enabled());
        assert_eq!(tile.surface_id(), None);
        let removed: BTreeSet<_> = removal.requests().iter().map(ChangeRequest::id).collect();
        assert_eq!(removed, ids);
        assert_eq!(removal.len(), ids.len());
    }

    #[test]
    fn test_tile_outside_managed_area() {
        let mbr = Mbr::new(DVec2::new(-PI, -FRAC_PI_2), DVec2::new(PI, FRAC_PI_2));
        let east = Mbr::new(DVec2::new(0.0, -FRAC_PI_2), DVec2::new(PI, FRAC_PI_2));
        let manager = TileGeomManager::setup(
            QuadTree::new(mbr, 0, 6),
            Arc::new(GeocentricDisplayAdapter::new()),
            Arc::new(PlateCarree),
            east,
        )
        .unwrap();
        let node = QuadNode::new(1, 0, 0);
        let mut changes = change_set();
        let mut tile = LoadedTile::new(node);
        assert_eq!(
            tile.make_drawables(&manager, &samples(1, 1), &mut changes),
            Err(TileGeomError::NodeOutsideBounds(node))
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_elevation_updates() {
        let mut manager = globe();
        let node = QuadNode::new(2, 1, 1);
        let mut changes = change_set();

        let mut flat_tile = LoadedTile::new(node);
        flat_tile.make_drawables(&manager, &samples(1, 1), &mut changes).unwrap();
        assert_eq!(
            flat_tile.update_elevation(&[0.0; 4], &mut changes),
            Err(TileGeomError::ElevationNotIncluded(node))
        );

        manager.set_build_skirts(true, 0.05);
        let settings = TileGeomSettings {
            include_elev: true,
            ..samples(1, 1)
        };
        let mut tile = LoadedTile::new(node);
        tile.make_drawables(&manager, &settings, &mut changes).unwrap();
        assert!(built(&changes).iter().rev().take(2).all(|d| d.has_elevation));

        let before = changes.len();
        assert_eq!(
            tile.update_elevation(&[0.0; 3], &mut changes),
            Err(TileGeomError::ElevationSampleMismatch {
                node,
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(changes.len(), before);

        tile.update_elevation(&[0.1, 0.2, 0.3, 0.4], &mut changes).unwrap();
        let updates: Vec<_> = changes.requests()[before..]
            .iter()
            .map(|r| match r {
                ChangeRequest::SetElevation { id, heights } => (*id, heights.len()),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            updates,
            vec![
                (tile.surface_id().unwrap(), 4),
                (tile.skirt_id().unwrap(), 16)
            ]
        );
    }

    #[test]
    fn test_cap_ring_follows_edge_elevation() {
        let manager = mercator_globe();
        let mut scene = Scene::new();
        let mut changes = scene.change_set();
        let settings = TileGeomSettings {
            include_elev: true,
            ..samples(1, 1)
        };
        let mut tile = LoadedTile::new(QuadNode::new(1, 0, 1));
        tile.make_drawables(&manager, &settings, &mut changes).unwrap();
        tile.update_elevation(&[0.1, 0.1, 0.5, 0.5], &mut changes).unwrap();
        scene.apply(changes).unwrap();

        let surface = &scene.get(tile.surface_id().unwrap()).unwrap().drawable;
        let elevation: Vec<_> = surface.vertices.iter().map(|v| v.elevation).collect();
        assert_eq!(elevation, vec![0.1, 0.1, 0.5, 0.5, 0.0, 0.5, 0.5]);
    }

    #[test]
    fn test_both_cap_rings_follow_elevation() {
        let manager = mercator_globe();
        let mut changes = change_set();
        let settings = TileGeomSettings {
            include_elev: true,
            ..samples(1, 1)
        };
        let mut tile = LoadedTile::new(QuadNode::ROOT);
        tile.make_drawables(&manager, &settings, &mut changes).unwrap();
        let before = changes.len();
        tile.update_elevation(&[1.0, 2.0, 3.0, 4.0], &mut changes).unwrap();
        assert!(matches!(
            &changes.requests()[before],
            ChangeRequest::SetElevation { heights, .. }
                if heights == &[1.0, 2.0, 3.0, 4.0, 0.0, 3.0, 4.0, 0.0, 1.0, 2.0]
        ));
    }
}
