//! Skirt geometry: vertical curtains hanging from tile edges.
//!
//! Adjacent tiles at different levels don't share edge vertices, and once
//! elevation arrives their edges don't share heights either. A skirt drops
//! each edge straight down (against the surface normal) so the gap between
//! two tiles shows skirt instead of background.

use glam::{DVec2, DVec3};
use quadtile_scene::{BasicDrawable, TileVertex};

/// The samples along one tile edge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeSamples {
    /// Surface points in display space.
    pub points: Vec<DVec3>,
    /// Outward surface normal at each point.
    pub normals: Vec<DVec3>,
    /// Texture coordinate at each point.
    pub tex_coords: Vec<DVec2>,
}

impl EdgeSamples {
    /// Pick the samples at `indices` out of a full tile grid.
    #[must_use]
    pub fn gather(
        points: &[DVec3],
        normals: &[DVec3],
        tex_coords: &[DVec2],
        indices: &[usize],
    ) -> Self {
        Self {
            points: indices.iter().map(|&i| points[i]).collect(),
            normals: indices.iter().map(|&i| normals[i]).collect(),
            tex_coords: indices.iter().map(|&i| tex_coords[i]).collect(),
        }
    }

    /// Number of quads a skirt along this edge is made of.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Grid indices of the four edges of a `sample_x` × `sample_y` tile grid.
///
/// Order is bottom (west to east), top (east to west), left (north to south),
/// right (south to north), so every edge runs the same way around the tile.
#[must_use]
pub fn skirt_edges(sample_x: u32, sample_y: u32) -> [Vec<usize>; 4] {
    let (sx, sy) = (sample_x as usize, sample_y as usize);
    let row = sx + 1;
    [
        (0..=sx).collect(),
        (0..=sx).rev().map(|ix| sy * row + ix).collect(),
        (0..=sy).rev().map(|iy| iy * row).collect(),
        (0..=sy).map(|iy| iy * row + sx).collect(),
    ]
}

/// Append a skirt along `edge` to `draw`.
///
/// Each pair of neighbouring samples becomes one quad between the two surface
/// points and the same points dropped `skirt_depth` display units along the
/// inverse normal. Positions are stored relative to `center`.
///
/// With `have_elev` the drawable is marked elevation-aware: top vertices take
/// the surface heights on update while bottom vertices stay put.
///
/// Returns the number of triangles added.
pub fn build_skirt(
    draw: &mut BasicDrawable,
    edge: &EdgeSamples,
    skirt_depth: f64,
    have_elev: bool,
    center: DVec3,
) -> usize {
    if have_elev {
        draw.has_elevation = true;
    }
    let color = draw.color;

    for ii in 0..edge.segment_count() {
        let top = [edge.points[ii], edge.points[ii + 1]];
        let drop = [
            edge.normals[ii] * skirt_depth,
            edge.normals[ii + 1] * skirt_depth,
        ];
        let corners = [top[0], top[1], top[1] - drop[1], top[0] - drop[0]];
        let tex = [
            edge.tex_coords[ii],
            edge.tex_coords[ii + 1],
            edge.tex_coords[ii + 1],
            edge.tex_coords[ii],
        ];
        // Skirts are lit like the surface above them.
        let normal = (edge.normals[ii] + edge.normals[ii + 1])
            .try_normalize()
            .unwrap_or(DVec3::Z);

        let base = draw.vertices.len() as u32;
        for (corner, tex_coord) in corners.iter().zip(tex) {
            draw.add_vertex(TileVertex::new(
                (*corner - center).as_vec3(),
                normal.as_vec3(),
                tex_coord.as_vec2(),
                color,
            ));
        }
        draw.add_triangle(base + 3, base + 2, base);
        draw.add_triangle(base, base + 2, base + 1);
    }

    edge.segment_count() * 2
}

/// Heights for a skirt drawable built from `edges`, given the surface grid
/// heights. Top corners follow the surface, bottom corners stay at zero.
pub(crate) fn skirt_heights(edges: &[Vec<usize>], heights: &[f32]) -> Vec<f32> {
    let mut out = Vec::new();
    for edge in edges {
        for pair in edge.windows(2) {
            out.extend_from_slice(&[heights[pair[0]], heights[pair[1]], 0.0, 0.0]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use quadtile_scene::Primitive;

    use super::*;

    fn max_drop(draw: &BasicDrawable, up: Vec3) -> f32 {
        draw.vertices
            .iter()
            .map(|v| -Vec3::from_array(v.position).dot(up))
            .fold(f32::MIN, f32::max)
    }

    fn flat_edge(samples: usize) -> EdgeSamples {
        let n = samples + 1;
        EdgeSamples {
            points: (0..n).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect(),
            normals: vec![DVec3::Z; n],
            tex_coords: (0..n)
                .map(|i| DVec2::new(i as f64 / samples as f64, 1.0))
                .collect(),
        }
    }

    #[test]
    fn test_edges_of_single_quad() {
        let edges = skirt_edges(1, 1);
        assert_eq!(edges[0], vec![0, 1]);
        assert_eq!(edges[1], vec![3, 2]);
        assert_eq!(edges[2], vec![2, 0]);
        assert_eq!(edges[3], vec![1, 3]);
    }

    #[test]
    fn test_edges_cover_the_border() {
        let (sx, sy) = (4u32, 3u32);
        let edges = skirt_edges(sx, sy);
        assert_eq!(edges[0].len(), 5);
        assert_eq!(edges[2].len(), 4);
        let row = sx as usize + 1;
        for edge in &edges {
            for &i in edge {
                let (ix, iy) = (i % row, i / row);
                assert!(ix == 0 || ix == sx as usize || iy == 0 || iy == sy as usize);
            }
        }
    }

    #[test]
    fn test_skirt_drops_along_inverse_normal() {
        let mut draw = BasicDrawable::new("skirt", Primitive::Triangles);
        let tris = build_skirt(&mut draw, &flat_edge(3), 0.5, false, DVec3::ZERO);
        assert_eq!(tris, 6);
        assert_eq!(draw.vertex_count(), 12);
        assert!(draw.indices_in_bounds());
        assert!((max_drop(&draw, Vec3::Z) - 0.5).abs() < 1e-6);
        assert!(!draw.has_elevation);
    }

    #[test]
    fn test_skirt_respects_center_offset() {
        let mut draw = BasicDrawable::new("skirt", Primitive::Triangles);
        build_skirt(&mut draw, &flat_edge(1), 1.0, false, DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(draw.vertices[0].position, [-1.0, 0.0, 0.0]);
        assert_eq!(draw.vertices[2].position, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_skirt_with_elevation_marks_drawable() {
        let mut draw = BasicDrawable::new("skirt", Primitive::Triangles);
        build_skirt(&mut draw, &flat_edge(2), 0.1, true, DVec3::ZERO);
        assert!(draw.has_elevation);
    }

    #[test]
    fn test_single_sample_edge_adds_nothing() {
        let mut draw = BasicDrawable::new("skirt", Primitive::Triangles);
        let edge = EdgeSamples {
            points: vec![DVec3::ZERO],
            normals: vec![DVec3::Z],
            tex_coords: vec![DVec2::ZERO],
        };
        assert_eq!(build_skirt(&mut draw, &edge, 1.0, false, DVec3::ZERO), 0);
        assert!(draw.is_empty());
    }

    #[test]
    fn test_skirt_heights_follow_top_corners() {
        let edges = skirt_edges(1, 1);
        let heights = [1.0, 2.0, 3.0, 4.0];
        let out = skirt_heights(&edges, &heights);
        assert_eq!(out.len(), 16);
        assert_eq!(&out[0..4], &[1.0, 2.0, 0.0, 0.0]);
        assert_eq!(&out[4..8], &[4.0, 3.0, 0.0, 0.0]);
    }
}
