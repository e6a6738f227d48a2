//! Drawable descriptors: geometry plus the render state needed to draw it.

use glam::{DVec3, Vec2, Vec3};
use quadtile_coords::Mbr;

use crate::{ProgramId, RgbaColor};

/// Topology of a drawable's index buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Primitive {
    /// Three indices per triangle.
    #[default]
    Triangles,
    /// Two indices per line segment.
    Lines,
}

impl Primitive {
    /// Number of indices making up one primitive.
    #[must_use]
    pub fn indices_per_primitive(self) -> usize {
        match self {
            Primitive::Triangles => 3,
            Primitive::Lines => 2,
        }
    }
}

/// A single vertex of tile geometry.
///
/// Layout (40 bytes total):
///   - `[0..12]`  position `[f32; 3]`, relative to the drawable's translation
///   - `[12..24]` normal `[f32; 3]`
///   - `[24..32]` tex_coord `[f32; 2]`
///   - `[32..36]` color `[u8; 4]`
///   - `[36..40]` elevation `f32`, displaced along the normal by the shader
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    pub color: [u8; 4],
    pub elevation: f32,
}

static_assertions::assert_eq_size!(TileVertex, [u8; 40]);

impl TileVertex {
    /// Build a vertex with zero elevation.
    #[must_use]
    pub fn new(position: Vec3, normal: Vec3, tex_coord: Vec2, color: RgbaColor) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tex_coord: tex_coord.to_array(),
            color: color.to_array(),
            elevation: 0.0,
        }
    }
}

/// Everything a renderer needs to create one drawable.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicDrawable {
    /// Debug label.
    pub name: String,
    /// Index topology.
    pub primitive: Primitive,
    /// Vertex buffer.
    pub vertices: Vec<TileVertex>,
    /// Index buffer, interpreted according to `primitive`.
    pub indices: Vec<u32>,
    /// Base color, used where vertices carry no color of their own.
    pub color: RgbaColor,
    /// Shader program.
    pub program_id: ProgramId,
    /// Higher priorities draw later.
    pub draw_priority: i32,
    /// Minimum viewer distance at which the drawable shows.
    pub min_vis: f64,
    /// Maximum viewer distance at which the drawable shows.
    pub max_vis: f64,
    /// Whether the drawable starts visible.
    pub on: bool,
    /// Translation applied to every vertex at draw time, kept in f64 so
    /// vertex positions can stay small.
    pub translation: Option<DVec3>,
    /// Extent of the geometry in its source coordinate system.
    pub local_mbr: Option<Mbr>,
    /// Vertices carry elevation values that may be updated later.
    pub has_elevation: bool,
}

impl BasicDrawable {
    /// An empty drawable with default render state.
    pub fn new(name: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            primitive,
            vertices: Vec::new(),
            indices: Vec::new(),
            color: RgbaColor::WHITE,
            program_id: ProgramId::default(),
            draw_priority: 0,
            min_vis: 0.0,
            max_vis: f64::MAX,
            on: true,
            translation: None,
            local_mbr: None,
            has_elevation: false,
        }
    }

    /// Reserve room for the expected geometry.
    pub fn reserve(&mut self, vertices: usize, indices: usize) {
        self.vertices.reserve(vertices);
        self.indices.reserve(indices);
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: TileVertex) -> u32 {
        debug_assert!(self.vertices.len() < u32::MAX as usize, "vertex index overflow");
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Append a triangle. Indices must refer to existing vertices.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        debug_assert_eq!(self.primitive, Primitive::Triangles);
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append a line segment. Indices must refer to existing vertices.
    pub fn add_line(&mut self, a: u32, b: u32) {
        debug_assert_eq!(self.primitive, Primitive::Lines);
        self.indices.extend_from_slice(&[a, b]);
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles or line segments, depending on `primitive`.
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.primitive.indices_per_primitive()
    }

    /// True if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// True if every index refers to an existing vertex.
    #[must_use]
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len() as u32;
        self.indices.iter().all(|&i| i < count)
    }

    /// Raw vertex bytes for GPU upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
