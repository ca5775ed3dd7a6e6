/// Geometry primitives and the deduplicating mesh builder
use std::collections::HashMap;

use nalgebra::{Point3, Vector2, Vector3};

/// Absolute per-component tolerance under which two vertices are
/// considered the same during mesh construction. Applies to position and
/// normal; texture coordinates do not participate in the comparison.
pub const MERGE_EPSILON: f32 = 1.0e-4;

/// A 3D vertex with position, normal and texture coordinate
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub tex_coord: Vector2<f32>,
}

impl Vertex {
    #[allow(clippy::too_many_arguments)]
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32, u: f32, v: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
            tex_coord: Vector2::new(u, v),
        }
    }
}

fn within_epsilon(a: &Vertex, b: &Vertex) -> bool {
    let components = [
        (a.position.x, b.position.x),
        (a.position.y, b.position.y),
        (a.position.z, b.position.z),
        (a.normal.x, b.normal.x),
        (a.normal.y, b.normal.y),
        (a.normal.z, b.normal.z),
    ];
    components.iter().all(|(x, y)| (x - y).abs() < MERGE_EPSILON)
}

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Degenerate box at the origin, the bounds of an empty mesh
    pub fn zero() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }

    /// Identity element for [`Aabb::extend`]: every extend replaces it
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn extend(&mut self, other: &Aabb) {
        self.min.x = self.min.x.min(other.min.x);
        self.min.y = self.min.y.min(other.min.y);
        self.min.z = self.min.z.min(other.min.z);
        self.max.x = self.max.x.max(other.max.x);
        self.max.y = self.max.y.max(other.max.y);
        self.max.z = self.max.z.max(other.max.z);
    }

    pub fn extend_point(&mut self, point: Point3<f32>) {
        self.extend(&Aabb::from_point(point));
    }

    /// Smallest box containing every box in the iterator
    pub fn union(boxes: impl IntoIterator<Item = Aabb>) -> Self {
        let mut extents = Self::empty();
        for bounds in boxes {
            extents.extend(&bounds);
        }
        extents
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vector3<f32> {
        self.size() * 0.5
    }
}

/// An indexed triangle mesh.
///
/// Invariants upheld by construction: every index is a valid position in
/// `vertices`, and `indices.len()` is a multiple of three. Meshes are
/// immutable once built.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Bounds of the untransformed vertex positions; a zero box when the
    /// mesh has no vertices.
    pub fn bounding_box(&self) -> Aabb {
        let mut vertices = self.vertices.iter();
        let Some(first) = vertices.next() else {
            return Aabb::zero();
        };
        let mut bounds = Aabb::from_point(first.position);
        for vertex in vertices {
            bounds.extend_point(vertex.position);
        }
        bounds
    }

    /// Axis-aligned cube with per-face normals and texture coordinates,
    /// used as the fallback model when no file is given.
    pub fn cube(size: f32) -> Self {
        // corner positions in units of the half-extent, CCW from outside
        const FACES: [([[f32; 3]; 4], [f32; 3]); 6] = [
            // Front
            (
                [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
                [0.0, 0.0, 1.0],
            ),
            // Back
            (
                [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
                [0.0, 0.0, -1.0],
            ),
            // Top
            (
                [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
                [0.0, 1.0, 0.0],
            ),
            // Bottom
            (
                [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
                [0.0, -1.0, 0.0],
            ),
            // Right
            (
                [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
                [1.0, 0.0, 0.0],
            ),
            // Left
            (
                [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
                [-1.0, 0.0, 0.0],
            ),
        ];
        const UV: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let half = size / 2.0;
        let mut builder = MeshBuilder::new();
        for (corners, normal) in FACES {
            let quad: Vec<Vertex> = corners
                .iter()
                .zip(UV.iter())
                .map(|(corner, uv)| {
                    Vertex::new(
                        corner[0] * half,
                        corner[1] * half,
                        corner[2] * half,
                        normal[0],
                        normal[1],
                        normal[2],
                        uv[0],
                        uv[1],
                    )
                })
                .collect();
            builder.push_triangle(quad[0], quad[1], quad[2]);
            builder.push_triangle(quad[0], quad[2], quad[3]);
        }
        builder.build()
    }
}

/// Incremental mesh construction with epsilon-tolerant vertex reuse.
///
/// Candidate vertices are bucketed on a grid of [`MERGE_EPSILON`]-sized
/// cells keyed by quantized position. Two vertices within the tolerance
/// land either in the same cell or in adjacent ones, so a lookup only has
/// to visit the 27 surrounding buckets instead of every emitted vertex.
/// When several emitted vertices match, the earliest one wins, exactly as
/// a linear front-to-back scan would behave.
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    cells: HashMap<(i64, i64, i64), Vec<u32>>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            cells: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append one triangle, reusing previously emitted vertices where the
    /// position and normal match within [`MERGE_EPSILON`].
    pub fn push_triangle(&mut self, a: Vertex, b: Vertex, c: Vertex) {
        for vertex in [a, b, c] {
            let index = self.intern(vertex);
            self.indices.push(index);
        }
    }

    pub fn build(self) -> Mesh {
        Mesh {
            vertices: self.vertices,
            indices: self.indices,
        }
    }

    fn intern(&mut self, vertex: Vertex) -> u32 {
        let (cx, cy, cz) = cell_of(&vertex.position);
        let mut found: Option<u32> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &index in bucket {
                        if within_epsilon(&self.vertices[index as usize], &vertex) {
                            found = Some(found.map_or(index, |best| best.min(index)));
                        }
                    }
                }
            }
        }
        if let Some(index) = found {
            return index;
        }
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        self.cells.entry((cx, cy, cz)).or_default().push(index);
        index
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_of(position: &Point3<f32>) -> (i64, i64, i64) {
    let quantize = |value: f32| (value as f64 / MERGE_EPSILON as f64).floor() as i64;
    (
        quantize(position.x),
        quantize(position.y),
        quantize(position.z),
    )
}
