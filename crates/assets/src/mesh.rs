use crate::error::AssetError;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use sha2::{Digest, Sha256};

/// Vertex color used when a builder is not told otherwise.
pub const DEFAULT_COLOR: [f32; 4] = [0.66, 0.66, 0.66, 1.0];

/// Interleaved vertex: position, RGBA color, texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

/// Triangle-list geometry with 16-bit indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check the mesh is a non-empty triangle list whose indices all land on
    /// a vertex.
    pub fn validate(&self, name: &str) -> Result<(), AssetError> {
        if self.indices.is_empty() || self.vertices.is_empty() {
            return Err(AssetError::EmptyMesh(name.to_string()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(AssetError::PartialTriangle {
                name: name.to_string(),
                count: self.indices.len(),
            });
        }
        if self.vertices.len() > u16::MAX as usize + 1 {
            return Err(AssetError::TooManyVertices {
                name: name.to_string(),
                count: self.vertices.len(),
            });
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(AssetError::IndexOutOfRange {
                name: name.to_string(),
                index,
                vertex_count: self.vertices.len(),
            });
        }
        Ok(())
    }

    /// SHA-256 of the vertex and index bytes.
    pub fn content_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.vertices.len() as u64).to_le_bytes());
        hasher.update(bytemuck::cast_slice::<Vertex, u8>(&self.vertices));
        hasher.update(bytemuck::cast_slice::<u16, u8>(&self.indices));
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        digest
    }
}

/// Accumulates quads and triangles into one indexed mesh.
///
/// Texture coordinates are planar per face and measured in world units times
/// `uv_repeat`, so a texture tiles at the same density on every face.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    color: [f32; 4],
    uv_repeat: f32,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            color: DEFAULT_COLOR,
            uv_repeat: 1.0,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Texture repeats per world unit.
    pub fn with_uv_repeat(mut self, uv_repeat: f32) -> Self {
        self.uv_repeat = uv_repeat;
        self
    }

    /// Quad `a b c d`, counter-clockwise seen from the front.
    pub fn quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> &mut Self {
        let width = (b - a).length() * self.uv_repeat;
        let height = (d - a).length() * self.uv_repeat;
        let base = self.vertices.len() as u16;
        self.push_vertex(a, [0.0, 0.0]);
        self.push_vertex(b, [width, 0.0]);
        self.push_vertex(c, [width, height]);
        self.push_vertex(d, [0.0, height]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        self
    }

    /// Triangle `a b c`, counter-clockwise seen from the front. `c` is the apex.
    pub fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) -> &mut Self {
        let ab = b - a;
        let base_len = ab.length();
        let along = if base_len > 0.0 {
            (c - a).dot(ab) / base_len
        } else {
            0.0
        };
        let apex_height = ((c - a).length_squared() - along * along).max(0.0).sqrt();
        let first = self.vertices.len() as u16;
        self.push_vertex(a, [0.0, 0.0]);
        self.push_vertex(b, [base_len * self.uv_repeat, 0.0]);
        self.push_vertex(c, [along * self.uv_repeat, apex_height * self.uv_repeat]);
        self.indices.extend_from_slice(&[first, first + 1, first + 2]);
        self
    }

    /// Axis-aligned box from `min` to `max`.
    pub fn cuboid(&mut self, min: Vec3, max: Vec3) -> &mut Self {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let v = Vec3::new;
        // +Z
        self.quad(v(x0, y0, z1), v(x1, y0, z1), v(x1, y1, z1), v(x0, y1, z1));
        // -Z
        self.quad(v(x1, y0, z0), v(x0, y0, z0), v(x0, y1, z0), v(x1, y1, z0));
        // +X
        self.quad(v(x1, y0, z1), v(x1, y0, z0), v(x1, y1, z0), v(x1, y1, z1));
        // -X
        self.quad(v(x0, y0, z0), v(x0, y0, z1), v(x0, y1, z1), v(x0, y1, z0));
        // +Y
        self.quad(v(x0, y1, z1), v(x1, y1, z1), v(x1, y1, z0), v(x0, y1, z0));
        // -Y
        self.quad(v(x0, y0, z0), v(x1, y0, z0), v(x1, y0, z1), v(x0, y0, z1));
        self
    }

    /// Pitched roof over the rectangle `min.xz..max.xz` at eave height `min.y`,
    /// ridge running along X at `min.y + ridge_height`.
    pub fn gable_roof(&mut self, min: Vec3, max: Vec3, ridge_height: f32) -> &mut Self {
        let (x0, x1, z0, z1) = (min.x, max.x, min.z, max.z);
        let eave = min.y;
        let ridge = eave + ridge_height;
        let mid = (z0 + z1) * 0.5;
        let v = Vec3::new;
        // Front and back slopes.
        self.quad(v(x0, eave, z1), v(x1, eave, z1), v(x1, ridge, mid), v(x0, ridge, mid));
        self.quad(v(x1, eave, z0), v(x0, eave, z0), v(x0, ridge, mid), v(x1, ridge, mid));
        // Gable ends.
        self.triangle(v(x0, eave, z0), v(x0, eave, z1), v(x0, ridge, mid));
        self.triangle(v(x1, eave, z1), v(x1, eave, z0), v(x1, ridge, mid));
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn build(self) -> MeshData {
        MeshData::new(self.vertices, self.indices)
    }

    fn push_vertex(&mut self, position: Vec3, uv: [f32; 2]) {
        self.vertices.push(Vertex {
            position: position.to_array(),
            color: self.color,
            uv,
        });
    }
}
