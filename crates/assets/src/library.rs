use crate::error::AssetError;
use crate::mesh::{MeshData, Vertex};
use crate::texture::{TextureImage, TextureSource};
use std::collections::BTreeMap;
use std::path::Path;
use townview_common::{MeshHandle, TextureHandle};

/// Load-once mesh storage keyed by name.
///
/// Handles index into the library and stay valid for its lifetime. Two names
/// registering byte-identical geometry share one handle.
#[derive(Debug, Clone, Default)]
pub struct MeshLibrary {
    meshes: Vec<MeshData>,
    names: BTreeMap<String, MeshHandle>,
    /// Digest to every handle stored under it; more than one only on a collision.
    by_content: BTreeMap<[u8; 32], Vec<MeshHandle>>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a mesh built from raw vertex and index lists.
    pub fn create_mesh(
        &mut self,
        name: &str,
        vertices: Vec<Vertex>,
        indices: Vec<u16>,
    ) -> Result<MeshHandle, AssetError> {
        self.insert(name, MeshData::new(vertices, indices))
    }

    /// Validate and register `mesh` under `name`.
    pub fn insert(&mut self, name: &str, mesh: MeshData) -> Result<MeshHandle, AssetError> {
        if self.names.contains_key(name) {
            return Err(AssetError::DuplicateName {
                kind: "mesh",
                name: name.to_string(),
            });
        }
        mesh.validate(name)?;

        let hash = mesh.content_hash();
        let shared = self.by_content.get(&hash).and_then(|handles| {
            handles
                .iter()
                .copied()
                .find(|h| self.meshes[h.0 as usize] == mesh)
        });
        let handle = match shared {
            Some(existing) => {
                tracing::debug!(name, ?existing, "mesh content already loaded, sharing handle");
                existing
            }
            None => {
                let handle = MeshHandle(self.meshes.len() as u32);
                tracing::debug!(
                    name,
                    ?handle,
                    vertices = mesh.vertices.len(),
                    triangles = mesh.triangle_count(),
                    "registered mesh"
                );
                self.meshes.push(mesh);
                self.by_content.entry(hash).or_default().push(handle);
                handle
            }
        };
        self.names.insert(name.to_string(), handle);
        Ok(handle)
    }

    pub fn handle(&self, name: &str) -> Option<MeshHandle> {
        self.names.get(name).copied()
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(handle.0 as usize)
    }

    /// Distinct meshes in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (MeshHandle, &MeshData)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| (MeshHandle(i as u32), mesh))
    }

    /// Number of distinct meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Load-once texture storage keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TextureLibrary {
    images: Vec<TextureImage>,
    names: BTreeMap<String, TextureHandle>,
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `source` and register it under `name`.
    pub fn load(
        &mut self,
        name: &str,
        source: &TextureSource,
        base_dir: &Path,
    ) -> Result<TextureHandle, AssetError> {
        if self.names.contains_key(name) {
            return Err(AssetError::DuplicateName {
                kind: "texture",
                name: name.to_string(),
            });
        }
        let image = source.load(base_dir)?;
        self.insert(name, image)
    }

    /// Register already decoded pixels under `name`.
    pub fn insert(&mut self, name: &str, image: TextureImage) -> Result<TextureHandle, AssetError> {
        if self.names.contains_key(name) {
            return Err(AssetError::DuplicateName {
                kind: "texture",
                name: name.to_string(),
            });
        }
        if image.width == 0 || image.height == 0 {
            return Err(AssetError::EmptyTexture {
                name: name.to_string(),
                width: image.width,
                height: image.height,
            });
        }
        let handle = TextureHandle(self.images.len() as u32);
        tracing::debug!(name, ?handle, image.width, image.height, "registered texture");
        self.images.push(image);
        self.names.insert(name.to_string(), handle);
        Ok(handle)
    }

    pub fn handle(&self, name: &str) -> Option<TextureHandle> {
        self.names.get(name).copied()
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureImage> {
        self.images.get(handle.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, &TextureImage)> {
        self.images
            .iter()
            .enumerate()
            .map(|(i, image)| (TextureHandle(i as u32), image))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn create_mesh_assigns_sequential_handles() {
        let mut lib = MeshLibrary::new();
        let a = lib.insert("building", shapes::stepped_building(1.0)).unwrap();
        let ground = shapes::ground_plane(3.0, -0.5, 1.0);
        let b = lib
            .create_mesh("ground", ground.vertices, ground.indices)
            .unwrap();
        assert_eq!(a, MeshHandle(0));
        assert_eq!(b, MeshHandle(1));
        assert_eq!(lib.handle("ground"), Some(b));
        assert_eq!(lib.get(b).unwrap().triangle_count(), 2);
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn identical_geometry_shares_a_handle() {
        let mut lib = MeshLibrary::new();
        let a = lib.insert("left", shapes::stepped_building(1.0)).unwrap();
        let b = lib.insert("right", shapes::stepped_building(1.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.handle("right"), Some(a));
    }

    #[test]
    fn digest_match_with_different_geometry_gets_its_own_handle() {
        let mut lib = MeshLibrary::new();
        let building = lib.insert("building", shapes::stepped_building(1.0)).unwrap();
        let ground = shapes::ground_plane(1.0, 0.0, 1.0);
        // File the building under the ground's digest as a colliding entry.
        lib.by_content
            .entry(ground.content_hash())
            .or_default()
            .push(building);

        let handle = lib.insert("ground", ground.clone()).unwrap();
        assert_ne!(handle, building);
        assert_eq!(lib.get(handle), Some(&ground));
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn duplicate_and_invalid_meshes_are_rejected() {
        let mut lib = MeshLibrary::new();
        lib.insert("m", shapes::stepped_building(1.0)).unwrap();
        assert!(matches!(
            lib.insert("m", shapes::ground_plane(1.0, 0.0, 1.0)),
            Err(AssetError::DuplicateName { kind: "mesh", .. })
        ));
        assert!(matches!(
            lib.create_mesh("empty", Vec::new(), Vec::new()),
            Err(AssetError::EmptyMesh(_))
        ));
        assert_eq!(lib.handle("empty"), None);
    }

    #[test]
    fn texture_library_loads_generated_sources() {
        let mut lib = TextureLibrary::new();
        let source = TextureSource::Checker {
            size: 8,
            cells: 2,
            a: [0, 0, 0, 255],
            b: [255, 255, 255, 255],
        };
        let h = lib.load("checker", &source, Path::new(".")).unwrap();
        assert_eq!(h, TextureHandle(0));
        assert_eq!(lib.get(h).unwrap().width, 8);
        assert!(matches!(
            lib.load("checker", &source, Path::new(".")),
            Err(AssetError::DuplicateName { kind: "texture", .. })
        ));
    }

    #[test]
    fn empty_texture_is_rejected() {
        let mut lib = TextureLibrary::new();
        let err = lib
            .insert(
                "blank",
                TextureImage {
                    width: 0,
                    height: 4,
                    pixels: Vec::new(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, AssetError::EmptyTexture { width: 0, .. }));
        assert!(lib.is_empty());
    }
}
