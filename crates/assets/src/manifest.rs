use crate::error::AssetError;
use crate::library::{MeshLibrary, TextureLibrary};
use crate::shapes::MeshShape;
use crate::texture::TextureSource;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use townview_common::{SceneObject, Transform};

/// Design-time placement of an object: scale, then rotate, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSpec {
    pub scale: Vec3,
    pub rotation_axis: Vec3,
    pub rotation_degrees: f32,
    pub translation: Vec3,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_axis: Vec3::Y,
            rotation_degrees: 0.0,
            translation: Vec3::ZERO,
        }
    }
}

impl TransformSpec {
    pub fn to_transform(&self) -> Transform {
        Transform::from_scale_rotation_translation(
            self.scale,
            self.rotation_axis,
            self.rotation_degrees,
            self.translation,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshEntry {
    pub name: String,
    pub shape: MeshShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureEntry {
    pub name: String,
    pub source: TextureSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    pub mesh: String,
    pub texture: String,
    #[serde(default)]
    pub transform: TransformSpec,
}

/// Declarative description of a scene. Objects draw in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    pub meshes: Vec<MeshEntry>,
    pub textures: Vec<TextureEntry>,
    pub objects: Vec<ObjectEntry>,
}

/// Everything a manifest resolves to.
#[derive(Debug, Clone, Default)]
pub struct SceneAssets {
    pub meshes: MeshLibrary,
    pub textures: TextureLibrary,
    pub objects: Vec<SceneObject>,
}

impl SceneManifest {
    /// The town: a stepped brick building, a grass ground plane and a
    /// concrete gabled house, all sharing one placement in front of the
    /// camera.
    pub fn builtin() -> Self {
        let placement = TransformSpec {
            scale: Vec3::splat(2.0),
            rotation_axis: Vec3::Y,
            rotation_degrees: 15.0,
            translation: Vec3::new(0.0, 0.0, -14.0),
        };
        let object = |name: &str, mesh: &str, texture: &str| ObjectEntry {
            name: name.into(),
            mesh: mesh.into(),
            texture: texture.into(),
            transform: placement,
        };

        Self {
            meshes: vec![
                MeshEntry {
                    name: "building".into(),
                    shape: MeshShape::SteppedBuilding { uv_repeat: 2.0 },
                },
                MeshEntry {
                    name: "ground".into(),
                    shape: MeshShape::GroundPlane {
                        half_extent: 3.0,
                        y: -0.5,
                        uv_repeat: 2.0,
                    },
                },
                MeshEntry {
                    name: "house".into(),
                    shape: MeshShape::GabledHouse {
                        min: Vec3::new(0.75, -0.5, -0.5),
                        max: Vec3::new(1.75, 0.0, 0.5),
                        ridge_height: 0.4,
                        uv_repeat: 2.0,
                    },
                },
            ],
            textures: vec![
                TextureEntry {
                    name: "bricks".into(),
                    source: TextureSource::Bricks {
                        size: 128,
                        brick: [150, 60, 45, 255],
                        mortar: [200, 200, 190, 255],
                    },
                },
                TextureEntry {
                    name: "grass".into(),
                    source: TextureSource::Checker {
                        size: 128,
                        cells: 16,
                        a: [70, 140, 50, 255],
                        b: [60, 120, 40, 255],
                    },
                },
                TextureEntry {
                    name: "concrete".into(),
                    source: TextureSource::Checker {
                        size: 128,
                        cells: 8,
                        a: [150, 150, 150, 255],
                        b: [135, 135, 135, 255],
                    },
                },
            ],
            objects: vec![
                object("building", "building", "bricks"),
                object("ground", "ground", "grass"),
                object("house", "house", "concrete"),
            ],
        }
    }

    /// Read a manifest from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let manifest: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(manifest)
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Generate every mesh, load every texture, and resolve objects to handles.
    ///
    /// Relative texture paths are resolved against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<SceneAssets, AssetError> {
        let mut meshes = MeshLibrary::new();
        for entry in &self.meshes {
            meshes.insert(&entry.name, entry.shape.build())?;
        }

        let mut textures = TextureLibrary::new();
        for entry in &self.textures {
            textures.load(&entry.name, &entry.source, base_dir)?;
        }

        let objects = self
            .objects
            .iter()
            .map(|entry| {
                let mesh = meshes
                    .handle(&entry.mesh)
                    .ok_or_else(|| AssetError::UnknownMesh(entry.mesh.clone()))?;
                let texture = textures
                    .handle(&entry.texture)
                    .ok_or_else(|| AssetError::UnknownTexture(entry.texture.clone()))?;
                Ok(SceneObject::new(
                    entry.name.clone(),
                    entry.transform.to_transform(),
                    mesh,
                    texture,
                ))
            })
            .collect::<Result<Vec<_>, AssetError>>()?;

        tracing::info!(
            meshes = meshes.len(),
            textures = textures.len(),
            objects = objects.len(),
            "scene assets loaded"
        );

        Ok(SceneAssets {
            meshes,
            textures,
            objects,
        })
    }
}
