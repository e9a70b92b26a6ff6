//! Scene resources: procedural meshes, textures and the libraries that hand
//! out opaque handles for them.
//!
//! The renderer and frame composer consume resources by handle, never by raw
//! vertex data or file paths.
//!
//! # Invariants
//! - Every mesh in a library has validated indices (triangles, in range).
//! - Each resource name maps to exactly one handle for the life of a library.
//! - Identical mesh content registered twice shares one handle.

mod error;
pub mod library;
pub mod manifest;
pub mod mesh;
pub mod shapes;
pub mod texture;

pub use error::AssetError;
pub use library::{MeshLibrary, TextureLibrary};
pub use manifest::{MeshEntry, ObjectEntry, SceneAssets, SceneManifest, TextureEntry, TransformSpec};
pub use mesh::{MeshBuilder, MeshData, Vertex};
pub use shapes::MeshShape;
pub use texture::{MAX_TEXTURE_SIZE, TextureImage, TextureSource};
