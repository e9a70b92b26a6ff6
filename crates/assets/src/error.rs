use std::path::PathBuf;

/// Errors from loading or validating scene resources.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("mesh {0:?} has no triangles")]
    EmptyMesh(String),
    #[error("mesh {name:?} has {count} indices, not a multiple of 3")]
    PartialTriangle { name: String, count: usize },
    #[error("mesh {name:?} index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        name: String,
        index: u16,
        vertex_count: usize,
    },
    #[error("mesh {name:?} has {count} vertices, more than 16-bit indices can address")]
    TooManyVertices { name: String, count: usize },
    #[error("texture {name:?} is {width}x{height}; both sides must be non-zero")]
    EmptyTexture { name: String, width: u32, height: u32 },
    #[error("texture is {width}x{height}; sides are limited to {max}")]
    TextureTooLarge { width: u32, height: u32, max: u32 },
    #[error("{kind} {name:?} is already loaded")]
    DuplicateName { kind: &'static str, name: String },
    #[error("unknown mesh: {0:?}")]
    UnknownMesh(String),
    #[error("unknown texture: {0:?}")]
    UnknownTexture(String),
}
