use townview_common::{MeshHandle, TextureHandle};

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("mesh {0:?} has no vertices or indices")]
    EmptyMesh(MeshHandle),
    #[error("texture {0:?} has a zero dimension")]
    EmptyTexture(TextureHandle),
    #[error("texture {handle:?} is {width}x{height}, device limit is {limit}")]
    TextureTooLarge {
        handle: TextureHandle,
        width: u32,
        height: u32,
        limit: u32,
    },
    #[error("texture {handle:?} has {actual} bytes of pixels, expected {expected}")]
    PixelSizeMismatch {
        handle: TextureHandle,
        expected: usize,
        actual: usize,
    },
}
