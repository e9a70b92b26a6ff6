use crate::error::AssetError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest texture side accepted from a manifest. Matches the smallest
/// `max_texture_dimension_2d` a desktop GPU adapter reports by default.
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// Decoded RGBA8 pixels, bottom row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Two-color checkerboard, `cells` squares per side.
    pub fn checker(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                pixels.extend_from_slice(&color);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Staggered running-bond brick pattern with mortar lines.
    pub fn bricks(size: u32, brick: [u8; 4], mortar: [u8; 4]) -> Self {
        let size = size.max(8);
        let row_height = size / 8;
        let brick_width = size / 4;
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            let row = y / row_height;
            let offset = if row % 2 == 0 { 0 } else { brick_width / 2 };
            for x in 0..size {
                let in_mortar = y % row_height == 0 || (x + offset) % brick_width == 0;
                pixels.extend_from_slice(if in_mortar { &mortar } else { &brick });
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    /// Byte length of one row.
    pub fn row_bytes(&self) -> u32 {
        self.width * 4
    }
}

/// Where a texture's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureSource {
    /// Image file, relative paths resolved against the manifest directory.
    File { path: PathBuf },
    Checker {
        size: u32,
        cells: u32,
        a: [u8; 4],
        b: [u8; 4],
    },
    Bricks {
        size: u32,
        brick: [u8; 4],
        mortar: [u8; 4],
    },
}

impl TextureSource {
    /// Produce the pixels for this source.
    pub fn load(&self, base_dir: &Path) -> Result<TextureImage, AssetError> {
        match self {
            Self::File { path } => load_image_file(&base_dir.join(path)),
            Self::Checker { size, cells, a, b } => {
                check_size(*size, *size)?;
                Ok(TextureImage::checker(*size, *cells, *a, *b))
            }
            Self::Bricks {
                size,
                brick,
                mortar,
            } => {
                check_size(*size, *size)?;
                Ok(TextureImage::bricks(*size, *brick, *mortar))
            }
        }
    }
}

fn check_size(width: u32, height: u32) -> Result<(), AssetError> {
    if width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
        return Err(AssetError::TextureTooLarge {
            width,
            height,
            max: MAX_TEXTURE_SIZE,
        });
    }
    Ok(())
}

/// Decode any supported image, convert to RGBA8, and flip it so the first
/// row in memory is the bottom of the picture (v = 0 at the bottom edge).
fn load_image_file(path: &Path) -> Result<TextureImage, AssetError> {
    let decoded = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        color = ?decoded.color(),
        "decoded texture image"
    );
    check_size(decoded.width(), decoded.height())?;
    let mut rgba = decoded.to_rgba8();
    image::imageops::flip_vertical_in_place(&mut rgba);
    let (width, height) = rgba.dimensions();
    Ok(TextureImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
