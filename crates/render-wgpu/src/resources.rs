use crate::error::GpuError;
use image::imageops::FilterType;
use townview_assets::{MeshData, TextureImage};
use townview_common::{MeshHandle, TextureHandle};
use wgpu::util::DeviceExt;

/// Vertex and index buffers for one mesh. Released on drop.
pub struct GpuMesh {
    handle: MeshHandle,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn upload(
        device: &wgpu::Device,
        handle: MeshHandle,
        mesh: &MeshData,
    ) -> Result<Self, GpuError> {
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return Err(GpuError::EmptyMesh(handle));
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Index buffer writes must be 4-byte aligned.
        let mut indices = mesh.indices.clone();
        if indices.len() % 2 == 1 {
            indices.push(0);
        }
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::debug!(
            ?handle,
            vertices = mesh.vertices.len(),
            triangles = mesh.triangle_count(),
            "mesh uploaded"
        );

        Ok(Self {
            handle,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }

    pub fn handle(&self) -> MeshHandle {
        self.handle
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        tracing::debug!(handle = ?self.handle, "mesh released");
    }
}

/// Sampled texture with its full mip chain and bind group. Released on drop.
pub struct GpuTexture {
    handle: TextureHandle,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    mip_levels: u32,
}

impl GpuTexture {
    /// Upload `image` with a generated mip chain, repeat wrapping and linear
    /// filtering.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        handle: TextureHandle,
        image: &TextureImage,
    ) -> Result<Self, GpuError> {
        if image.width == 0 || image.height == 0 {
            return Err(GpuError::EmptyTexture(handle));
        }
        let limit = device.limits().max_texture_dimension_2d;
        if image.width > limit || image.height > limit {
            return Err(GpuError::TextureTooLarge {
                handle,
                width: image.width,
                height: image.height,
                limit,
            });
        }

        let levels = mip_chain(image).ok_or(GpuError::PixelSizeMismatch {
            handle,
            expected: (image.width as usize) * (image.height as usize) * 4,
            actual: image.pixels.len(),
        })?;
        let mip_levels = levels.len() as u32;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("object_texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, mip) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                mip.pixels.as_slice(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(mip.row_bytes()),
                    rows_per_image: Some(mip.height),
                },
                wgpu::Extent3d {
                    width: mip.width,
                    height: mip.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&Default::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("object_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        tracing::debug!(
            ?handle,
            width = image.width,
            height = image.height,
            mip_levels,
            "texture uploaded"
        );

        Ok(Self {
            handle,
            texture,
            bind_group,
            mip_levels,
        })
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.texture.destroy();
        tracing::debug!(handle = ?self.handle, "texture released");
    }
}

/// Full mip chain for `image`, level 0 first, halving down to 1x1.
///
/// Returns `None` when the pixel buffer does not match the dimensions.
pub fn mip_chain(image: &TextureImage) -> Option<Vec<TextureImage>> {
    let base = image::RgbaImage::from_raw(image.width, image.height, image.pixels.clone())?;
    let levels = 32 - image.width.max(image.height).max(1).leading_zeros();

    let mut chain = vec![image.clone()];
    let mut previous = base;
    for _ in 1..levels {
        let width = (previous.width() / 2).max(1);
        let height = (previous.height() / 2).max(1);
        let next = image::imageops::resize(&previous, width, height, FilterType::Triangle);
        chain.push(TextureImage {
            width,
            height,
            pixels: next.as_raw().clone(),
        });
        previous = next;
    }
    Some(chain)
}
