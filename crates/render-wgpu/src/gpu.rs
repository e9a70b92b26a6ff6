use crate::error::GpuError;
use crate::resources::{GpuMesh, GpuTexture};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use townview_assets::{MeshData, SceneAssets, TextureImage, Vertex};
use townview_common::{MeshHandle, TextureHandle};
use townview_render::{ComposedFrame, Renderer};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

const DRAW_UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniforms>() as u64;
const INITIAL_DRAW_SLOTS: u32 = 16;

/// Counts from one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draws: u32,
    /// Items whose mesh or texture was never uploaded.
    pub skipped: u32,
}

/// wgpu renderer for composed frames.
///
/// Owns the uploaded meshes and textures keyed by handle. Every draw gets its
/// own slot in one uniform buffer, selected with a dynamic offset.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_stride: u64,
    draw_slots: u32,
    meshes: BTreeMap<MeshHandle, GpuMesh>,
    textures: BTreeMap<TextureHandle, GpuTexture>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(DRAW_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&draw_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                        2 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Ground and roof faces are seen from both sides.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let draw_stride = DRAW_UNIFORM_SIZE.div_ceil(alignment) * alignment;
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_slots(device, &draw_layout, draw_stride, INITIAL_DRAW_SLOTS);

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            texture_layout,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            draw_slots: INITIAL_DRAW_SLOTS,
            meshes: BTreeMap::new(),
            textures: BTreeMap::new(),
            depth_texture,
            surface_format,
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Upload one mesh under `handle`, replacing any earlier upload.
    pub fn create_mesh(
        &mut self,
        device: &wgpu::Device,
        handle: MeshHandle,
        mesh: &MeshData,
    ) -> Result<(), GpuError> {
        let gpu = GpuMesh::upload(device, handle, mesh)?;
        self.meshes.insert(handle, gpu);
        Ok(())
    }

    /// Upload one texture under `handle`, replacing any earlier upload.
    pub fn create_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: TextureHandle,
        image: &TextureImage,
    ) -> Result<(), GpuError> {
        let gpu = GpuTexture::upload(device, queue, &self.texture_layout, handle, image)?;
        self.textures.insert(handle, gpu);
        Ok(())
    }

    /// Upload every mesh and texture in the scene.
    pub fn upload_scene(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets: &SceneAssets,
    ) -> Result<(), GpuError> {
        for (handle, mesh) in assets.meshes.iter() {
            self.create_mesh(device, handle, mesh)?;
        }
        for (handle, image) in assets.textures.iter() {
            self.create_texture(device, queue, handle, image)?;
        }
        tracing::info!(
            meshes = self.meshes.len(),
            textures = self.textures.len(),
            "scene uploaded to GPU"
        );
        Ok(())
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Bind this renderer to one surface texture so it can be driven through
    /// the [`Renderer`] trait.
    pub fn target<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        view: &'a wgpu::TextureView,
    ) -> FrameTarget<'a> {
        FrameTarget {
            renderer: self,
            device,
            queue,
            view,
        }
    }

    /// Render one composed frame: black clear, then one indexed draw per item
    /// in submission order.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &ComposedFrame,
    ) -> RenderStats {
        self.reserve_draw_slots(device, frame.items.len() as u32);

        let mut staging = vec![0u8; self.draw_stride as usize * frame.items.len()];
        for (i, item) in frame.items.iter().enumerate() {
            let uniforms = DrawUniforms {
                model: item.model.to_cols_array_2d(),
                view: item.view.to_cols_array_2d(),
                projection: item.projection.to_cols_array_2d(),
            };
            let offset = i * self.draw_stride as usize;
            staging[offset..offset + DRAW_UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&uniforms));
        }
        if !staging.is_empty() {
            queue.write_buffer(&self.draw_buffer, 0, &staging);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let mut stats = RenderStats::default();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            for (i, item) in frame.items.iter().enumerate() {
                let (Some(mesh), Some(texture)) =
                    (self.meshes.get(&item.mesh), self.textures.get(&item.texture))
                else {
                    tracing::warn!(
                        mesh = ?item.mesh,
                        texture = ?item.texture,
                        "draw item references a resource that was never uploaded"
                    );
                    stats.skipped += 1;
                    continue;
                };

                let offset = (i as u64 * self.draw_stride) as u32;
                pass.set_bind_group(0, &self.draw_bind_group, &[offset]);
                pass.set_bind_group(1, texture.bind_group(), &[]);
                mesh.bind(&mut pass);
                pass.draw_indexed(0..mesh.index_count(), 0, 0..1);
                stats.draws += 1;
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        tracing::trace!(index = frame.index, draws = stats.draws, "frame submitted");
        stats
    }

    fn reserve_draw_slots(&mut self, device: &wgpu::Device, needed: u32) {
        if needed <= self.draw_slots {
            return;
        }
        let slots = needed.next_power_of_two();
        let (buffer, bind_group) =
            Self::create_draw_slots(device, &self.draw_layout, self.draw_stride, slots);
        self.draw_buffer.destroy();
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_slots = slots;
        tracing::debug!(slots, "grew per-draw uniform buffer");
    }

    fn create_draw_slots(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        slots: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_uniform_buffer"),
            size: stride * slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(DRAW_UNIFORM_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// A [`WgpuRenderer`] bound to the device, queue and surface view of one frame.
pub struct FrameTarget<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    view: &'a wgpu::TextureView,
}

impl Renderer for FrameTarget<'_> {
    type Output = RenderStats;

    fn render(&mut self, frame: &ComposedFrame) -> RenderStats {
        self.renderer
            .render(self.device, self.queue, self.view, frame)
    }
}
