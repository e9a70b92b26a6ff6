mod hud;
mod keymap;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use townview_assets::{SceneAssets, SceneManifest};
use townview_camera::ProjectionMode;
use townview_common::{Viewport, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use townview_render::{ComposedFrame, Renderer};
use townview_render_wgpu::WgpuRenderer;
use townview_viewer::{AppState, SystemClock, ViewerConfig};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixel scroll deltas (touchpads) are converted to wheel lines at this rate.
const PIXELS_PER_LINE: f32 = 20.0;

#[derive(Parser)]
#[command(name = "townview-desktop", about = "Fly through a small textured town")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene manifest (JSON). The built-in town is used when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Viewer settings (JSON): camera start pose, speeds, projection.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start in orthographic projection
    #[arg(long)]
    orthographic: bool,
}

/// Surface, device and the renderers that draw into it.
struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(window: Arc<Window>, egui_ctx: &EguiContext, assets: &SceneAssets) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("townview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        renderer
            .upload_scene(&device, &queue, assets)
            .context("upload scene")?;

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            "GPU initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Draw the scene, then the HUD on top, and present.
    fn draw(
        &mut self,
        window: &Window,
        egui_ctx: &EguiContext,
        state: &AppState,
        frame: &ComposedFrame,
        show_hud: bool,
    ) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let stats = self
            .renderer
            .target(&self.device, &self.queue, &view)
            .render(frame);
        if stats.skipped > 0 {
            tracing::warn!(skipped = stats.skipped, "draws skipped this frame");
        }

        let raw_input = self.egui_winit.take_egui_input(window);
        let full_output = egui_ctx.run(raw_input, |ctx| hud::draw(ctx, state, show_hud));
        self.egui_winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct DesktopApp {
    state: AppState,
    assets: SceneAssets,
    clock: SystemClock,
    show_hud: bool,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    init_error: Option<anyhow::Error>,
}

impl DesktopApp {
    fn new(config: ViewerConfig, assets: SceneAssets) -> Self {
        let state = AppState::new(
            config,
            assets.objects.clone(),
            Viewport::new(WINDOW_WIDTH, WINDOW_HEIGHT),
        );
        Self {
            state,
            assets,
            clock: SystemClock::new(),
            show_hud: true,
            window: None,
            gpu: None,
            egui_ctx: EguiContext::default(),
            init_error: None,
        }
    }

    /// Stop the event loop with a fatal start-up error.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.init_error = Some(error);
        event_loop.exit();
    }

    /// Result of the run once the event loop has returned.
    fn finish(mut self) -> Result<()> {
        match self.init_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if key == KeyCode::F1 && pressed {
            self.show_hud = !self.show_hud;
            return;
        }
        if let Some(action) = keymap::action_for_key(key) {
            self.state.input_mut().handle_action(action, pressed);
        }
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("create window"));
                return;
            }
        };

        match Gpu::new(window.clone(), &self.egui_ctx, &self.assets) {
            Ok(gpu) => {
                let size = window.inner_size();
                self.state.resize(Viewport::new(size.width, size.height));
                self.gpu = Some(gpu);
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e.context("initialize GPU")),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(window), Some(gpu)) = (self.window.clone(), self.gpu.as_mut()) else {
            return;
        };

        let consumed = gpu.egui_winit.on_window_event(&window, &event).consumed;
        if consumed && !keymap::is_key_release(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                self.state
                    .resize(Viewport::new(new_size.width, new_size.height));
            }
            WindowEvent::Focused(false) => {
                self.state.input_mut().focus_lost();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state
                    .input_mut()
                    .cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.state.input_mut().scrolled(lines);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let action = match state {
                    ElementState::Pressed => "pressed",
                    ElementState::Released => "released",
                };
                tracing::info!(?button, "mouse button {action}");
            }
            WindowEvent::RedrawRequested => {
                let frame = self.state.advance(&mut self.clock);
                if self.state.should_exit() {
                    event_loop.exit();
                    return;
                }
                gpu.draw(&window, &self.egui_ctx, &self.state, &frame, self.show_hud);
                window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn load_scene(path: Option<&Path>) -> Result<SceneAssets> {
    let Some(path) = path else {
        return Ok(SceneManifest::builtin().build(Path::new("."))?);
    };
    let manifest = SceneManifest::load(path)
        .with_context(|| format!("read scene manifest {}", path.display()))?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    manifest
        .build(base_dir)
        .with_context(|| format!("build scene from {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("townview-desktop starting");

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("read viewer config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if cli.orthographic {
        config.projection = ProjectionMode::Orthographic;
    }

    let assets = load_scene(cli.scene.as_deref())?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(config, assets);
    event_loop.run_app(&mut app)?;

    tracing::info!("townview-desktop exiting");
    app.finish()
}
