mod script;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use townview_assets::{SceneAssets, SceneManifest};
use townview_camera::ProjectionMode;
use townview_common::Viewport;
use townview_render::DebugTextRenderer;
use townview_viewer::{AppState, FixedClock, ViewerConfig, run_frames};

#[derive(Parser)]
#[command(name = "townview-cli", about = "Headless tools for the town viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and a summary of the scene
    Info {
        /// Scene manifest (JSON). The built-in town is used when omitted.
        #[arg(long)]
        scene: Option<PathBuf>,
    },
    /// Run frames headlessly and print each composed frame
    Frames(FramesArgs),
    /// Scene manifest utilities
    #[command(subcommand)]
    Manifest(ManifestCommand),
}

#[derive(Args)]
struct FramesArgs {
    /// Number of frames to run
    #[arg(short = 'n', long, default_value = "3")]
    frames: u32,
    /// Seconds per frame
    #[arg(long, default_value = "0.016")]
    dt: f32,
    /// Viewport width in pixels
    #[arg(long, default_value_t = townview_common::WINDOW_WIDTH)]
    width: u32,
    /// Viewport height in pixels
    #[arg(long, default_value_t = townview_common::WINDOW_HEIGHT)]
    height: u32,
    /// Input script, e.g. "0:+w;0:cursor=400,300;2:p;5:-w"
    #[arg(long, default_value = "")]
    script: String,
    /// Scene manifest (JSON). The built-in town is used when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Viewer settings (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start in orthographic projection
    #[arg(long)]
    orthographic: bool,
}

#[derive(Subcommand)]
enum ManifestCommand {
    /// Write the built-in town manifest as JSON
    Export { path: PathBuf },
    /// Load a manifest and build every resource it names
    Validate { path: PathBuf },
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

fn print_scene(assets: &SceneAssets) {
    let triangles: usize = assets
        .meshes
        .iter()
        .map(|(_, mesh)| mesh.triangle_count())
        .sum();
    println!(
        "scene: meshes={}, textures={}, objects={}, triangles={}",
        assets.meshes.len(),
        assets.textures.len(),
        assets.objects.len(),
        triangles
    );
    for object in &assets.objects {
        let origin = object.model.w_axis;
        println!(
            "  {}: mesh={} texture={} origin=({:.2}, {:.2}, {:.2})",
            object.name, object.mesh.0, object.texture.0, origin.x, origin.y, origin.z
        );
    }
}

fn run_frames_command(args: FramesArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("read viewer config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if args.orthographic {
        config.projection = ProjectionMode::Orthographic;
    }

    let steps = script::parse_script(&args.script)?;
    let assets = load_scene(args.scene.as_deref())?;

    let mut state = AppState::new(
        config,
        assets.objects,
        Viewport::new(args.width, args.height),
    );
    let mut clock = FixedClock::new(args.dt);
    let mut renderer = DebugTextRenderer::new();

    let outputs = run_frames(
        &mut state,
        &mut clock,
        &mut renderer,
        args.frames,
        |frame, input| script::deliver(&steps, frame, input),
    );
    for output in &outputs {
        print!("{output}");
    }

    let camera = state.camera();
    let position = camera.position();
    println!(
        "Final: pos=({:.3}, {:.3}, {:.3}) yaw={:.2} pitch={:.2} zoom={:.2} projection={}{}",
        position.x,
        position.y,
        position.z,
        camera.yaw(),
        camera.pitch(),
        camera.zoom(),
        state.projection(),
        if state.should_exit() { " (exit requested)" } else { "" }
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { scene } => {
            println!("townview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", townview_render::crate_info());
            let config = ViewerConfig::default();
            println!(
                "camera: pos=({}, {}, {}) yaw={} pitch={} zoom={} speed={} sensitivity={}",
                config.camera.position.x,
                config.camera.position.y,
                config.camera.position.z,
                config.camera.yaw,
                config.camera.pitch,
                config.camera.zoom,
                config.camera.movement_speed,
                config.camera.mouse_sensitivity
            );
            print_scene(&load_scene(scene.as_deref())?);
        }
        Commands::Frames(args) => run_frames_command(args)?,
        Commands::Manifest(ManifestCommand::Export { path }) => {
            SceneManifest::builtin()
                .save(&path)
                .with_context(|| format!("write {}", path.display()))?;
            println!("wrote built-in scene manifest to {}", path.display());
        }
        Commands::Manifest(ManifestCommand::Validate { path }) => {
            let assets = load_scene(Some(&path))?;
            println!("{}: OK", path.display());
            print_scene(&assets);
        }
    }

    Ok(())
}
