/// Dragon Terminal - animated procedural dragon in the terminal
///
/// Controls:
///   - WASD / Arrow Keys: Rotate the view
///   - E/R: Roll rotation
///   - +/-: Lengthen or shorten the body
///   - Space: Pause the swimming animation
///   - 0: Reset the animation phase
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use dragon_core::{build_ring_angles, generate, stl, DragonGenerator, ShapeParameters};
use dragon_terminal::{Scene, TerminalApp};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "dragon-terminal")]
#[command(about = "Procedural dragon body generator and terminal viewer")]
#[command(version)]
struct Cli {
    /// Shape parameters (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write one frame to this STL file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Export binary STL instead of ASCII
    #[arg(long, requires = "export")]
    binary: bool,

    /// Animation phase of the exported frame
    #[arg(long, default_value_t = 0.0)]
    phase: f32,

    /// View a static STL file instead of the dragon
    #[arg(long, conflicts_with_all = ["export", "config"])]
    stl: Option<PathBuf>,

    /// Log to this file (the interactive viewer owns the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn log_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = log_filter();

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if cli.export.is_some() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    if let Some(path) = &cli.stl {
        let data =
            fs::read(path).with_context(|| format!("Failed to read STL file {}", path.display()))?;
        let mesh = stl::parse_stl(&data)
            .with_context(|| format!("Failed to parse STL file {}", path.display()))?;
        tracing::info!(triangles = mesh.triangle_count(), "Loaded {:?}", path);

        return TerminalApp::new(Scene::Static(mesh))?
            .run()
            .context("Terminal viewer failed");
    }

    let params = match &cli.config {
        Some(path) => ShapeParameters::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ShapeParameters::default(),
    };

    if let Some(path) = &cli.export {
        let ring = build_ring_angles(params.points, params.spine_width);
        let dragon = generate(&params, &ring, cli.phase)?;

        let mut writer = BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        if cli.binary {
            stl::write_binary_stl(&dragon.buffers, &mut writer)?;
        } else {
            stl::write_ascii_stl(&dragon.buffers, "dragon", &mut writer)?;
        }

        tracing::info!(
            vertices = dragon.buffers.vertex_count(),
            triangles = dragon.buffers.triangle_count(),
            "Exported {:?}",
            path
        );
        return Ok(());
    }

    TerminalApp::new(Scene::Dragon(DragonGenerator::new(params)))?
        .run()
        .context("Terminal viewer failed")
}
