use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use adforge_core::{AdDescription, AdforgeConfig, LayoutKind, Point2D, RenderMode};
use adforge_render::{
    Compositor, FontBook, LocalImageSource, PassOutcome, RecordingSurface, Surface,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

const DEFAULT_CONFIG_FILE: &str = "adforge.toml";

#[derive(Parser)]
#[command(
    name = "adforge",
    version,
    about = "Adforge: render ad creatives from structured descriptions",
    long_about = "Adforge renders an ad description (title, subtitle, call to action, colors,\nlayout, background) into a PNG using one of four layouts."
)]
struct Cli {
    /// Path to adforge.toml (default: ./adforge.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an ad description JSON file to PNG
    Render {
        /// Path to the ad description JSON file
        #[arg()]
        file: PathBuf,

        /// Output file path (default: [output] file_name from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Surface mode: export (1080x1080) or edit (800x600)
        #[arg(long)]
        mode: Option<RenderMode>,

        /// Print a data:image/png;base64 URL instead of writing a file
        #[arg(long)]
        data_url: bool,
    },

    /// Print the surface calls a render pass makes, as JSON
    Ops {
        #[arg()]
        file: PathBuf,

        #[arg(long)]
        mode: Option<RenderMode>,
    },

    /// Report which element lies under a pointer position, as JSON
    Pick {
        #[arg()]
        file: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        x: f32,

        #[arg(long, allow_negative_numbers = true)]
        y: f32,

        /// Width the surface is displayed at (default: native width)
        #[arg(long)]
        display_width: Option<f32>,

        #[arg(long)]
        mode: Option<RenderMode>,
    },

    /// List the available layouts
    Layouts,

    /// Write a default adforge.toml
    InitConfig {
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config is reported after logging is up.
    let config = load_config(cli.config.as_deref());
    let default_filter = config
        .as_ref()
        .map(|c| c.log.filter.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Logs go to stderr; stdout carries command output only.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config?;

    match cli.command {
        Commands::Render {
            file,
            output,
            mode,
            data_url,
        } => cmd_render(&config, file, output, mode, data_url),
        Commands::Ops { file, mode } => cmd_ops(&config, file, mode),
        Commands::Pick {
            file,
            x,
            y,
            display_width,
            mode,
        } => cmd_pick(&config, file, x, y, display_width, mode),
        Commands::Layouts => cmd_layouts(),
        Commands::InitConfig { path } => cmd_init_config(&path),
    }
}

fn run_async<F, T>(future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")?;
    runtime.block_on(future)
}

/// Explicit `--config` must load; the implicit `./adforge.toml` is optional.
fn load_config(path: Option<&Path>) -> Result<AdforgeConfig> {
    match path {
        Some(path) => AdforgeConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                AdforgeConfig::load_from_file(default)
                    .with_context(|| format!("failed to load config {}", default.display()))
            } else {
                Ok(AdforgeConfig::default())
            }
        }
    }
}

fn load_ad(file: &Path) -> Result<AdDescription> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    AdDescription::from_json(&json).with_context(|| format!("invalid ad description {}", file.display()))
}

fn load_fonts(config: &AdforgeConfig) -> Result<Arc<FontBook>> {
    let fonts = FontBook::from_config(config).context("failed to load fonts")?;
    Ok(Arc::new(fonts))
}

fn cmd_render(
    config: &AdforgeConfig,
    file: PathBuf,
    output: Option<PathBuf>,
    mode: Option<RenderMode>,
    data_url: bool,
) -> Result<()> {
    let start = Instant::now();
    let ad = load_ad(&file)?;
    let mode = mode.unwrap_or(config.render.default_mode);
    let mut compositor = Compositor::raster(load_fonts(config)?, mode)
        .with_font_family(&config.render.font_family);

    let outcome = run_async(async { Ok(compositor.render(&ad, &LocalImageSource).await?) })
        .with_context(|| format!("failed to render {}", file.display()))?;
    tracing::debug!("render outcome: {:?}", outcome);

    if data_url {
        println!("{}", compositor.export_data_url()?);
        return Ok(());
    }

    let output = output.unwrap_or_else(|| PathBuf::from(&config.output.file_name));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let png = compositor.export_png()?;
    std::fs::write(&output, &png).with_context(|| format!("failed to write {}", output.display()))?;

    let frame = compositor.frame()?;
    let background = match outcome {
        PassOutcome::Rendered { background, .. } => format!("{:?}", background).to_lowercase(),
        PassOutcome::Superseded { .. } => "none".to_string(),
    };
    println!("Rendered {} ({} layout, {} mode)", output.display(), ad.layout, mode);
    println!("   Size:       {}x{}", frame.width, frame.height);
    println!("   Background: {}", background);
    println!("   Bytes:      {}", png.len());
    println!("   Hash:       {}", compositor.content_hash()?);
    println!("   Time:       {:.2?}", start.elapsed());
    Ok(())
}

fn cmd_ops(config: &AdforgeConfig, file: PathBuf, mode: Option<RenderMode>) -> Result<()> {
    let ad = load_ad(&file)?;
    let mode = mode.unwrap_or(config.render.default_mode);
    let surface = RecordingSurface::new(0, 0, load_fonts(config)?);
    let mut compositor = Compositor::new(surface, mode).with_font_family(&config.render.font_family);

    run_async(async { Ok(compositor.render(&ad, &LocalImageSource).await?) })
        .with_context(|| format!("failed to render {}", file.display()))?;
    println!("{}", serde_json::to_string_pretty(compositor.surface().calls())?);
    Ok(())
}

#[derive(Serialize)]
struct PickReport {
    kind: String,
    text: String,
    color: String,
    bounds: adforge_core::Rect,
    generation: u64,
}

fn cmd_pick(
    config: &AdforgeConfig,
    file: PathBuf,
    x: f32,
    y: f32,
    display_width: Option<f32>,
    mode: Option<RenderMode>,
) -> Result<()> {
    let ad = load_ad(&file)?;
    let mode = mode.unwrap_or(config.render.default_mode);
    let surface = RecordingSurface::new(0, 0, load_fonts(config)?);
    let mut compositor = Compositor::new(surface, mode).with_font_family(&config.render.font_family);
    run_async(async { Ok(compositor.render(&ad, &LocalImageSource).await?) })
        .with_context(|| format!("failed to render {}", file.display()))?;

    let native_width = compositor.surface().width() as f32;
    let selection = compositor
        .hit_tester()
        .select(Point2D::new(x, y), display_width.unwrap_or(native_width));
    let report = selection.map(|s| PickReport {
        kind: s.kind().to_string(),
        text: s.text,
        color: s.color.to_string(),
        bounds: s.bounds,
        generation: s.id.generation(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_layouts() -> Result<()> {
    for layout in LayoutKind::ALL {
        println!("{:<16} {}", layout.name(), layout.description());
    }
    Ok(())
}

fn cmd_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    AdforgeConfig::default()
        .save_to_file(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
