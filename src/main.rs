use backdrop::config::{self, PipelineConfig};
use backdrop::imaging::{
    BlurRadius, Layer, Quality, RustBackend, StepOptions, blur, crop_to_widescreen, feather_edge,
    mix, scale_level,
};
use backdrop::pipeline::{self, Step};
use backdrop::upscale::{Upscaler, Waifu2x};
use backdrop::output;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "backdrop")]
#[command(about = "Turn a photo into a 16:9 wallpaper with a blurred backdrop")]
#[command(long_about = "\
Turn a photo into a 16:9 wallpaper with a blurred backdrop

Outputs are written next to the source image:

  dusk.jpg                   # source
  dusk_scaled.jpg            # upscaled (reused if present)
  dusk_scaled_cropped.jpg    # cropped to 16:9
  dusk_scaled_mixed.png      # full image over the blurred backdrop
  dusk_edgy_blurred.jpg      # final, with a feathered frame

Config is read from backdrop.toml in the working directory, or --config.
Run 'backdrop gen-config' to generate a documented backdrop.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./backdrop.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: upscale → crop → blur → mix → feather
    Run {
        source: PathBuf,
        /// Upscaler executable (overrides upscaler.binary)
        #[arg(long)]
        upscaler: Option<PathBuf>,
        /// Upscale factor (overrides upscaler.scale)
        #[arg(long)]
        scale: Option<u32>,
    },
    /// Print the upscale factor that brings an image up to 4K
    Scale { source: PathBuf },
    /// Crop an image to 16:9
    Crop { source: PathBuf },
    /// Blur an image
    Blur {
        source: PathBuf,
        /// Blur radius in pixels (default: blur.radius)
        #[arg(long)]
        radius: Option<u32>,
    },
    /// Fit a foreground image over a background
    Mix {
        foreground: PathBuf,
        background: PathBuf,
        /// Path the output is named after (default: the foreground)
        #[arg(long)]
        name: Option<PathBuf>,
    },
    /// Feather an image's edge into a solid frame
    Feather { source: PathBuf },
    /// Print a stock backdrop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut config = load_config(cli.config.as_deref())?;
    let backend = RustBackend::new();
    let saved = StepOptions::saved(Quality::new(config.output.quality));

    match cli.command {
        Command::Run {
            source,
            upscaler,
            scale,
        } => {
            if let Some(binary) = upscaler {
                config.upscaler.binary = Some(binary);
            }
            if scale.is_some() {
                config.upscaler.scale = scale;
            }
            config.validate()?;

            let waifu2x = config
                .upscaler
                .binary
                .as_ref()
                .map(|binary| Waifu2x::new(binary, config.upscaler.gpu));
            let report = pipeline::run_pipeline(
                &backend,
                waifu2x.as_ref().map(|w| w as &dyn Upscaler),
                &source,
                &config,
            )?;
            output::print_pipeline_report(&report);
        }
        Command::Scale { source } => {
            let level = scale_level(&backend, &source)?;
            output::print_scale_level(&source, level);
        }
        Command::Crop { source } => {
            let layer = Layer::open(&backend, &source)?;
            let cropped = crop_to_widescreen(&backend, layer, None, saved)?;
            output::print_step_output(Step::Crop, &cropped);
        }
        Command::Blur { source, radius } => {
            let radius = radius
                .map(|r| BlurRadius(r as f32))
                .unwrap_or_else(|| config.blur.general());
            let layer = Layer::open(&backend, &source)?;
            let blurred = blur(&backend, &layer, None, radius, saved)?;
            output::print_step_output(Step::Blur, &blurred);
        }
        Command::Mix {
            foreground,
            background,
            name,
        } => {
            let fg = Layer::open(&backend, &foreground)?;
            let bg = Layer::open(&backend, &background)?;
            let name = name.unwrap_or(foreground);
            let mixed = mix(&backend, &name, &fg, &bg, saved)?;
            output::print_step_output(Step::Mix, &mixed);
        }
        Command::Feather { source } => {
            let layer = Layer::open(&backend, &source)?;
            let feathered = feather_edge(&backend, &layer, None, config.fill_color(), saved)?;
            output::print_step_output(Step::Feather, &feathered);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Install the fmt subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

/// Explicit `--config` must exist; otherwise `./backdrop.toml` is optional.
fn load_config(
    explicit: Option<&std::path::Path>,
) -> Result<PipelineConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => config::load_config(&config::default_config_dir()),
    }
}
