use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing_subscriber::EnvFilter;
use web_optimizer::config::{self, AppConfig, CompressionConfig, OutputFormat, PresetMode};
use web_optimizer::driver::{Driver, DriverError};
use web_optimizer::encoder::RustEncoder;
use web_optimizer::export::{self, ExportError};
use web_optimizer::intake::{self, IntakeOptions};
use web_optimizer::output::{self, EventPrinter};
use web_optimizer::registry::Registry;
use web_optimizer::report::RunReport;

#[derive(Parser)]
#[command(name = "web-optimizer")]
#[command(about = "Batch image compressor for the web")]
#[command(long_about = "\
Batch image compressor for the web

Compresses photos one after another into web-friendly JPEG, PNG or WebP,
scaling them down to fit a maximum size. Pick a preset for common uses or
set quality, bounds and format yourself.

Presets:
  hero        0.85  1920x1080  webp   Above-the-fold banners (default)
  thumbnail   0.75   400x400   webp   Product grids, listings
  gallery     0.80  1200x800   webp   Portfolios, showcases
  background  0.70  1920x1080  jpeg   Section backgrounds
  custom      your own --quality, --max-width, --max-height, --format

Accepted inputs: JPEG, PNG, GIF, WebP, BMP, TIFF up to 50 MB each
(configurable). Directories are searched recursively.

Output files are named optimized_<name>.<ext>.

Run 'web-optimizer gen-config' to generate a documented web-optimizer.toml.
Set RUST_LOG=info for detailed logs.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./web-optimizer.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images and write the results
    Compress(CompressArgs),
    /// List the compression presets
    Presets,
    /// Print a stock web-optimizer.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct CompressArgs {
    /// Image files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Preset to use; any of the custom flags below switch to `custom`
    #[arg(long, value_enum)]
    preset: Option<PresetMode>,

    /// Lossy quality in (0, 1]
    #[arg(long)]
    quality: Option<f32>,

    /// Maximum output width in pixels
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum output height in pixels
    #[arg(long)]
    max_height: Option<u32>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output directory (overrides [output] dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only export results produced in this format
    #[arg(long, value_enum)]
    only_format: Option<OutputFormat>,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl CompressArgs {
    fn has_custom_values(&self) -> bool {
        self.quality.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
            || self.format.is_some()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Compress(args) => {
            let app_config = config::load_config(cli.config.as_deref(), Path::new("."))?;
            compress(&args, &app_config)?;
        }
        Command::Presets => {
            let app_config = config::load_config(cli.config.as_deref(), Path::new("."))?;
            output::print_presets(app_config.compression.preset);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays the run summary.
fn init_tracing() {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Apply CLI flags on top of the file settings.
///
/// Custom values without an explicit `--preset` switch to `custom`. Combining
/// them with an explicit named preset is an error, since presets are locked.
fn build_compression_config(
    args: &CompressArgs,
    app_config: &AppConfig,
) -> Result<CompressionConfig, config::ConfigError> {
    let mut compression = CompressionConfig::from_settings(&app_config.compression)?;
    match args.preset {
        Some(mode) => compression.select_preset(mode),
        None if args.has_custom_values() => compression.select_preset(PresetMode::Custom),
        None => {}
    }
    if let Some(quality) = args.quality {
        compression.set_quality(quality)?;
    }
    if let Some(max_width) = args.max_width {
        compression.set_max_width(max_width)?;
    }
    if let Some(max_height) = args.max_height {
        compression.set_max_height(max_height)?;
    }
    if let Some(format) = args.format {
        compression.set_format(format)?;
    }
    Ok(compression)
}

fn compress(args: &CompressArgs, app_config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let compression = build_compression_config(args, app_config)?;
    let out_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&app_config.output.dir));

    let options = IntakeOptions {
        max_file_size: app_config.intake.max_file_size_bytes(),
    };
    let intake = intake::collect(&args.inputs, &options)?;
    output::print_intake(&intake);

    let registry = Arc::new(Mutex::new(Registry::new()));
    registry
        .lock()
        .map_err(|_| "registry lock poisoned")?
        .add(intake.accepted);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        let mut printer = EventPrinter::new();
        for event in rx {
            printer.print(&event);
        }
    });

    let mut driver = Driver::new(
        Arc::clone(&registry),
        Arc::new(RwLock::new(compression)),
        RustEncoder::new(),
    )
    .with_events(tx);
    match driver.start() {
        Ok(()) => {
            driver.run();
        }
        Err(DriverError::NothingPending) => println!("Nothing to compress"),
    }
    // Dropping the driver closes the event channel
    drop(driver);
    printer.join().map_err(|_| "output thread panicked")?;

    let mut registry = registry.lock().map_err(|_| "registry lock poisoned")?;

    let exported = match args.only_format {
        Some(format) => export::export_by_format(registry.snapshot(), format, &out_dir),
        None => export::export_all(registry.snapshot(), &out_dir),
    };
    match exported {
        Ok(summary) => output::print_export(&summary, &out_dir),
        Err(ExportError::NothingToExport) => println!("No compressed images to export"),
        Err(err) => return Err(err.into()),
    }

    if let Some(path) = &args.report {
        RunReport::from_records(registry.snapshot()).write(path)?;
        println!("Report: {}", path.display());
    }

    // Ready for another batch; keep the last result visible.
    registry.clear();
    for line in output::format_last_completed(registry.last_completed()) {
        println!("{}", line);
    }

    Ok(())
}
