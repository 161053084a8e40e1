use clap::{Parser, Subcommand};
use image_resizer::config::{self, ResizerConfig};
use image_resizer::imaging::{Quality, RustBackend, SizeLimit};
use image_resizer::output;
use image_resizer::pipeline::{self, BatchSummary, ProcessEvent, ResizeOptions};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

#[derive(Parser)]
#[command(name = "image-resizer")]
#[command(about = "Trim white borders off photos and scale them to fit")]
#[command(long_about = "\
Trim white borders off photos and scale them to fit

resize   For each image (or every .jpg/.jpeg/.png under a directory):
         trim white margins if the top-left pixel is white, scale down
         to fit SIZE x SIZE if larger, save as <name>(1).jpg beside it.
export   Scale down to fit SIZE x SIZE if larger and save as <name>.jpg
         into a destination directory. No trimming.
trim     Trim one image unconditionally and save a JPEG preview.

An invalid --size falls back to the configured size for `resize`, and is
an error for `export`. An invalid --quality is always an error.

Run 'image-resizer gen-config' to generate a documented resizer.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./resizer.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Longest edge in pixels
    #[arg(long, global = true)]
    size: Option<String>,

    /// JPEG quality, 0-100
    #[arg(long, global = true)]
    quality: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trim and scale images, saving <name>(1).jpg next to each
    Resize {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Skip the automatic border trim
        #[arg(long)]
        no_trim: bool,
    },
    /// Scale images into a destination directory without trimming
    Export {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Destination directory (default: save.output_dir from config)
        #[arg(long)]
        to: Option<PathBuf>,
    },
    /// Write a trimmed JPEG preview of one image
    Trim {
        input: PathBuf,
        /// Output path (default: <name>(trimmed).jpg next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a stock resizer.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let backend = RustBackend::new();

    match &cli.command {
        Command::Resize { inputs, no_trim } => {
            let (resizer_config, mut options) = load_options(&cli)?;
            if let Some(text) = &cli.size {
                options.size_limit = SizeLimit::parse_or(text, resizer_config.size_limit());
            }
            options.auto_trim &= !no_trim;
            init_thread_pool(&resizer_config);

            let sources = pipeline::collect_inputs(inputs)?;
            let summary = with_printer(|tx| {
                pipeline::resize_all(&backend, &sources, &options, Some(tx))
            });
            output::print_summary(&summary);
            exit_on_failures(&summary);
        }
        Command::Export { inputs, to } => {
            let (resizer_config, mut options) = load_options(&cli)?;
            if let Some(text) = &cli.size {
                options.size_limit = SizeLimit::parse(text)?;
            }
            let dest = to
                .clone()
                .or_else(|| resizer_config.save.output_dir.clone())
                .ok_or("no destination: pass --to or set save.output_dir")?;
            init_thread_pool(&resizer_config);

            let sources = pipeline::collect_inputs(inputs)?;
            let summary = with_printer(|tx| {
                pipeline::export_all(&backend, &sources, &dest, &options, Some(tx))
            });
            output::print_summary(&summary);
            exit_on_failures(&summary);
        }
        Command::Trim { input, output: out } => {
            let (_, options) = load_options(&cli)?;
            let out = out
                .clone()
                .unwrap_or_else(|| pipeline::trim_preview_path(input));
            let report =
                pipeline::trim_preview(&backend, input, &out, options.quality, options.retry)?;
            output::print_report(&report);
        }
        // Reads no config file
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply the global `--quality` override.
fn load_options(cli: &Cli) -> Result<(ResizerConfig, ResizeOptions), Box<dyn std::error::Error>> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_FILE));
    let resizer_config = config::load_config(&config_path)?;
    let mut options = ResizeOptions::from_config(&resizer_config);
    if let Some(text) = &cli.quality {
        options.quality = Quality::parse(text)?;
    }
    Ok((resizer_config, options))
}

/// Run a batch while a printer thread writes its events to stdout.
fn with_printer(run: impl FnOnce(Sender<ProcessEvent>) -> BatchSummary) -> BatchSummary {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let summary = run(tx);
    printer.join().ok();
    summary
}

/// Initialize the rayon thread pool based on processing config.
fn init_thread_pool(resizer_config: &ResizerConfig) {
    let threads = config::effective_threads(&resizer_config.processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn exit_on_failures(summary: &BatchSummary) {
    if summary.failed > 0 {
        std::process::exit(1);
    }
}
