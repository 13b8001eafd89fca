use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sparkfield_core::FieldConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod headless;

use headless::Headless;

/// Pointer-driven particle field.
#[derive(Debug, Parser)]
#[command(name = "sparkfield", version)]
struct Cli {
    /// Built-in preset: default, ember or comet
    #[arg(long, default_value = "default")]
    preset: String,

    /// Load the field configuration from a TOML file instead of a preset
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Run without a window for this many frames, printing stats as JSON lines
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Print a stats line every N headless frames
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    every: u64,

    /// Seed for deterministic spawning
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, overrides RUST_LOG (e.g. "debug" or "sparkfield_core=trace")
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Init logging; stderr keeps headless stdout machine-readable
    let filter = match &cli.log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    info!("Sparkfield starting");
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Sparkfield error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> sparkfield_platform::Result<()> {
    let config = match &cli.config {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::preset(&cli.preset)?,
    };
    info!("using preset '{}'", config.name);

    match cli.headless {
        Some(frames) => {
            let run = Headless {
                frames,
                every: cli.every,
                ..Headless::default()
            };
            let stdout = std::io::stdout();
            let stats = run.run(config, cli.seed, &mut stdout.lock())?;
            info!(
                "headless run finished: {} frames, {} spawned, {} evicted",
                stats.frames, stats.spawned, stats.evicted
            );
            Ok(())
        }
        None => sparkfield_ui::run_window(config, cli.seed),
    }
}
