//! Certwatch CLI
//!
//! Command-line interface for the TLS certificate expiry checker.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use certwatch::load_config;
use clap::Parser;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "certwatch")]
#[command(about = "Check TLS certificate expiry dates for a list of websites")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Results file (overrides config file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum concurrent probes (overrides config file)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-probe timeout in seconds (overrides config file)
    #[arg(long)]
    timeout: Option<u64>,

    /// Do not write the results file
    #[arg(long)]
    no_save: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match init_logging(args.log_level, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(
        "Parsed command line arguments: config={:?}, output={:?}, concurrency={:?}, timeout={:?}, no_save={}",
        args.config,
        args.output,
        args.concurrency,
        args.timeout,
        args.no_save
    );

    tokio::select! {
        result = check(&args) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted by user");
            ExitCode::FAILURE
        }
    }
}

async fn check(args: &Args) -> certwatch::Result<()> {
    let mut config = load_config(&args.config)?;

    if let Some(output) = &args.output {
        config.output_file = output.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    config.validate()?;

    tracing::debug!(
        "Websites: {}, timeout: {}s, concurrency: {}, thresholds: {:?}",
        config.websites.len(),
        config.timeout,
        config.concurrency,
        config.thresholds
    );

    certwatch::run(&config, !args.no_save).await?;
    Ok(())
}

fn init_logging(level: Level, log_file: Option<&Path>) -> certwatch::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}
