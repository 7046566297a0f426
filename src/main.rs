//! memoscribe - transcribe a voice memo, optionally summarize it with Gemini
//!
//! Entry point. Holds the one place that decides what lands on stdout: the
//! pipeline result on success, a fixed marker on failure. stdout carries
//! exactly one payload per invocation; diagnostics go to stderr via tracing.

use clap::error::ErrorKind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use memoscribe::cli::Cli;
use memoscribe::config::Settings;
use memoscribe::pipeline::{self, INPUT_FAILURE_MARKER, PROCESS_FAILURE_MARKER};
use memoscribe::MemoscribeError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments, ignoring flags this tool does not recognize.
    // Usage errors still emit a marker on stdout so a caller reading stdout
    // never blocks on a failed invocation.
    let cli = match Cli::parse_lenient(std::env::args()) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            println!("{INPUT_FAILURE_MARKER}");
            std::process::exit(2);
        }
    };

    init_logging(cli.verbose);

    // Load configuration and overlay CLI flags.
    let mut settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e:#}");
            println!("{PROCESS_FAILURE_MARKER}");
            std::process::exit(1);
        }
    };
    settings.apply_cli(&cli);

    match pipeline::run(&settings, &cli.audio_file).await {
        Ok(payload) => println!("{payload}"),
        Err(e) => {
            tracing::error!("{e}");
            let marker = match e {
                MemoscribeError::AudioNotFound(_) => INPUT_FAILURE_MARKER,
                _ => PROCESS_FAILURE_MARKER,
            };
            println!("{marker}");
            std::process::exit(1);
        }
    }
}

/// Initialize logging. Everything goes to stderr so stdout stays a pure
/// result channel.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
