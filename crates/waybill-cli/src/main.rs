//! Waybill CLI - Extract shipping records from courier airway bills.

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use waybill_cli::commands;
use waybill_cli::{Cli, Command, Config, Formatter};
use waybill_extractor::CancellationHandle;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> waybill_cli::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load(&path)?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => {
            let cancel = CancellationHandle::new();
            let trigger = cancel.clone();
            let done = CancellationHandle::new();
            let finished = done.clone();

            // The first Ctrl+C cancels the batch; the workbook is still written
            let watcher = tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        warn!("Interrupt received, cancelling batch");
                        trigger.cancel();
                    }
                    _ = finished.cancelled() => {}
                }
            });

            let result = commands::execute_extract(args, &config, &formatter, &cancel).await;
            done.cancel();
            let _ = watcher.await;
            result?;
        }
        Command::Config(args) => {
            commands::execute_config(args, &config, &path, &formatter)?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for JSON output.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
