//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Waybill - Extract shipping records from courier airway bills.
#[derive(Debug, Parser)]
#[command(name = "waybill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one line per document)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract shipping records from documents and write a workbook
    Extract(ExtractArgs),

    /// Show or initialize the configuration file
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Documents to process (PDF or plain text)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Workbook path (default: shipping_data_<timestamp>.xlsx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Documents processed at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Stop the batch after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Oracle attempts per document
    #[arg(long)]
    pub retries: Option<u32>,

    /// Model to use (overrides the config file)
    #[arg(long)]
    pub model: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "waybill",
            "extract",
            "a.pdf",
            "b.pdf",
            "--concurrency",
            "2",
            "--retries",
            "5",
            "-o",
            "out.xlsx",
            "--api-key",
            "key",
        ])
        .unwrap();

        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.concurrency, Some(2));
                assert_eq!(args.retries, Some(5));
                assert_eq!(args.output, Some(PathBuf::from("out.xlsx")));
                assert_eq!(args.api_key.as_deref(), Some("key"));
            }
            other => panic!("Expected extract, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_requires_files() {
        assert!(Cli::try_parse_from(["waybill", "extract"]).is_err());
    }

    #[test]
    fn test_verbose_count() {
        let cli = Cli::try_parse_from(["waybill", "-vv", "config", "show"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
