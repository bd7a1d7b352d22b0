//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use waybill_domain::traits::TextGenerator;
use waybill_domain::{BatchResult, SourceDocument};
use waybill_export::{export_filename, TableExporter, XlsxTableWriter};
use waybill_extractor::{
    BatchOrchestrator, CancellationHandle, DetectingExtractor, ExtractorConfig,
};
use waybill_llm::AnthropicProvider;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    formatter: &Formatter,
    cancel: &CancellationHandle,
) -> Result<()> {
    let api_key = resolve_api_key(args.api_key.as_deref())?;
    let extractor_config = apply_overrides(&config.extractor, &args)?;
    let documents = read_documents(&args.files)?;

    let model = args.model.as_deref().unwrap_or(&config.oracle.model);
    let provider = AnthropicProvider::new(api_key, model)?
        .with_endpoint(&config.oracle.endpoint)
        .with_max_tokens(config.oracle.max_tokens);

    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(export_filename(&chrono::Local::now().naive_local()))
    });

    let batch = run_batch(provider, &extractor_config, documents, cancel, &output).await?;

    println!("{}", formatter.format_batch(&batch)?);
    if formatter.format() != OutputFormat::Quiet {
        if batch.summary().cancelled > 0 {
            println!(
                "{}",
                formatter.warning(&format!(
                    "{} document(s) cancelled before completion",
                    batch.summary().cancelled
                ))
            );
        }
        println!(
            "{}",
            formatter.success(&format!("Wrote {}", output.display()))
        );
    }
    Ok(())
}

/// Run the batch and write the workbook to `output`.
pub async fn run_batch<G>(
    generator: G,
    config: &ExtractorConfig,
    documents: Vec<SourceDocument>,
    cancel: &CancellationHandle,
    output: &Path,
) -> Result<BatchResult>
where
    G: TextGenerator + 'static,
{
    let orchestrator = BatchOrchestrator::new(DetectingExtractor, generator, config)?
        .with_progress(|progress| {
            info!(
                "[{}/{}] {}: {}",
                progress.completed,
                progress.total,
                progress.identity,
                match progress.outcome {
                    waybill_domain::DocumentOutcome::Record(r) => r.status().as_str(),
                    waybill_domain::DocumentOutcome::Failed(f) => f.stage().as_str(),
                    waybill_domain::DocumentOutcome::Cancelled => "cancelled",
                }
            );
        });
    info!("Using model {}", orchestrator.model_name());

    let batch = orchestrator.run(documents, cancel).await;

    let bytes = TableExporter::new(XlsxTableWriter::new()).export(&batch)?;
    fs::write(output, bytes)?;
    info!("Wrote {}", output.display());
    Ok(batch)
}

/// A blank key counts as missing.
pub fn resolve_api_key(key: Option<&str>) -> Result<String> {
    match key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(CliError::MissingApiKey),
    }
}

/// Command-line flags take precedence over the config file.
pub fn apply_overrides(base: &ExtractorConfig, args: &ExtractArgs) -> Result<ExtractorConfig> {
    let mut config = base.clone();
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(deadline) = args.deadline_secs {
        config.batch_deadline_secs = Some(deadline);
    }
    if let Some(retries) = args.retries {
        config.max_attempts = retries;
    }
    config.validate()?;
    Ok(config)
}

/// Read every file up front; an unreadable path stops the command.
pub fn read_documents(paths: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|e| {
                CliError::InvalidInput(format!("Cannot read '{}': {}", path.display(), e))
            })?;
            Ok(SourceDocument::new(identity(path), bytes))
        })
        .collect()
}

fn identity(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
