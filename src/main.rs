//! sheetpack - translate a batch of images and package the results.
//!
//! This binary reads the input files, runs the batch and writes the archive.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetpack::{BatchService, Config, HttpTranslator, InputImage};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = match config.batch_options() {
        Ok(options) => options,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (sheet_width, sheet_height) = config.sheet_size();
    info!(
        endpoint = %config.endpoint,
        size = %config.image_size,
        sheet = %format!("{}x{}", sheet_width, sheet_height),
        columns = config.columns,
        "Starting sheetpack"
    );

    if config.api_key.is_none() {
        warn!("No API key configured; requests are sent without authorization");
    }

    let inputs = match read_inputs(&config).await {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let translator =
        match HttpTranslator::new(config.endpoint.clone(), config.api_key.clone(), config.timeout())
        {
            Ok(translator) => translator,
            Err(e) => {
                error!("Failed to create translate client: {}", e);
                return ExitCode::FAILURE;
            }
        };

    let service = BatchService::new(translator, options);
    let output = match service.run(inputs).await {
        Ok(output) => output,
        Err(e) => {
            error!("Batch failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::fs::write(&config.output, &output.archive).await {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        path = %config.output.display(),
        entries = output.entry_names.len(),
        bytes = output.archive.len(),
        calls = output.translate_calls,
        "Archive written"
    );

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "sheetpack=debug"
    } else {
        "sheetpack=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Read every input file; the file name becomes the archive entry name.
async fn read_inputs(config: &Config) -> Result<Vec<InputImage>, String> {
    let mut inputs = Vec::with_capacity(config.inputs.len());

    for path in &config.inputs {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

        inputs.push(InputImage::new(entry_name(path), bytes));
    }

    Ok(inputs)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
