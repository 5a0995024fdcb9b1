use anyhow::{bail, Context, Result};
use dcm_waveform::core::constants::METADATA_KEYS;
use dcm_waveform::output::template::placeholders;
use dcm_waveform::MetadataFormat;
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::batch::discovery::FileMask;
use crate::cli::Cli;
use crate::models::config_model::ExtractorConfig;

/// Reads the JSON config, writing a default one first when it is missing.
pub async fn load_config(path: &Path) -> Result<ExtractorConfig> {
    if fs::metadata(path).await.is_err() {
        info!("Config file '{}' not found. Generating default config", path.display());
        let data = serde_json::to_string_pretty(&ExtractorConfig::default())?;
        fs::write(path, data)
            .await
            .with_context(|| format!("File write Error: {}", path.display()))?;
    }

    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("File read Error: {}", path.display()))?;

    let config: ExtractorConfig = serde_json::from_str(&data)
        .with_context(|| format!("JSON Parse Error: {}", path.display()))?;

    Ok(config)
}

/// Command-line flags take precedence over the file.
pub fn apply_overrides(mut config: ExtractorConfig, cli: &Cli) -> Result<ExtractorConfig> {
    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(format) = &cli.metadata_format {
        config.metadata_format = format
            .parse::<MetadataFormat>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(structure) = &cli.output_structure {
        config.output_structure = structure.clone();
    }
    if let Some(masks) = &cli.file_format_mask {
        config.file_format_mask = masks.clone();
    }
    if cli.recursive {
        config.recursive = true;
    }
    if cli.split_groups {
        config.split_groups = true;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(log) = &cli.error_log {
        config.error_log = log.clone();
    }
    Ok(config)
}

/// Checks everything that would otherwise fail for every file.
pub fn validate(config: &ExtractorConfig) -> Result<()> {
    let names = placeholders(&config.output_structure)
        .with_context(|| format!("Invalid output_structure '{}'", config.output_structure))?;
    let unsupported: Vec<&String> = names
        .iter()
        .filter(|name| !METADATA_KEYS.contains(&name.as_str()))
        .collect();
    if !unsupported.is_empty() {
        bail!(
            "Unsupported metadata tags found in output_structure: {:?}. Accepted tags are: {:?}",
            unsupported,
            METADATA_KEYS
        );
    }

    if config.file_format_mask.is_empty() {
        bail!("file_format_mask must contain at least one pattern");
    }
    for mask in &config.file_format_mask {
        FileMask::new(mask).with_context(|| format!("Invalid file mask '{}'", mask))?;
    }

    if !config.input_dir.is_dir() {
        bail!("Input directory '{}' does not exist", config.input_dir.display());
    }
    Ok(())
}

pub async fn init_settings(cli: &Cli) -> Result<ExtractorConfig> {
    let config = load_config(&cli.config).await?;
    let config = apply_overrides(config, cli)?;
    validate(&config)?;

    fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Cannot create output directory '{}'", config.output_dir.display()))?;

    info!(
        "Config initialized: input={} output={} format={} structure={} masks={:?}",
        config.input_dir.display(),
        config.output_dir.display(),
        config.metadata_format,
        config.output_structure,
        config.file_format_mask
    );
    Ok(config)
}
