use clap::Parser;
use std::path::PathBuf;

/// Extract waveform data from DICOM files into CSV plus JSON/YAML metadata
#[derive(Parser, Debug, Default)]
#[command(name = "dcm-waveform-extractor")]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the JSON configuration file (created with defaults when missing)
    #[arg(short, long, default_value = "./config.json")]
    pub config: PathBuf,

    /// Override the input directory
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Override the output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override the metadata format
    #[arg(long, value_parser = ["json", "yaml"])]
    pub metadata_format: Option<String>,

    /// Override the output folder structure, e.g. '{PATIENT_ID}/{STUDY_DATE}/{STUDY_TIME}'
    #[arg(long)]
    pub output_structure: Option<String>,

    /// Override the file name masks, e.g. '*.dcm' '*.ima' '*'
    #[arg(long, num_args = 1..)]
    pub file_format_mask: Option<Vec<String>>,

    /// Walk the input directory recursively
    #[arg(long)]
    pub recursive: bool,

    /// Write one record per multiplex group
    #[arg(long)]
    pub split_groups: bool,

    /// Number of worker tasks (0 = one per CPU)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Override the error log path
    #[arg(long)]
    pub error_log: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
