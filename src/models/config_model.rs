use dcm_waveform::MetadataFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub metadata_format: MetadataFormat,
    pub output_structure: String,
    pub file_format_mask: Vec<String>,
    pub recursive: bool,
    pub split_groups: bool,
    /// 0 means one worker per CPU
    pub workers: usize,
    pub error_log: PathBuf,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./dicom_files"),
            output_dir: PathBuf::from("./output_csv"),
            metadata_format: MetadataFormat::Json,
            output_structure: "{PATIENT_ID}/{STUDY_DATE}/{STUDY_TIME}".to_string(),
            file_format_mask: vec!["*.dcm".to_string(), "*.ima".to_string(), "*".to_string()],
            recursive: false,
            split_groups: false,
            workers: 0,
            error_log: PathBuf::from("error.log"),
        }
    }
}

impl ExtractorConfig {
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }
}
