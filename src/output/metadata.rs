// Metadata document (JSON / YAML)

use crate::core::assembler::{ChannelSummary, ExtractionRecord};
use crate::core::error::{Result, WaveformError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFormat {
    #[default]
    Json,
    Yaml,
}

impl MetadataFormat {
    pub fn extension(self) -> &'static str {
        match self {
            MetadataFormat::Json => "json",
            MetadataFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for MetadataFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(MetadataFormat::Json),
            "yaml" | "yml" => Ok(MetadataFormat::Yaml),
            other => Err(format!("Invalid metadata format '{}'. Use 'json' or 'yaml'.", other)),
        }
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Serialize)]
struct MetadataDocument<'a> {
    #[serde(flatten)]
    metadata: &'a BTreeMap<String, String>,
    groups: Vec<GroupDocument<'a>>,
}

#[derive(Serialize)]
struct GroupDocument<'a> {
    index: usize,
    label: &'a str,
    sampling_frequency: f64,
    number_of_samples: usize,
    duration_seconds: f64,
    channel_labels: &'a [String],
    channels: &'a [ChannelSummary],
}

pub fn render_metadata(record: &ExtractionRecord, format: MetadataFormat) -> Result<Vec<u8>> {
    let document = MetadataDocument {
        metadata: &record.metadata,
        groups: record
            .groups
            .iter()
            .map(|group| GroupDocument {
                index: group.index,
                label: &group.label,
                sampling_frequency: group.sampling_frequency,
                number_of_samples: group.number_of_samples,
                duration_seconds: group.duration_seconds(),
                channel_labels: &group.channel_labels,
                channels: &group.channels,
            })
            .collect(),
    };

    match format {
        MetadataFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(&document)
                .map_err(|e| WaveformError::Serialization(format!("JSON: {}", e)))?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        MetadataFormat::Yaml => serde_yaml::to_string(&document)
            .map(String::into_bytes)
            .map_err(|e| WaveformError::Serialization(format!("YAML: {}", e))),
    }
}
