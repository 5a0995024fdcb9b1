// Waveform sequence locator: tag tree -> multiplex groups

use crate::core::constants::*;
use crate::core::error::{Issue, WaveformError};
use crate::core::format::{DataSet, Tag};
use tracing::{debug, warn};

/// Decoding contract for one channel. Bits allocated and the sample
/// interpretation are copied from the owning group.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDefinition {
    pub label: String,
    pub sample_interpretation: String,
    pub bits_allocated: u16,
    pub bits_stored: Option<u16>,
    pub sensitivity: Option<f64>,
    pub sensitivity_correction_factor: Option<f64>,
    pub baseline: Option<f64>,
    pub units: String,
    pub source: String,
}

/// One synchronized acquisition unit. `waveform_data` borrows the
/// interleaved sample buffer from the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplexGroup<'a> {
    pub index: usize,
    pub label: String,
    pub sampling_frequency: f64,
    pub number_of_samples: usize,
    pub channels: Vec<ChannelDefinition>,
    pub waveform_data: &'a [u8],
}

#[derive(Debug, Default)]
pub struct Located<'a> {
    pub groups: Vec<MultiplexGroup<'a>>,
    pub issues: Vec<Issue>,
}

pub fn locate(tree: &DataSet) -> Located<'_> {
    let mut located = Located::default();

    let Some(items) = tree.items(WAVEFORM_SEQUENCE) else {
        debug!("no waveform sequence present");
        return located;
    };

    for (index, item) in items.iter().enumerate() {
        match read_group(index, item) {
            Ok(group) => {
                debug!(
                    "group {} '{}': {} channels, {} samples @ {} Hz",
                    index,
                    group.label,
                    group.channels.len(),
                    group.number_of_samples,
                    group.sampling_frequency
                );
                located.groups.push(group);
            }
            Err(e) => {
                warn!("skipping multiplex group {}: {}", index, e);
                located.issues.push(Issue::group(index, e));
            }
        }
    }

    located
}

fn read_group(index: usize, item: &DataSet) -> Result<MultiplexGroup<'_>, WaveformError> {
    let sampling_frequency = item.float(SAMPLING_FREQUENCY).ok_or_else(|| {
        WaveformError::InvalidMultiplexGroup("missing sampling frequency".to_string())
    })?;
    if !(sampling_frequency.is_finite() && sampling_frequency > 0.0) {
        return Err(WaveformError::InvalidMultiplexGroup(format!(
            "non-positive sampling frequency {}",
            sampling_frequency
        )));
    }

    let number_of_samples = item
        .uint(NUMBER_OF_WAVEFORM_SAMPLES)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            WaveformError::InvalidMultiplexGroup("missing number of samples".to_string())
        })?;

    let bits_allocated = item
        .uint(WAVEFORM_BITS_ALLOCATED)
        .and_then(|b| u16::try_from(b).ok())
        .unwrap_or(0);
    let sample_interpretation = item
        .string(WAVEFORM_SAMPLE_INTERPRETATION)
        .unwrap_or_default();

    let channels = item
        .items(CHANNEL_DEFINITION_SEQUENCE)
        .unwrap_or_default()
        .iter()
        .map(|channel| read_channel(channel, &sample_interpretation, bits_allocated))
        .collect();

    Ok(MultiplexGroup {
        index,
        label: item.string(MULTIPLEX_GROUP_LABEL).unwrap_or_default(),
        sampling_frequency,
        number_of_samples,
        channels,
        waveform_data: item.bytes(WAVEFORM_DATA).unwrap_or_default(),
    })
}

fn read_channel(item: &DataSet, interpretation: &str, bits_allocated: u16) -> ChannelDefinition {
    let units = coded_value(item, CHANNEL_SENSITIVITY_UNITS_SEQUENCE, CODE_VALUE, CODE_MEANING);
    let source = coded_value(item, CHANNEL_SOURCE_SEQUENCE, CODE_MEANING, CODE_VALUE);

    ChannelDefinition {
        label: item.string(CHANNEL_LABEL).unwrap_or_default(),
        sample_interpretation: interpretation.to_string(),
        bits_allocated,
        bits_stored: item
            .uint(WAVEFORM_BITS_STORED)
            .and_then(|b| u16::try_from(b).ok()),
        sensitivity: item.float(CHANNEL_SENSITIVITY),
        sensitivity_correction_factor: item.float(CHANNEL_SENSITIVITY_CORRECTION_FACTOR),
        baseline: item.float(CHANNEL_BASELINE),
        units,
        source,
    }
}

// First item of a code sequence, preferring one attribute over another
fn coded_value(
    item: &DataSet,
    sequence: Tag,
    preferred: Tag,
    fallback: Tag,
) -> String {
    item.items(sequence)
        .and_then(|items| items.first())
        .and_then(|code| {
            code.string(preferred)
                .filter(|s| !s.is_empty())
                .or_else(|| code.string(fallback))
        })
        .unwrap_or_default()
}
