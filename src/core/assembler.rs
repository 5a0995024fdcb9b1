// Record assembly: decoded channels + timing + patient/study metadata

use crate::core::constants::*;
use crate::core::error::{Issue, WaveformError};
use crate::core::format::DataSet;
use crate::core::locator::{ChannelDefinition, MultiplexGroup};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Decoded samples keyed by (group index, channel index) in the source.
pub type DecodedChannels = HashMap<(usize, usize), Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub label: String,
    pub units: String,
    pub source: String,
    pub bits_stored: Option<u16>,
    pub sensitivity: Option<f64>,
    pub sensitivity_correction_factor: Option<f64>,
    pub baseline: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGroup {
    pub index: usize,
    pub label: String,
    pub sampling_frequency: f64,
    pub number_of_samples: usize,
    pub channel_labels: Vec<String>,
    pub channels: Vec<ChannelSummary>,
    /// Indexed [channel][sample]
    pub samples: Vec<Vec<f64>>,
}

impl DecodedGroup {
    pub fn duration_seconds(&self) -> f64 {
        self.number_of_samples as f64 / self.sampling_frequency
    }

    pub fn time_at(&self, sample_index: usize) -> f64 {
        sample_index as f64 / self.sampling_frequency
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRecord {
    pub metadata: BTreeMap<String, String>,
    pub groups: Vec<DecodedGroup>,
}

/// Declared label, or `channel_{index}` when empty. Duplicates are kept.
pub fn channel_label(definition: &ChannelDefinition, index: usize) -> String {
    if definition.label.is_empty() {
        format!("channel_{}", index)
    } else {
        definition.label.clone()
    }
}

/// Builds the record in source order. Channels missing from `decoded`
/// failed upstream and are left out; groups left with no channel are
/// dropped. An empty result is signalled as `NoWaveformData`.
pub fn assemble(
    groups: &[MultiplexGroup<'_>],
    mut decoded: DecodedChannels,
    metadata: BTreeMap<String, String>,
) -> (ExtractionRecord, Option<Issue>) {
    let mut out = Vec::with_capacity(groups.len());

    for group in groups {
        let mut channel_labels = Vec::new();
        let mut channels = Vec::new();
        let mut samples = Vec::new();

        for (index, definition) in group.channels.iter().enumerate() {
            let Some(values) = decoded.remove(&(group.index, index)) else {
                continue;
            };
            let label = channel_label(definition, index);
            channels.push(ChannelSummary {
                label: label.clone(),
                units: definition.units.clone(),
                source: definition.source.clone(),
                bits_stored: definition.bits_stored,
                sensitivity: definition.sensitivity,
                sensitivity_correction_factor: definition.sensitivity_correction_factor,
                baseline: definition.baseline,
            });
            channel_labels.push(label);
            samples.push(values);
        }

        if samples.is_empty() {
            continue;
        }

        out.push(DecodedGroup {
            index: group.index,
            label: group.label.clone(),
            sampling_frequency: group.sampling_frequency,
            number_of_samples: group.number_of_samples,
            channel_labels,
            channels,
            samples,
        });
    }

    let condition = out
        .is_empty()
        .then(|| Issue::file(WaveformError::NoWaveformData));

    (
        ExtractionRecord {
            metadata,
            groups: out,
        },
        condition,
    )
}

/// Patient/study metadata for the output template. Every key in
/// `METADATA_KEYS` is present; unknown values are empty strings.
pub fn patient_metadata(
    tree: &DataSet,
    first_group: Option<&MultiplexGroup<'_>>,
) -> BTreeMap<String, String> {
    let mut metadata: BTreeMap<String, String> = METADATA_KEYS
        .iter()
        .map(|key| (key.to_string(), String::new()))
        .collect();

    let text = |tag| tree.string(tag).unwrap_or_default();
    metadata.insert(KEY_ACCESSION_NUMBER.to_string(), text(ACCESSION_NUMBER));
    metadata.insert(KEY_PATIENT_NAME.to_string(), text(PATIENT_NAME));
    metadata.insert(KEY_PATIENT_ID.to_string(), text(PATIENT_ID));
    metadata.insert(KEY_SERIES_DESCRIPTION.to_string(), text(SERIES_DESCRIPTION));
    metadata.insert(KEY_MODALITY.to_string(), text(MODALITY));
    metadata.insert(KEY_SOP_INSTANCE_UID.to_string(), text(SOP_INSTANCE_UID));

    match parse_datetime(&text(CONTENT_DATE), &text(CONTENT_TIME)) {
        Some(start) => {
            metadata.insert(KEY_STUDY_DATE.to_string(), start.format("%Y%m%d").to_string());
            metadata.insert(KEY_STUDY_TIME.to_string(), start.format("%H%M%S").to_string());
            metadata.insert(KEY_START_DATETIME.to_string(), format_datetime(start));

            if let Some(end) = first_group.and_then(|group| end_datetime(start, group)) {
                metadata.insert(KEY_END_DATETIME.to_string(), format_datetime(end));
            }
        }
        None => {
            metadata.insert(KEY_STUDY_DATE.to_string(), text(STUDY_DATE));
            metadata.insert(KEY_STUDY_TIME.to_string(), text(STUDY_TIME));
        }
    }

    metadata
}

/// One record per group with CHANNEL set to the group label. A record
/// without groups is returned unchanged.
pub fn split_groups(record: ExtractionRecord) -> Vec<ExtractionRecord> {
    if record.groups.is_empty() {
        return vec![record];
    }

    let ExtractionRecord { metadata, groups } = record;
    groups
        .into_iter()
        .map(|group| {
            let mut metadata = metadata.clone();
            let channel = if group.label.is_empty() {
                format!("group_{}", group.index)
            } else {
                group.label.clone()
            };
            metadata.insert(KEY_CHANNEL.to_string(), channel);
            ExtractionRecord {
                metadata,
                groups: vec![group],
            }
        })
        .collect()
}

fn parse_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(&date.replace(' ', ""), "%Y%m%d").ok()?;
    let time = time.replace(' ', "");
    let time = ["%H%M%S%.f", "%H%M", "%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&time, fmt).ok())?;
    Some(date.and_time(time))
}

/// Time of the last sample of `group`, or `None` when it is not representable.
fn end_datetime(start: NaiveDateTime, group: &MultiplexGroup<'_>) -> Option<NaiveDateTime> {
    let last_sample = group.number_of_samples.saturating_sub(1) as f64;
    let micros = (last_sample / group.sampling_frequency * 1e6).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    start.checked_add_signed(chrono::Duration::microseconds(micros as i64))
}

fn format_datetime(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::{Element, Vr};

    fn definition(label: &str) -> ChannelDefinition {
        ChannelDefinition {
            label: label.to_string(),
            sample_interpretation: "SS".to_string(),
            bits_allocated: 16,
            bits_stored: None,
            sensitivity: Some(1.0),
            sensitivity_correction_factor: None,
            baseline: None,
            units: "uV".to_string(),
            source: String::new(),
        }
    }

    fn group(index: usize, labels: &[&str]) -> MultiplexGroup<'static> {
        MultiplexGroup {
            index,
            label: format!("G{}", index),
            sampling_frequency: 500.0,
            number_of_samples: 2,
            channels: labels.iter().map(|l| definition(l)).collect(),
            waveform_data: &[],
        }
    }

    #[test]
    fn test_assemble_preserves_order_and_labels() {
        let groups = vec![group(0, &["II", "", "II"]), group(2, &["V1"])];
        let mut decoded = DecodedChannels::new();
        decoded.insert((0, 0), vec![1.0, 2.0]);
        decoded.insert((0, 1), vec![3.0, 4.0]);
        decoded.insert((0, 2), vec![5.0, 6.0]);
        decoded.insert((2, 0), vec![7.0, 8.0]);

        let (record, condition) = assemble(&groups, decoded, BTreeMap::new());
        assert!(condition.is_none());
        assert_eq!(record.groups.len(), 2);
        assert_eq!(record.groups[0].channel_labels, vec!["II", "channel_1", "II"]);
        assert_eq!(record.groups[0].samples[2], vec![5.0, 6.0]);
        assert_eq!(record.groups[1].index, 2);
        assert_eq!(record.groups[1].label, "G2");
    }

    #[test]
    fn test_failed_channels_and_groups_left_out() {
        let groups = vec![group(0, &["I", "II"]), group(1, &["III"])];
        let mut decoded = DecodedChannels::new();
        decoded.insert((0, 1), vec![1.0, 2.0]);

        let (record, condition) = assemble(&groups, decoded, BTreeMap::new());
        assert!(condition.is_none());
        assert_eq!(record.groups.len(), 1);
        assert_eq!(record.groups[0].channel_labels, vec!["II"]);
    }

    #[test]
    fn test_nothing_decoded_signals_no_waveform() {
        let groups = vec![group(0, &["I"])];
        let (record, condition) = assemble(&groups, DecodedChannels::new(), BTreeMap::new());
        assert!(record.groups.is_empty());
        let condition = condition.unwrap();
        assert!(matches!(condition.error, WaveformError::NoWaveformData));
        assert_eq!(condition.group, None);
    }

    #[test]
    fn test_metadata_defaults_to_empty_strings() {
        let metadata = patient_metadata(&DataSet::new(), None);
        for key in METADATA_KEYS {
            assert_eq!(metadata.get(key).map(String::as_str), Some(""), "{}", key);
        }
    }

    #[test]
    fn test_metadata_content_datetime() {
        let tree = DataSet::new()
            .with(Element::text(PATIENT_ID, Vr::LO, "PAT01"))
            .with(Element::text(ACCESSION_NUMBER, Vr::SH, "ACC9"))
            .with(Element::text(CONTENT_DATE, Vr::DA, "20240131"))
            .with(Element::text(CONTENT_TIME, Vr::TM, "101500.250000"));
        let g = MultiplexGroup {
            index: 0,
            label: String::new(),
            sampling_frequency: 500.0,
            number_of_samples: 501,
            channels: Vec::new(),
            waveform_data: &[],
        };

        let metadata = patient_metadata(&tree, Some(&g));
        assert_eq!(metadata[KEY_PATIENT_ID], "PAT01");
        assert_eq!(metadata[KEY_ACCESSION_NUMBER], "ACC9");
        assert_eq!(metadata[KEY_STUDY_DATE], "20240131");
        assert_eq!(metadata[KEY_STUDY_TIME], "101500");
        assert_eq!(metadata[KEY_START_DATETIME], "2024-01-31 10:15:00.250000");
        assert_eq!(metadata[KEY_END_DATETIME], "2024-01-31 10:15:01.250000");
    }

    #[test]
    fn test_metadata_falls_back_to_raw_study_values() {
        let tree = DataSet::new()
            .with(Element::text(STUDY_DATE, Vr::DA, "2024"))
            .with(Element::text(STUDY_TIME, Vr::TM, "12"));
        let metadata = patient_metadata(&tree, None);
        assert_eq!(metadata[KEY_STUDY_DATE], "2024");
        assert_eq!(metadata[KEY_STUDY_TIME], "12");
        assert_eq!(metadata[KEY_START_DATETIME], "");
    }

    #[test]
    fn test_metadata_study_values_kept_raw_without_content() {
        let tree = DataSet::new()
            .with(Element::text(STUDY_DATE, Vr::DA, "20240131"))
            .with(Element::text(STUDY_TIME, Vr::TM, "101500.5"));
        let g = MultiplexGroup {
            number_of_samples: 10,
            ..group(0, &[])
        };

        let metadata = patient_metadata(&tree, Some(&g));
        assert_eq!(metadata[KEY_STUDY_DATE], "20240131");
        assert_eq!(metadata[KEY_STUDY_TIME], "101500.5");
        assert_eq!(metadata[KEY_START_DATETIME], "");
        assert_eq!(metadata[KEY_END_DATETIME], "");
    }

    #[test]
    fn test_metadata_end_left_empty_when_out_of_range() {
        let tree = DataSet::new()
            .with(Element::text(CONTENT_DATE, Vr::DA, "20240131"))
            .with(Element::text(CONTENT_TIME, Vr::TM, "101500"));
        let g = MultiplexGroup {
            sampling_frequency: 1e-12,
            number_of_samples: 10,
            ..group(0, &[])
        };

        let metadata = patient_metadata(&tree, Some(&g));
        assert_eq!(metadata[KEY_START_DATETIME], "2024-01-31 10:15:00.000000");
        assert_eq!(metadata[KEY_END_DATETIME], "");
    }

    #[test]
    fn test_assemble_carries_bits_stored() {
        let mut g = group(0, &["I"]);
        g.channels[0].bits_stored = Some(12);
        let mut decoded = DecodedChannels::new();
        decoded.insert((0, 0), vec![1.0, 2.0]);

        let (record, _) = assemble(&[g], decoded, BTreeMap::new());
        assert_eq!(record.groups[0].channels[0].bits_stored, Some(12));
    }

    #[test]
    fn test_split_groups_sets_channel() {
        let groups = vec![group(0, &["I"]), MultiplexGroup { label: String::new(), ..group(1, &["II"]) }];
        let mut decoded = DecodedChannels::new();
        decoded.insert((0, 0), vec![1.0, 2.0]);
        decoded.insert((1, 0), vec![3.0, 4.0]);
        let (record, _) = assemble(&groups, decoded, patient_metadata(&DataSet::new(), None));

        let split = split_groups(record);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].metadata[KEY_CHANNEL], "G0");
        assert_eq!(split[1].metadata[KEY_CHANNEL], "group_1");
        assert_eq!(split[1].groups[0].channel_labels, vec!["II"]);
    }
}
