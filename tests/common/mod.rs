#![allow(dead_code)]

use dcm_waveform::core::constants::*;
use dcm_waveform::core::encoder::encode_dataset;
use dcm_waveform::{DataSet, Element, Tag, Value, Vr};

pub fn i16_bytes(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn channel(label: &str) -> DataSet {
    DataSet::new().with(Element::text(CHANNEL_LABEL, Vr::SH, label))
}

pub fn calibrated_channel(label: &str, sensitivity: &str, correction: &str, baseline: &str) -> DataSet {
    channel(label)
        .with(Element::text(CHANNEL_SENSITIVITY, Vr::DS, sensitivity))
        .with(Element::text(CHANNEL_SENSITIVITY_CORRECTION_FACTOR, Vr::DS, correction))
        .with(Element::text(CHANNEL_BASELINE, Vr::DS, baseline))
}

/// A 16-bit signed multiplex group with interleaved `data`.
pub fn ss16_group(label: &str, frequency: &str, samples: u32, channels: Vec<DataSet>, data: Vec<u8>) -> DataSet {
    DataSet::new()
        .with(Element::text(MULTIPLEX_GROUP_LABEL, Vr::SH, label))
        .with(Element::text(SAMPLING_FREQUENCY, Vr::DS, frequency))
        .with(Element::primitive(NUMBER_OF_WAVEFORM_SAMPLES, Vr::UL, samples.to_le_bytes().to_vec()))
        .with(Element::primitive(WAVEFORM_BITS_ALLOCATED, Vr::US, 16u16.to_le_bytes().to_vec()))
        .with(Element::text(WAVEFORM_SAMPLE_INTERPRETATION, Vr::CS, "SS"))
        .with(Element::sequence(CHANNEL_DEFINITION_SEQUENCE, channels))
        .with(Element::primitive(WAVEFORM_DATA, Vr::OW, data))
}

pub fn study(patient_id: &str, groups: Vec<DataSet>) -> DataSet {
    DataSet::new()
        .with(Element::text(PATIENT_ID, Vr::LO, patient_id))
        .with(Element::text(STUDY_DATE, Vr::DA, "20240131"))
        .with(Element::text(STUDY_TIME, Vr::TM, "101500"))
        .with(Element::text(MODALITY, Vr::CS, "ECG"))
        .with(Element::sequence(WAVEFORM_SEQUENCE, groups))
}

/// The group of 500 Hz, three samples of [-10, 0, 10] on one SS channel.
pub fn reference_study() -> DataSet {
    study(
        "PAT01",
        vec![ss16_group("RHYTHM", "500", 3, vec![channel("II")], i16_bytes(&[-10, 0, 10]))],
    )
}

/// Preamble, magic and a meta group naming `transfer_syntax`, then `body` as is.
pub fn part10(transfer_syntax: &str, body: &[u8]) -> Vec<u8> {
    let meta = DataSet::new().with(Element::text(TRANSFER_SYNTAX_UID, Vr::UI, transfer_syntax));
    let mut out = vec![0u8; PREAMBLE_SIZE];
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&encode_dataset(&meta));
    out.extend_from_slice(body);
    out
}

fn write_tag(out: &mut Vec<u8>, tag: Tag) {
    out.extend_from_slice(&tag.0.to_le_bytes());
    out.extend_from_slice(&tag.1.to_le_bytes());
}

/// Implicit VR little endian body with defined-length sequences and items.
pub fn encode_implicit(dataset: &DataSet) -> Vec<u8> {
    let mut out = Vec::new();
    for element in dataset.iter() {
        write_tag(&mut out, element.tag);
        let value = match &element.value {
            Value::Primitive(bytes) => {
                let mut bytes = bytes.clone();
                if bytes.len() % 2 == 1 {
                    bytes.push(if element.vr.is_text() { b' ' } else { 0 });
                }
                bytes
            }
            Value::Sequence(items) => {
                let mut seq = Vec::new();
                for item in items {
                    let body = encode_implicit(item);
                    write_tag(&mut seq, ITEM);
                    seq.extend_from_slice(&(body.len() as u32).to_le_bytes());
                    seq.extend_from_slice(&body);
                }
                seq
            }
        };
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        out.extend_from_slice(&value);
    }
    out
}
