// Example usage of the waveform extractor on a single container

use dcm_waveform::core::constants::*;
use dcm_waveform::core::encoder::encode_part10;
use dcm_waveform::output::csv::render_group_csv;
use dcm_waveform::{extract, DataSet, DicomReader, Element, Result, Vr};
use tracing::{info, warn, Level};

// Two-channel 250 Hz group used when no path is given
fn synthetic() -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..8i16 {
        data.extend_from_slice(&(i * 10).to_le_bytes());
        data.extend_from_slice(&(-i * 10).to_le_bytes());
    }

    let lead = |label: &str| {
        DataSet::new()
            .with(Element::text(CHANNEL_LABEL, Vr::SH, label))
            .with(Element::text(CHANNEL_SENSITIVITY, Vr::DS, "2.5"))
            .with(Element::text(CHANNEL_BASELINE, Vr::DS, "0"))
    };

    let group = DataSet::new()
        .with(Element::text(MULTIPLEX_GROUP_LABEL, Vr::CS, "RHYTHM"))
        .with(Element::text(SAMPLING_FREQUENCY, Vr::DS, "250"))
        .with(Element::primitive(NUMBER_OF_WAVEFORM_SAMPLES, Vr::UL, 8u32.to_le_bytes().to_vec()))
        .with(Element::primitive(WAVEFORM_BITS_ALLOCATED, Vr::US, 16u16.to_le_bytes().to_vec()))
        .with(Element::text(WAVEFORM_SAMPLE_INTERPRETATION, Vr::CS, "SS"))
        .with(Element::sequence(CHANNEL_DEFINITION_SEQUENCE, vec![lead("I"), lead("II")]))
        .with(Element::primitive(WAVEFORM_DATA, Vr::OW, data));

    encode_part10(
        &DataSet::new()
            .with(Element::text(PATIENT_ID, Vr::LO, "DEMO01"))
            .with(Element::text(STUDY_DATE, Vr::DA, "20240131"))
            .with(Element::text(STUDY_TIME, Vr::TM, "093000"))
            .with(Element::sequence(WAVEFORM_SEQUENCE, vec![group])),
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let file = match std::env::args().nth(1) {
        Some(path) => DicomReader::open(path)?,
        None => DicomReader::from_bytes(&synthetic())?,
    };
    info!("Transfer syntax: {:?}", file.transfer_syntax());

    let extraction = extract(file.dataset());
    for issue in &extraction.issues {
        warn!("{}", issue);
    }

    for (key, value) in &extraction.record.metadata {
        if !value.is_empty() {
            info!("{} = {}", key, value);
        }
    }

    for group in &extraction.record.groups {
        info!(
            "Group {} '{}': {} Hz, {} samples, channels {:?}",
            group.index,
            group.label,
            group.sampling_frequency,
            group.number_of_samples,
            group.channel_labels
        );
        for line in render_group_csv(group).lines().take(4) {
            info!("  {}", line);
        }
    }

    Ok(())
}
