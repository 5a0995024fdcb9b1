mod common;

use common::*;
use dcm_waveform::core::constants::*;
use dcm_waveform::core::encoder::{encode_dataset, encode_part10};
use dcm_waveform::output::csv::render_group_csv;
use dcm_waveform::{
    extract, DicomReader, Element, ErrorKind, MetadataFormat, RecordWriter, Vr, WaveformError,
};
use std::fs;

#[test]
fn test_reference_container_to_csv() {
    let file = DicomReader::from_bytes(&encode_part10(&reference_study())).unwrap();
    let extraction = extract(file.dataset());

    assert!(extraction.issues.is_empty());
    let groups = &extraction.record.groups;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].channel_labels, vec!["II".to_string()]);
    assert_eq!(
        render_group_csv(&groups[0]),
        "sample_index,time_seconds,II\n0,0.0,-10.0\n1,0.002,0.0\n2,0.004,10.0\n"
    );
    assert_eq!(extraction.record.metadata["PATIENT_ID"], "PAT01");
    assert_eq!(extraction.record.metadata["STUDY_DATE"], "20240131");
    assert_eq!(extraction.record.metadata["MODALITY"], "ECG");
}

#[test]
fn test_calibration_through_container() {
    let dataset = study(
        "PAT02",
        vec![ss16_group(
            "RHYTHM",
            "100",
            1,
            vec![calibrated_channel("I", "2.0", "0.5", "10.0")],
            i16_bytes(&[100]),
        )],
    );
    let file = DicomReader::from_bytes(&encode_part10(&dataset)).unwrap();
    let extraction = extract(file.dataset());
    assert_eq!(extraction.record.groups[0].samples, vec![vec![110.0]]);
}

#[test]
fn test_zero_groups_signal_no_waveform() {
    let file = DicomReader::from_bytes(&encode_part10(&study("PAT03", Vec::new()))).unwrap();
    let extraction = extract(file.dataset());

    assert!(extraction.record.groups.is_empty());
    assert_eq!(extraction.issues.len(), 1);
    assert_eq!(extraction.issues[0].kind(), ErrorKind::NoWaveformData);
    assert!(!extraction.issues[0].kind().is_file_fatal());
    assert_eq!(extraction.record.metadata["PATIENT_ID"], "PAT03");
}

#[test]
fn test_truncated_channel_leaves_sibling_intact() {
    // Two 16-bit channels over two samples need 8 bytes; the last frame is cut short
    let group = ss16_group("A", "250", 2, vec![channel("I"), channel("II")], i16_bytes(&[1, 2, 3]));

    let file = DicomReader::from_bytes(&encode_part10(&study("PAT04", vec![group]))).unwrap();
    let extraction = extract(file.dataset());

    let groups = &extraction.record.groups;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].channel_labels, vec!["I".to_string()]);
    assert_eq!(groups[0].samples, vec![vec![1.0, 3.0]]);

    assert_eq!(extraction.issues.len(), 1);
    let issue = &extraction.issues[0];
    assert_eq!(issue.kind(), ErrorKind::MalformedChannelData);
    assert_eq!((issue.group, issue.channel), (Some(0), Some(1)));
}

#[test]
fn test_group_without_frequency_is_skipped() {
    let group = ss16_group("A", "0", 1, vec![channel("I")], i16_bytes(&[5]));
    let ok = ss16_group("B", "100", 1, vec![channel("I")], i16_bytes(&[5]));

    let file = DicomReader::from_bytes(&encode_part10(&study("PAT05", vec![group, ok]))).unwrap();
    let extraction = extract(file.dataset());

    assert_eq!(extraction.record.groups.len(), 1);
    assert_eq!(extraction.record.groups[0].index, 1);
    assert_eq!(extraction.issues[0].kind(), ErrorKind::InvalidMultiplexGroup);
    assert_eq!(extraction.issues[0].group, Some(0));
}

#[test]
fn test_unsupported_interpretation_reported_per_channel() {
    let group = ss16_group("A", "250", 2, vec![channel("I"), channel("II")], i16_bytes(&[1, 2, 3, 4]))
        .with(Element::text(WAVEFORM_SAMPLE_INTERPRETATION, Vr::CS, "MB"));

    let file = DicomReader::from_bytes(&encode_part10(&study("PAT06", vec![group]))).unwrap();
    let extraction = extract(file.dataset());

    assert!(extraction.record.groups.is_empty());
    let reported: Vec<_> = extraction
        .issues
        .iter()
        .map(|issue| (issue.kind(), issue.group, issue.channel))
        .collect();
    assert_eq!(
        reported,
        vec![
            (ErrorKind::UnsupportedEncoding, Some(0), Some(0)),
            (ErrorKind::UnsupportedEncoding, Some(0), Some(1)),
            (ErrorKind::NoWaveformData, None, None),
        ]
    );
}

#[test]
fn test_extreme_frequency_leaves_end_datetime_empty() {
    let dataset = study(
        "PAT07",
        vec![ss16_group("RHYTHM", "1e-12", 10, vec![channel("II")], i16_bytes(&[0; 10]))],
    )
    .with(Element::text(CONTENT_DATE, Vr::DA, "20240131"))
    .with(Element::text(CONTENT_TIME, Vr::TM, "101500"));

    let file = DicomReader::from_bytes(&encode_part10(&dataset)).unwrap();
    let extraction = extract(file.dataset());

    assert_eq!(extraction.record.groups.len(), 1);
    assert_eq!(extraction.record.metadata["START_DATETIME"], "2024-01-31 10:15:00.000000");
    assert_eq!(extraction.record.metadata["END_DATETIME"], "");
}

#[test]
fn test_implicit_vr_container() {
    let bytes = part10(IMPLICIT_VR_LITTLE_ENDIAN, &encode_implicit(&reference_study()));
    let file = DicomReader::from_bytes(&bytes).unwrap();
    let extraction = extract(file.dataset());

    assert!(extraction.issues.is_empty());
    assert_eq!(extraction.record.groups[0].samples, vec![vec![-10.0, 0.0, 10.0]]);
}

#[cfg(feature = "deflate")]
#[test]
fn test_deflated_container() {
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&encode_dataset(&reference_study())).unwrap();
    let body = encoder.finish().unwrap();

    let file = DicomReader::from_bytes(&part10(DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN, &body)).unwrap();
    let extraction = extract(file.dataset());
    assert_eq!(extraction.record.groups[0].samples, vec![vec![-10.0, 0.0, 10.0]]);
}

#[test]
fn test_big_endian_is_unreadable() {
    let bytes = part10(EXPLICIT_VR_BIG_ENDIAN, &encode_dataset(&reference_study()));
    let err = DicomReader::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, WaveformError::UnsupportedTransferSyntax(_)));
    assert_eq!(err.kind(), ErrorKind::UnreadableContainer);
}

#[test]
fn test_truncated_container_is_unreadable() {
    let mut bytes = encode_part10(&reference_study());
    bytes.truncate(bytes.len() - 3);
    let err = DicomReader::from_bytes(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnreadableContainer);
}

#[tokio::test]
async fn test_written_record_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ecg.dcm");
    fs::write(&path, encode_part10(&reference_study())).unwrap();

    let file = DicomReader::open(&path).unwrap();
    assert_eq!(file.path(), Some(path.as_path()));
    let extraction = extract(file.dataset());

    let out = dir.path().join("out");
    let writer = RecordWriter::new(&out, "{PATIENT_ID}/{STUDY_DATE}/{ACCESSION_NUMBER}", MetadataFormat::Json);
    let written = writer.write(&extraction.record, false).await.unwrap();
    assert_eq!(written.len(), 2);

    let record_dir = out.join("PAT01/20240131/UNKNOWN_ACCESSION_NUMBER");
    let csv = fs::read_to_string(record_dir.join("RHYTHM.csv")).unwrap();
    assert!(csv.ends_with("2,0.004,10.0\n"));

    let metadata: serde_json::Value =
        serde_json::from_slice(&fs::read(record_dir.join("metadata.json")).unwrap()).unwrap();
    assert_eq!(metadata["PATIENT_ID"], "PAT01");
    assert_eq!(metadata["ACCESSION_NUMBER"], "");
    assert_eq!(metadata["groups"][0]["sampling_frequency"], 500.0);
    assert_eq!(metadata["groups"][0]["number_of_samples"], 3);
    assert_eq!(metadata["groups"][0]["channel_labels"][0], "II");
}

#[tokio::test]
async fn test_rewriting_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = encode_part10(&reference_study());
    let writer = RecordWriter::new(dir.path(), "{PATIENT_ID}", MetadataFormat::Yaml);

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let file = DicomReader::from_bytes(&bytes).unwrap();
        let record = extract(file.dataset()).record;
        let paths = writer.write(&record, false).await.unwrap();
        let contents: Vec<Vec<u8>> = paths.iter().map(|p| fs::read(p).unwrap()).collect();
        snapshots.push(contents);
    }
    assert_eq!(snapshots[0], snapshots[1]);
}
