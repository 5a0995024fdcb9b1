// Format constants for DICOM waveform containers

use crate::core::format::Tag;

pub const PREAMBLE_SIZE: usize = 128;
pub const MAGIC: &[u8; 4] = b"DICM";

// Undefined length marker for sequences, items and encapsulated values
pub const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

// Sequence nesting guard
pub const MAX_NESTING_DEPTH: usize = 16;

// Transfer syntaxes
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSyntax {
    ImplicitVrLittleEndian,
    ExplicitVrLittleEndian,
    DeflatedExplicitVrLittleEndian,
    ExplicitVrBigEndian,
}

impl TransferSyntax {
    pub fn from_uid(uid: &str) -> Self {
        match uid.trim_end_matches(['\0', ' ']) {
            IMPLICIT_VR_LITTLE_ENDIAN => TransferSyntax::ImplicitVrLittleEndian,
            DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN => TransferSyntax::DeflatedExplicitVrLittleEndian,
            EXPLICIT_VR_BIG_ENDIAN => TransferSyntax::ExplicitVrBigEndian,
            // Encapsulated syntaxes all encode the dataset as explicit VR LE
            _ => TransferSyntax::ExplicitVrLittleEndian,
        }
    }

    pub fn is_explicit(self) -> bool {
        !matches!(self, TransferSyntax::ImplicitVrLittleEndian)
    }
}

// Item / delimiter tags
pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
pub const ITEM_DELIMITATION: Tag = Tag(0xFFFE, 0xE00D);
pub const SEQUENCE_DELIMITATION: Tag = Tag(0xFFFE, 0xE0DD);

// File meta
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);

// Patient / study
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
pub const CONTENT_TIME: Tag = Tag(0x0008, 0x0033);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);

// Multiplex group
pub const WAVEFORM_SEQUENCE: Tag = Tag(0x5400, 0x0100);
pub const NUMBER_OF_WAVEFORM_SAMPLES: Tag = Tag(0x003A, 0x0010);
pub const SAMPLING_FREQUENCY: Tag = Tag(0x003A, 0x001A);
pub const MULTIPLEX_GROUP_LABEL: Tag = Tag(0x003A, 0x0020);
pub const CHANNEL_DEFINITION_SEQUENCE: Tag = Tag(0x003A, 0x0200);
pub const WAVEFORM_BITS_ALLOCATED: Tag = Tag(0x5400, 0x1004);
pub const WAVEFORM_SAMPLE_INTERPRETATION: Tag = Tag(0x5400, 0x1006);
pub const WAVEFORM_DATA: Tag = Tag(0x5400, 0x1010);

// Channel definition
pub const CHANNEL_LABEL: Tag = Tag(0x003A, 0x0203);
pub const CHANNEL_SOURCE_SEQUENCE: Tag = Tag(0x003A, 0x0208);
pub const CHANNEL_SENSITIVITY: Tag = Tag(0x003A, 0x0210);
pub const CHANNEL_SENSITIVITY_UNITS_SEQUENCE: Tag = Tag(0x003A, 0x0211);
pub const CHANNEL_SENSITIVITY_CORRECTION_FACTOR: Tag = Tag(0x003A, 0x0212);
pub const CHANNEL_BASELINE: Tag = Tag(0x003A, 0x0213);
pub const WAVEFORM_BITS_STORED: Tag = Tag(0x003A, 0x021A);

// Metadata placeholders exposed to the output template
pub const KEY_ACCESSION_NUMBER: &str = "ACCESSION_NUMBER";
pub const KEY_PATIENT_NAME: &str = "PATIENT_NAME";
pub const KEY_PATIENT_ID: &str = "PATIENT_ID";
pub const KEY_STUDY_DATE: &str = "STUDY_DATE";
pub const KEY_STUDY_TIME: &str = "STUDY_TIME";
pub const KEY_SERIES_DESCRIPTION: &str = "SERIES_DESCRIPTION";
pub const KEY_MODALITY: &str = "MODALITY";
pub const KEY_SOP_INSTANCE_UID: &str = "SOP_INSTANCE_UID";
pub const KEY_START_DATETIME: &str = "START_DATETIME";
pub const KEY_END_DATETIME: &str = "END_DATETIME";
pub const KEY_CHANNEL: &str = "CHANNEL";

pub const METADATA_KEYS: [&str; 11] = [
    KEY_ACCESSION_NUMBER,
    KEY_PATIENT_NAME,
    KEY_PATIENT_ID,
    KEY_STUDY_DATE,
    KEY_STUDY_TIME,
    KEY_SERIES_DESCRIPTION,
    KEY_MODALITY,
    KEY_SOP_INSTANCE_UID,
    KEY_START_DATETIME,
    KEY_END_DATETIME,
    KEY_CHANNEL,
];
