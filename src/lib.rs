// DICOM waveform extractor
// Main library entry point

pub mod core;
pub mod output;

// Re-export main types
pub use crate::core::assembler::{DecodedGroup, ExtractionRecord};
pub use crate::core::error::{ErrorKind, Issue, Result, WaveformError};
pub use crate::core::extract::{extract, Extraction};
pub use crate::core::format::{DataSet, Element, Tag, Value, Vr};
pub use crate::core::locator::{ChannelDefinition, MultiplexGroup};
pub use crate::core::reader::{DicomFile, DicomReader};
pub use crate::output::metadata::MetadataFormat;
pub use crate::output::writer::RecordWriter;
