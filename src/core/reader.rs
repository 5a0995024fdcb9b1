// Container reader: Part-10 files and bare datasets into an owned tag tree

use crate::core::compression::inflate;
use crate::core::constants::*;
use crate::core::dictionary;
use crate::core::error::{Result, WaveformError};
use crate::core::format::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A parsed container. Owns the whole tree; everything downstream borrows from it.
#[derive(Debug, Clone)]
pub struct DicomFile {
    path: Option<PathBuf>,
    transfer_syntax: TransferSyntax,
    dataset: DataSet,
}

impl DicomFile {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn transfer_syntax(&self) -> TransferSyntax {
        self.transfer_syntax
    }

    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }
}

pub struct DicomReader;

impl DicomReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<DicomFile> {
        let path = path.as_ref().to_path_buf();
        let bytes = std::fs::read(&path)?;
        let mut file = Self::from_bytes(&bytes)?;
        file.path = Some(path);
        Ok(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<DicomFile> {
        if bytes.is_empty() {
            return Err(WaveformError::CorruptedData("empty file".to_string()));
        }

        let body = if bytes.len() >= PREAMBLE_SIZE + MAGIC.len()
            && &bytes[PREAMBLE_SIZE..PREAMBLE_SIZE + MAGIC.len()] == MAGIC
        {
            &bytes[PREAMBLE_SIZE + MAGIC.len()..]
        } else {
            debug!("no preamble, reading dataset directly");
            bytes
        };

        let mut cursor = ByteCursor::new(body);
        let meta = if cursor.peek_u16() == Some(0x0002) {
            Self::read_meta(&mut cursor)?
        } else {
            DataSet::new()
        };

        let rest = cursor.rest();
        let transfer_syntax = match meta.string(TRANSFER_SYNTAX_UID) {
            Some(uid) => TransferSyntax::from_uid(&uid),
            None => Self::guess_syntax(rest),
        };
        debug!("transfer syntax: {:?}", transfer_syntax);

        let dataset = match transfer_syntax {
            TransferSyntax::ExplicitVrBigEndian => {
                return Err(WaveformError::UnsupportedTransferSyntax(
                    EXPLICIT_VR_BIG_ENDIAN.to_string(),
                ));
            }
            TransferSyntax::DeflatedExplicitVrLittleEndian => {
                let inflated = inflate(rest)?;
                Parser::new(&inflated, true).read_root()?
            }
            syntax => Parser::new(rest, syntax.is_explicit()).read_root()?,
        };

        Ok(DicomFile {
            path: None,
            transfer_syntax,
            dataset,
        })
    }

    // File meta group is always explicit VR little endian
    fn read_meta(cursor: &mut ByteCursor<'_>) -> Result<DataSet> {
        let mut meta = DataSet::new();
        let mut parser = Parser {
            cursor: ByteCursor::new(cursor.rest()),
            explicit: true,
        };
        while parser.cursor.peek_u16() == Some(0x0002) {
            let tag = parser.cursor.read_tag()?;
            let element = parser.read_element(tag, 0)?;
            meta.insert(element);
        }
        cursor.advance(parser.cursor.pos);
        Ok(meta)
    }

    fn guess_syntax(rest: &[u8]) -> TransferSyntax {
        let explicit = rest
            .get(4..6)
            .and_then(|code| <[u8; 2]>::try_from(code).ok())
            .and_then(Vr::from_bytes)
            .is_some();
        if explicit {
            TransferSyntax::ExplicitVrLittleEndian
        } else {
            TransferSyntax::ImplicitVrLittleEndian
        }
    }
}

struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(WaveformError::CorruptedData(format!(
                "value of {} bytes at offset {} exceeds remaining {} bytes",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let group = self.read_u16()?;
        let element = self.read_u16()?;
        Ok(Tag(group, element))
    }

    fn peek_u16(&self) -> Option<u16> {
        let bytes = self.data.get(self.pos..self.pos + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// End offset of a value of `len` bytes starting here, checked against the buffer.
    fn end_of(&self, len: u32) -> Result<usize> {
        let len = len as usize;
        if len > self.remaining() {
            return Err(WaveformError::CorruptedData(format!(
                "declared length {} at offset {} exceeds remaining {} bytes",
                len,
                self.pos,
                self.remaining()
            )));
        }
        Ok(self.pos + len)
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Eof,
    Until(usize),
    Delimited,
}

struct Parser<'a> {
    cursor: ByteCursor<'a>,
    explicit: bool,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8], explicit: bool) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            explicit,
        }
    }

    fn read_root(&mut self) -> Result<DataSet> {
        self.read_dataset(Bound::Eof, 0)
    }

    fn read_dataset(&mut self, bound: Bound, depth: usize) -> Result<DataSet> {
        let mut dataset = DataSet::new();
        loop {
            match bound {
                Bound::Eof if self.cursor.is_empty() => break,
                Bound::Until(end) if self.cursor.pos >= end => break,
                Bound::Delimited if self.cursor.is_empty() => {
                    return Err(WaveformError::CorruptedData(
                        "item without delimiter".to_string(),
                    ));
                }
                _ => {}
            }

            let tag = self.cursor.read_tag()?;
            if tag == ITEM_DELIMITATION {
                self.cursor.read_u32()?;
                if matches!(bound, Bound::Delimited) {
                    break;
                }
                return Err(WaveformError::CorruptedData(
                    "unexpected item delimiter".to_string(),
                ));
            }
            if tag == ITEM || tag == SEQUENCE_DELIMITATION {
                return Err(WaveformError::CorruptedData(format!(
                    "unexpected {} outside a sequence",
                    tag
                )));
            }

            let element = self.read_element(tag, depth)?;
            dataset.insert(element);
        }

        if let Bound::Until(end) = bound {
            if self.cursor.pos != end {
                return Err(WaveformError::CorruptedData(format!(
                    "item overruns its declared end at offset {}",
                    end
                )));
            }
        }
        Ok(dataset)
    }

    fn read_element(&mut self, tag: Tag, depth: usize) -> Result<Element> {
        let (vr, len) = if self.explicit {
            let code: [u8; 2] = self.cursor.read_array()?;
            match Vr::from_bytes(code) {
                Some(vr) if vr.has_long_length() => {
                    self.cursor.take(2)?;
                    (vr, self.cursor.read_u32()?)
                }
                Some(vr) => (vr, self.cursor.read_u16()? as u32),
                None => {
                    return Err(WaveformError::CorruptedData(format!(
                        "unknown VR {:?} for {}",
                        String::from_utf8_lossy(&code),
                        dictionary::describe(tag)
                    )));
                }
            }
        } else {
            (dictionary::vr_of(tag), self.cursor.read_u32()?)
        };

        if vr == Vr::SQ {
            let items = self.read_sequence(len, depth + 1)?;
            return Ok(Element::sequence(tag, items));
        }

        if len == UNDEFINED_LENGTH {
            if vr == Vr::UN {
                // Undefined-length UN is an implicit VR little endian sequence
                let explicit = self.explicit;
                self.explicit = false;
                let items = self.read_sequence(len, depth + 1);
                self.explicit = explicit;
                return Ok(Element::sequence(tag, items?));
            }
            let bytes = self.read_fragments()?;
            return Ok(Element::primitive(tag, vr, bytes));
        }

        let bytes = self.cursor.take(len as usize)?.to_vec();
        Ok(Element::primitive(tag, vr, bytes))
    }

    fn read_sequence(&mut self, len: u32, depth: usize) -> Result<Vec<DataSet>> {
        if depth > MAX_NESTING_DEPTH {
            return Err(WaveformError::CorruptedData(format!(
                "sequence nesting deeper than {}",
                MAX_NESTING_DEPTH
            )));
        }

        let end = if len == UNDEFINED_LENGTH {
            None
        } else {
            Some(self.cursor.end_of(len)?)
        };

        let mut items = Vec::new();
        loop {
            match end {
                Some(end) if self.cursor.pos >= end => break,
                None if self.cursor.is_empty() => {
                    return Err(WaveformError::CorruptedData(
                        "sequence without delimiter".to_string(),
                    ));
                }
                _ => {}
            }

            let tag = self.cursor.read_tag()?;
            let item_len = self.cursor.read_u32()?;
            match tag {
                SEQUENCE_DELIMITATION => break,
                ITEM if item_len == UNDEFINED_LENGTH => {
                    items.push(self.read_dataset(Bound::Delimited, depth)?);
                }
                ITEM => {
                    let item_end = self.cursor.end_of(item_len)?;
                    items.push(self.read_dataset(Bound::Until(item_end), depth)?);
                }
                other => {
                    return Err(WaveformError::CorruptedData(format!(
                        "unexpected {} inside a sequence",
                        dictionary::describe(other)
                    )));
                }
            }
        }

        if let Some(end) = end {
            if self.cursor.pos != end {
                return Err(WaveformError::CorruptedData(
                    "sequence overruns its declared length".to_string(),
                ));
            }
        }
        Ok(items)
    }

    // Encapsulated value: offset table item followed by fragments
    fn read_fragments(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut first = true;
        loop {
            let tag = self.cursor.read_tag()?;
            let len = self.cursor.read_u32()?;
            match tag {
                SEQUENCE_DELIMITATION => break,
                ITEM => {
                    let fragment = self.cursor.take(len as usize)?;
                    if !first {
                        bytes.extend_from_slice(fragment);
                    }
                    first = false;
                }
                other => {
                    return Err(WaveformError::CorruptedData(format!(
                        "unexpected {} inside encapsulated value",
                        other
                    )));
                }
            }
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit(tag: Tag, vr: &[u8; 2], value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&tag.0.to_le_bytes());
        out.extend_from_slice(&tag.1.to_le_bytes());
        out.extend_from_slice(vr);
        if Vr(*vr).has_long_length() {
            out.extend_from_slice(&[0, 0]);
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        } else {
            out.extend_from_slice(&(value.len() as u16).to_le_bytes());
        }
        out.extend_from_slice(value);
        out
    }

    fn implicit(tag: Tag, len: u32, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&tag.0.to_le_bytes());
        out.extend_from_slice(&tag.1.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn test_bare_explicit_dataset() {
        let mut bytes = explicit(PATIENT_ID, b"LO", b"PAT01 ");
        bytes.extend(explicit(MODALITY, b"CS", b"ECG "));

        let file = DicomReader::from_bytes(&bytes).unwrap();
        assert_eq!(file.transfer_syntax(), TransferSyntax::ExplicitVrLittleEndian);
        assert_eq!(file.dataset().string(PATIENT_ID).as_deref(), Some("PAT01"));
        assert_eq!(file.dataset().string(MODALITY).as_deref(), Some("ECG"));
    }

    #[test]
    fn test_bare_implicit_dataset_with_undefined_sequence() {
        // Waveform sequence with one undefined-length item holding a sample count
        let mut item = implicit(NUMBER_OF_WAVEFORM_SAMPLES, 4, &3u32.to_le_bytes());
        item.extend(implicit(ITEM_DELIMITATION, 0, &[]));
        let mut seq = implicit(ITEM, UNDEFINED_LENGTH, &item);
        seq.extend(implicit(SEQUENCE_DELIMITATION, 0, &[]));

        let mut bytes = implicit(PATIENT_ID, 6, b"PAT02 ");
        bytes.extend(implicit(WAVEFORM_SEQUENCE, UNDEFINED_LENGTH, &seq));

        let file = DicomReader::from_bytes(&bytes).unwrap();
        assert_eq!(file.transfer_syntax(), TransferSyntax::ImplicitVrLittleEndian);
        let items = file.dataset().items(WAVEFORM_SEQUENCE).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].uint(NUMBER_OF_WAVEFORM_SAMPLES), Some(3));
    }

    #[test]
    fn test_truncated_value_is_corrupted() {
        let mut bytes = explicit(PATIENT_ID, b"LO", b"PAT01 ");
        bytes.truncate(bytes.len() - 3);
        let err = DicomReader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, WaveformError::CorruptedData(_)));
    }

    #[test]
    fn test_empty_file_is_corrupted() {
        assert!(DicomReader::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_big_endian_rejected() {
        let mut bytes = vec![0u8; PREAMBLE_SIZE];
        bytes.extend_from_slice(MAGIC);
        bytes.extend(explicit(TRANSFER_SYNTAX_UID, b"UI", b"1.2.840.10008.1.2.2\0"));
        let err = DicomReader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, WaveformError::UnsupportedTransferSyntax(_)));
    }

    #[test]
    fn test_unknown_vr_names_the_element() {
        let mut bytes = vec![0u8; PREAMBLE_SIZE];
        bytes.extend_from_slice(MAGIC);
        bytes.extend(explicit(TRANSFER_SYNTAX_UID, b"UI", b"1.2.840.10008.1.2.1\0"));
        bytes.extend(explicit(PATIENT_ID, b"ZZ", b"AB"));

        match DicomReader::from_bytes(&bytes).unwrap_err() {
            WaveformError::CorruptedData(msg) => assert!(msg.contains("(0010,0020) PatientID"), "{}", msg),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = DicomReader::open("/definitely/not/here.dcm").unwrap_err();
        assert!(matches!(err, WaveformError::Io(_)));
    }
}
