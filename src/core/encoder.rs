// Explicit VR little endian encoder for synthetic containers

use crate::core::constants::*;
use crate::core::format::{DataSet, Element, Tag, Value, Vr};

/// Encodes a dataset as a Part-10 file (preamble, meta group, explicit VR
/// little endian body). Sequences and items use undefined lengths.
pub fn encode_part10(dataset: &DataSet) -> Vec<u8> {
    let mut out = vec![0u8; PREAMBLE_SIZE];
    out.extend_from_slice(MAGIC);

    let meta = Element::text(TRANSFER_SYNTAX_UID, Vr::UI, EXPLICIT_VR_LITTLE_ENDIAN);
    write_element(&mut out, &meta);
    write_dataset(&mut out, dataset);
    out
}

/// Encodes a dataset body only, without preamble or meta group.
pub fn encode_dataset(dataset: &DataSet) -> Vec<u8> {
    let mut out = Vec::new();
    write_dataset(&mut out, dataset);
    out
}

fn write_dataset(out: &mut Vec<u8>, dataset: &DataSet) {
    for element in dataset.iter() {
        write_element(out, element);
    }
}

fn write_tag(out: &mut Vec<u8>, tag: Tag) {
    out.extend_from_slice(&tag.0.to_le_bytes());
    out.extend_from_slice(&tag.1.to_le_bytes());
}

fn write_element(out: &mut Vec<u8>, element: &Element) {
    write_tag(out, element.tag);
    out.extend_from_slice(&element.vr.0);

    match &element.value {
        Value::Sequence(items) => {
            out.extend_from_slice(&[0, 0]);
            out.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
            for item in items {
                write_tag(out, ITEM);
                out.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
                write_dataset(out, item);
                write_tag(out, ITEM_DELIMITATION);
                out.extend_from_slice(&0u32.to_le_bytes());
            }
            write_tag(out, SEQUENCE_DELIMITATION);
            out.extend_from_slice(&0u32.to_le_bytes());
        }
        Value::Primitive(bytes) => {
            let mut bytes = bytes.clone();
            if bytes.len() % 2 == 1 {
                let pad = match element.vr {
                    Vr::UI => 0,
                    vr if vr.is_text() => b' ',
                    _ => 0,
                };
                bytes.push(pad);
            }
            if element.vr.has_long_length() {
                out.extend_from_slice(&[0, 0]);
                out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            } else {
                out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
            }
            out.extend_from_slice(&bytes);
        }
    }
}
