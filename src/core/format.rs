// Data structures for the tagged element tree

use std::collections::BTreeMap;
use std::fmt;

/// (group, element) pair identifying a data element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub u16, pub u16);

impl Tag {
    pub fn group(self) -> u16 {
        self.0
    }

    pub fn element(self) -> u16 {
        self.1
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

/// Two-letter value representation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vr(pub [u8; 2]);

impl Vr {
    pub const AE: Vr = Vr(*b"AE");
    pub const AS: Vr = Vr(*b"AS");
    pub const AT: Vr = Vr(*b"AT");
    pub const CS: Vr = Vr(*b"CS");
    pub const DA: Vr = Vr(*b"DA");
    pub const DS: Vr = Vr(*b"DS");
    pub const DT: Vr = Vr(*b"DT");
    pub const FD: Vr = Vr(*b"FD");
    pub const FL: Vr = Vr(*b"FL");
    pub const IS: Vr = Vr(*b"IS");
    pub const LO: Vr = Vr(*b"LO");
    pub const LT: Vr = Vr(*b"LT");
    pub const OB: Vr = Vr(*b"OB");
    pub const OD: Vr = Vr(*b"OD");
    pub const OF: Vr = Vr(*b"OF");
    pub const OL: Vr = Vr(*b"OL");
    pub const OV: Vr = Vr(*b"OV");
    pub const OW: Vr = Vr(*b"OW");
    pub const PN: Vr = Vr(*b"PN");
    pub const SH: Vr = Vr(*b"SH");
    pub const SL: Vr = Vr(*b"SL");
    pub const SQ: Vr = Vr(*b"SQ");
    pub const SS: Vr = Vr(*b"SS");
    pub const ST: Vr = Vr(*b"ST");
    pub const SV: Vr = Vr(*b"SV");
    pub const TM: Vr = Vr(*b"TM");
    pub const UC: Vr = Vr(*b"UC");
    pub const UI: Vr = Vr(*b"UI");
    pub const UL: Vr = Vr(*b"UL");
    pub const UN: Vr = Vr(*b"UN");
    pub const UR: Vr = Vr(*b"UR");
    pub const US: Vr = Vr(*b"US");
    pub const UT: Vr = Vr(*b"UT");
    pub const UV: Vr = Vr(*b"UV");

    const KNOWN: [Vr; 34] = [
        Vr::AE, Vr::AS, Vr::AT, Vr::CS, Vr::DA, Vr::DS, Vr::DT, Vr::FD, Vr::FL,
        Vr::IS, Vr::LO, Vr::LT, Vr::OB, Vr::OD, Vr::OF, Vr::OL, Vr::OV, Vr::OW,
        Vr::PN, Vr::SH, Vr::SL, Vr::SQ, Vr::SS, Vr::ST, Vr::SV, Vr::TM, Vr::UC,
        Vr::UI, Vr::UL, Vr::UN, Vr::UR, Vr::US, Vr::UT, Vr::UV,
    ];

    pub fn from_bytes(code: [u8; 2]) -> Option<Self> {
        let vr = Vr(code);
        Vr::KNOWN.contains(&vr).then_some(vr)
    }

    /// Explicit VR elements with a 2-byte reserved field and a 4-byte length.
    pub fn has_long_length(self) -> bool {
        matches!(
            self,
            Vr::OB | Vr::OD | Vr::OF | Vr::OL | Vr::OV | Vr::OW | Vr::SQ | Vr::SV
                | Vr::UC | Vr::UN | Vr::UR | Vr::UT | Vr::UV
        )
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            Vr::AE | Vr::AS | Vr::CS | Vr::DA | Vr::DS | Vr::DT | Vr::IS | Vr::LO
                | Vr::LT | Vr::PN | Vr::SH | Vr::ST | Vr::TM | Vr::UC | Vr::UI
                | Vr::UR | Vr::UT
        )
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for Vr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Primitive(Vec<u8>),
    Sequence(Vec<DataSet>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub vr: Vr,
    pub value: Value,
}

impl Element {
    pub fn primitive(tag: Tag, vr: Vr, bytes: Vec<u8>) -> Self {
        Self {
            tag,
            vr,
            value: Value::Primitive(bytes),
        }
    }

    pub fn text(tag: Tag, vr: Vr, text: &str) -> Self {
        Self::primitive(tag, vr, text.as_bytes().to_vec())
    }

    pub fn sequence(tag: Tag, items: Vec<DataSet>) -> Self {
        Self {
            tag,
            vr: Vr::SQ,
            value: Value::Sequence(items),
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Primitive(bytes) => Some(bytes),
            Value::Sequence(_) => None,
        }
    }

    pub fn items(&self) -> Option<&[DataSet]> {
        match &self.value {
            Value::Sequence(items) => Some(items),
            Value::Primitive(_) => None,
        }
    }

    /// Text value with DICOM padding (trailing spaces / NULs, leading spaces) removed.
    pub fn to_text(&self) -> Option<String> {
        let bytes = self.bytes()?;
        let text = String::from_utf8_lossy(bytes);
        Some(text.trim_end_matches(['\0', ' ']).trim_start().to_string())
    }

    /// First value as a float, for numeric string and binary numeric VRs.
    pub fn to_f64(&self) -> Option<f64> {
        let bytes = self.bytes()?;
        match self.vr {
            Vr::FD => Some(f64::from_le_bytes(bytes.get(..8)?.try_into().ok()?)),
            Vr::FL => Some(f32::from_le_bytes(bytes.get(..4)?.try_into().ok()?) as f64),
            Vr::US | Vr::UL | Vr::UV => self.to_u64().map(|v| v as f64),
            Vr::SS => Some(i16::from_le_bytes(bytes.get(..2)?.try_into().ok()?) as f64),
            Vr::SL => Some(i32::from_le_bytes(bytes.get(..4)?.try_into().ok()?) as f64),
            _ => first_component(&self.to_text()?)?.parse::<f64>().ok(),
        }
    }

    /// First value as an unsigned integer.
    pub fn to_u64(&self) -> Option<u64> {
        let bytes = self.bytes()?;
        match self.vr {
            Vr::US => Some(u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?) as u64),
            Vr::UL => Some(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?) as u64),
            Vr::UV => Some(u64::from_le_bytes(bytes.get(..8)?.try_into().ok()?)),
            Vr::SS => u64::try_from(i16::from_le_bytes(bytes.get(..2)?.try_into().ok()?)).ok(),
            Vr::SL => u64::try_from(i32::from_le_bytes(bytes.get(..4)?.try_into().ok()?)).ok(),
            // Implicit VR lengths tell 16 from 32 bit for unknown binary tags
            Vr::UN | Vr::OB | Vr::OW => match bytes.len() {
                2 => Some(u16::from_le_bytes(bytes.try_into().ok()?) as u64),
                4 => Some(u32::from_le_bytes(bytes.try_into().ok()?) as u64),
                _ => None,
            },
            _ => first_component(&self.to_text()?)?.parse::<u64>().ok(),
        }
    }
}

fn first_component(text: &str) -> Option<&str> {
    let first = text.split('\\').next()?.trim();
    (!first.is_empty()).then_some(first)
}

/// One level of the tag tree: elements ordered by tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    elements: BTreeMap<Tag, Element>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.tag, element);
    }

    pub fn with(mut self, element: Element) -> Self {
        self.insert(element);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    pub fn string(&self, tag: Tag) -> Option<String> {
        self.get(tag)?.to_text()
    }

    pub fn float(&self, tag: Tag) -> Option<f64> {
        self.get(tag)?.to_f64()
    }

    pub fn uint(&self, tag: Tag) -> Option<u64> {
        self.get(tag)?.to_u64()
    }

    pub fn bytes(&self, tag: Tag) -> Option<&[u8]> {
        self.get(tag)?.bytes()
    }

    pub fn items(&self, tag: Tag) -> Option<&[DataSet]> {
        self.get(tag)?.items()
    }
}
