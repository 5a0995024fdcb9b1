// Tag dictionary for implicit VR parsing

use crate::core::format::{Tag, Vr};

struct Entry {
    tag: Tag,
    vr: Vr,
    keyword: &'static str,
}

const fn entry(group: u16, element: u16, vr: Vr, keyword: &'static str) -> Entry {
    Entry {
        tag: Tag(group, element),
        vr,
        keyword,
    }
}

// Sorted by tag so lookups can binary search
const ENTRIES: &[Entry] = &[
    entry(0x0002, 0x0001, Vr::OB, "FileMetaInformationVersion"),
    entry(0x0002, 0x0002, Vr::UI, "MediaStorageSOPClassUID"),
    entry(0x0002, 0x0003, Vr::UI, "MediaStorageSOPInstanceUID"),
    entry(0x0002, 0x0010, Vr::UI, "TransferSyntaxUID"),
    entry(0x0002, 0x0012, Vr::UI, "ImplementationClassUID"),
    entry(0x0002, 0x0013, Vr::SH, "ImplementationVersionName"),
    entry(0x0008, 0x0005, Vr::CS, "SpecificCharacterSet"),
    entry(0x0008, 0x0016, Vr::UI, "SOPClassUID"),
    entry(0x0008, 0x0018, Vr::UI, "SOPInstanceUID"),
    entry(0x0008, 0x0020, Vr::DA, "StudyDate"),
    entry(0x0008, 0x0023, Vr::DA, "ContentDate"),
    entry(0x0008, 0x002A, Vr::DT, "AcquisitionDateTime"),
    entry(0x0008, 0x0030, Vr::TM, "StudyTime"),
    entry(0x0008, 0x0033, Vr::TM, "ContentTime"),
    entry(0x0008, 0x0050, Vr::SH, "AccessionNumber"),
    entry(0x0008, 0x0060, Vr::CS, "Modality"),
    entry(0x0008, 0x0070, Vr::LO, "Manufacturer"),
    entry(0x0008, 0x0100, Vr::SH, "CodeValue"),
    entry(0x0008, 0x0102, Vr::SH, "CodingSchemeDesignator"),
    entry(0x0008, 0x0103, Vr::SH, "CodingSchemeVersion"),
    entry(0x0008, 0x0104, Vr::LO, "CodeMeaning"),
    entry(0x0008, 0x1030, Vr::LO, "StudyDescription"),
    entry(0x0008, 0x103E, Vr::LO, "SeriesDescription"),
    entry(0x0010, 0x0010, Vr::PN, "PatientName"),
    entry(0x0010, 0x0020, Vr::LO, "PatientID"),
    entry(0x0010, 0x0030, Vr::DA, "PatientBirthDate"),
    entry(0x0010, 0x0040, Vr::CS, "PatientSex"),
    entry(0x0018, 0x1068, Vr::DS, "MultiplexGroupTimeOffset"),
    entry(0x0020, 0x000D, Vr::UI, "StudyInstanceUID"),
    entry(0x0020, 0x000E, Vr::UI, "SeriesInstanceUID"),
    entry(0x0020, 0x0011, Vr::IS, "SeriesNumber"),
    entry(0x0020, 0x0013, Vr::IS, "InstanceNumber"),
    entry(0x003A, 0x0004, Vr::CS, "WaveformOriginality"),
    entry(0x003A, 0x0005, Vr::US, "NumberOfWaveformChannels"),
    entry(0x003A, 0x0010, Vr::UL, "NumberOfWaveformSamples"),
    entry(0x003A, 0x001A, Vr::DS, "SamplingFrequency"),
    entry(0x003A, 0x0020, Vr::SH, "MultiplexGroupLabel"),
    entry(0x003A, 0x0200, Vr::SQ, "ChannelDefinitionSequence"),
    entry(0x003A, 0x0202, Vr::IS, "WaveformChannelNumber"),
    entry(0x003A, 0x0203, Vr::SH, "ChannelLabel"),
    entry(0x003A, 0x0205, Vr::CS, "ChannelStatus"),
    entry(0x003A, 0x0208, Vr::SQ, "ChannelSourceSequence"),
    entry(0x003A, 0x0209, Vr::SQ, "ChannelSourceModifiersSequence"),
    entry(0x003A, 0x0210, Vr::DS, "ChannelSensitivity"),
    entry(0x003A, 0x0211, Vr::SQ, "ChannelSensitivityUnitsSequence"),
    entry(0x003A, 0x0212, Vr::DS, "ChannelSensitivityCorrectionFactor"),
    entry(0x003A, 0x0213, Vr::DS, "ChannelBaseline"),
    entry(0x003A, 0x0214, Vr::DS, "ChannelTimeSkew"),
    entry(0x003A, 0x0215, Vr::DS, "ChannelSampleSkew"),
    entry(0x003A, 0x0218, Vr::DS, "ChannelOffset"),
    entry(0x003A, 0x021A, Vr::US, "WaveformBitsStored"),
    entry(0x003A, 0x0220, Vr::DS, "FilterLowFrequency"),
    entry(0x003A, 0x0221, Vr::DS, "FilterHighFrequency"),
    entry(0x003A, 0x0222, Vr::DS, "NotchFilterFrequency"),
    entry(0x0040, 0xA730, Vr::SQ, "ContentSequence"),
    entry(0x5400, 0x0100, Vr::SQ, "WaveformSequence"),
    entry(0x5400, 0x0110, Vr::OB, "ChannelMinimumValue"),
    entry(0x5400, 0x0112, Vr::OB, "ChannelMaximumValue"),
    entry(0x5400, 0x1004, Vr::US, "WaveformBitsAllocated"),
    entry(0x5400, 0x1006, Vr::CS, "WaveformSampleInterpretation"),
    entry(0x5400, 0x100A, Vr::OB, "WaveformPaddingValue"),
    entry(0x5400, 0x1010, Vr::OW, "WaveformData"),
    entry(0x7FE0, 0x0010, Vr::OW, "PixelData"),
];

fn find(tag: Tag) -> Option<&'static Entry> {
    ENTRIES
        .binary_search_by_key(&tag, |e| e.tag)
        .ok()
        .map(|i| &ENTRIES[i])
}

/// VR of a tag for implicit VR datasets; unknown tags are UN.
pub fn vr_of(tag: Tag) -> Vr {
    if tag.element() == 0x0000 {
        // Group length
        return Vr::UL;
    }
    find(tag).map(|e| e.vr).unwrap_or(Vr::UN)
}

/// Tag with its keyword when known, for error messages.
pub fn describe(tag: Tag) -> String {
    match find(tag) {
        Some(e) => format!("{} {}", tag, e.keyword),
        None => tag.to_string(),
    }
}
