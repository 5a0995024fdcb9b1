// Channel decoder: raw sample codes -> calibrated physical values

use crate::core::error::{Result, WaveformError};
use crate::core::locator::{ChannelDefinition, MultiplexGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleInterpretation {
    SignedInt,
    UnsignedInt,
    Float32,
}

impl SampleInterpretation {
    /// Maps a waveform sample interpretation code. Mu-law and A-law
    /// companded codes (MB, AB) have no mapping.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "SB" | "SS" | "SL" => Some(SampleInterpretation::SignedInt),
            "UB" | "US" | "UL" => Some(SampleInterpretation::UnsignedInt),
            "FL" => Some(SampleInterpretation::Float32),
            _ => None,
        }
    }

    /// Element width in bytes, if the scheme supports this allocation.
    pub fn element_width(self, bits_allocated: u16) -> Option<usize> {
        match (self, bits_allocated) {
            (SampleInterpretation::Float32, 32) => Some(4),
            (SampleInterpretation::Float32, _) => None,
            (_, 8) => Some(1),
            (_, 16) => Some(2),
            (_, 32) => Some(4),
            _ => None,
        }
    }

    // Width-dependent two's complement / zero extension via from_le_bytes
    fn raw_value(self, element: &[u8]) -> f64 {
        match (self, element) {
            (SampleInterpretation::SignedInt, [a]) => i8::from_le_bytes([*a]) as f64,
            (SampleInterpretation::SignedInt, [a, b]) => i16::from_le_bytes([*a, *b]) as f64,
            (SampleInterpretation::SignedInt, [a, b, c, d]) => {
                i32::from_le_bytes([*a, *b, *c, *d]) as f64
            }
            (SampleInterpretation::UnsignedInt, [a]) => *a as f64,
            (SampleInterpretation::UnsignedInt, [a, b]) => u16::from_le_bytes([*a, *b]) as f64,
            (SampleInterpretation::UnsignedInt, [a, b, c, d]) => {
                u32::from_le_bytes([*a, *b, *c, *d]) as f64
            }
            (SampleInterpretation::Float32, [a, b, c, d]) => {
                f32::from_le_bytes([*a, *b, *c, *d]) as f64
            }
            // Widths are validated before splitting
            _ => f64::NAN,
        }
    }
}

/// Calibration with identity defaults. Multiplications happen before the
/// addition and are never folded together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub sensitivity: f64,
    pub correction: f64,
    pub baseline: f64,
}

impl Calibration {
    pub fn from_definition(definition: &ChannelDefinition) -> Self {
        Self {
            sensitivity: definition.sensitivity.unwrap_or(1.0),
            correction: definition.sensitivity_correction_factor.unwrap_or(1.0),
            baseline: definition.baseline.unwrap_or(0.0),
        }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        raw * self.sensitivity * self.correction + self.baseline
    }
}

fn scheme_for(definition: &ChannelDefinition) -> Result<(SampleInterpretation, usize)> {
    let unsupported = || WaveformError::UnsupportedEncoding {
        interpretation: definition.sample_interpretation.clone(),
        bits: definition.bits_allocated,
    };
    let scheme = SampleInterpretation::from_code(&definition.sample_interpretation)
        .ok_or_else(unsupported)?;
    let width = scheme
        .element_width(definition.bits_allocated)
        .ok_or_else(unsupported)?;
    Ok((scheme, width))
}

/// Decodes one channel's contiguous raw buffer into `sample_count`
/// calibrated values.
pub fn decode(raw: &[u8], definition: &ChannelDefinition, sample_count: usize) -> Result<Vec<f64>> {
    let (scheme, width) = scheme_for(definition)?;

    let expected = sample_count * width;
    if raw.len() != expected {
        return Err(WaveformError::MalformedChannelData {
            expected,
            got: raw.len(),
        });
    }

    let calibration = Calibration::from_definition(definition);
    Ok(raw
        .chunks_exact(width)
        .map(|element| calibration.apply(scheme.raw_value(element)))
        .collect())
}

/// Extracts one channel's bytes from a sample-major interleaved buffer.
/// A trailing partial frame contributes whatever bytes fall in the
/// channel's slot, so truncation shows up as a length mismatch.
pub fn deinterleave(data: &[u8], channel: usize, channel_count: usize, width: usize) -> Vec<u8> {
    let frame = channel_count * width;
    let mut out = Vec::with_capacity(data.len() / channel_count.max(1));
    if frame == 0 {
        return out;
    }

    let mut offset = channel * width;
    while offset < data.len() {
        let end = (offset + width).min(data.len());
        out.extend_from_slice(&data[offset..end]);
        offset += frame;
    }
    out
}

/// Decodes channel `channel` of a multiplex group.
pub fn decode_channel(group: &MultiplexGroup<'_>, channel: usize) -> Result<Vec<f64>> {
    let definition = &group.channels[channel];
    let (_, width) = scheme_for(definition)?;

    let channel_count = group.channels.len();
    let expected = group.number_of_samples * channel_count * width;
    let mut data = group.waveform_data;
    // Odd-length values carry one pad byte
    if expected % 2 == 1 && data.len() == expected + 1 {
        data = &data[..expected];
    }

    let raw = deinterleave(data, channel, channel_count, width);
    decode(&raw, definition, group.number_of_samples)
}
