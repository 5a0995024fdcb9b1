// Inflate support for the deflated explicit VR transfer syntax

use crate::core::error::{Result, WaveformError};

#[cfg(feature = "deflate")]
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::read::DeflateDecoder;
    use std::io::Read;

    // The dataset is a raw deflate stream without zlib header
    let mut decoder = DeflateDecoder::new(data);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| WaveformError::DecompressionFailed(format!("Deflate: {}", e)))?;
    Ok(inflated)
}

#[cfg(not(feature = "deflate"))]
pub fn inflate(_data: &[u8]) -> Result<Vec<u8>> {
    Err(WaveformError::UnsupportedTransferSyntax(
        crate::core::constants::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN.to_string(),
    ))
}
