// Error handling for the waveform extractor

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WaveformError>;

#[derive(Error, Debug)]
pub enum WaveformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported transfer syntax: {0}")]
    UnsupportedTransferSyntax(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    #[error("No waveform data in container")]
    NoWaveformData,

    #[error("Multiplex group skipped: {0}")]
    InvalidMultiplexGroup(String),

    #[error("Malformed channel data: expected {expected} bytes, got {got}")]
    MalformedChannelData { expected: usize, got: usize },

    #[error("Unsupported encoding: interpretation {interpretation:?} with {bits} bits allocated")]
    UnsupportedEncoding { interpretation: String, bits: u16 },

    #[error("Template resolution failed: {0}")]
    TemplateResolution(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Output write failed: {0}")]
    OutputWrite(String),
}

/// Failure classes written to the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnreadableContainer,
    NoWaveformData,
    InvalidMultiplexGroup,
    MalformedChannelData,
    UnsupportedEncoding,
    TemplateResolutionFailure,
    OutputWriteFailure,
}

impl ErrorKind {
    /// True when the condition prevents the file's output from being written.
    pub fn is_file_fatal(self) -> bool {
        matches!(
            self,
            ErrorKind::UnreadableContainer
                | ErrorKind::TemplateResolutionFailure
                | ErrorKind::OutputWriteFailure
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnreadableContainer => "UnreadableContainer",
            ErrorKind::NoWaveformData => "NoWaveformData",
            ErrorKind::InvalidMultiplexGroup => "InvalidMultiplexGroup",
            ErrorKind::MalformedChannelData => "MalformedChannelData",
            ErrorKind::UnsupportedEncoding => "UnsupportedEncoding",
            ErrorKind::TemplateResolutionFailure => "TemplateResolutionFailure",
            ErrorKind::OutputWriteFailure => "OutputWriteFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WaveformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WaveformError::Io(_)
            | WaveformError::UnsupportedTransferSyntax(_)
            | WaveformError::DecompressionFailed(_)
            | WaveformError::CorruptedData(_) => ErrorKind::UnreadableContainer,
            WaveformError::NoWaveformData => ErrorKind::NoWaveformData,
            WaveformError::InvalidMultiplexGroup(_) => ErrorKind::InvalidMultiplexGroup,
            WaveformError::MalformedChannelData { .. } => ErrorKind::MalformedChannelData,
            WaveformError::UnsupportedEncoding { .. } => ErrorKind::UnsupportedEncoding,
            WaveformError::TemplateResolution(_) => ErrorKind::TemplateResolutionFailure,
            WaveformError::Serialization(_) | WaveformError::OutputWrite(_) => {
                ErrorKind::OutputWriteFailure
            }
        }
    }
}

/// A failure attached to the file, one of its groups, or one channel.
/// Group and channel indices are positions in the source container.
#[derive(Debug)]
pub struct Issue {
    pub group: Option<usize>,
    pub channel: Option<usize>,
    pub error: WaveformError,
}

impl Issue {
    pub fn file(error: WaveformError) -> Self {
        Self {
            group: None,
            channel: None,
            error,
        }
    }

    pub fn group(group: usize, error: WaveformError) -> Self {
        Self {
            group: Some(group),
            channel: None,
            error,
        }
    }

    pub fn channel(group: usize, channel: usize, error: WaveformError) -> Self {
        Self {
            group: Some(group),
            channel: Some(channel),
            error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(group) = self.group {
            write!(f, "[group {}] ", group)?;
        }
        if let Some(channel) = self.channel {
            write!(f, "[channel {}] ", channel)?;
        }
        write!(f, "{}: {}", self.kind(), self.error)
    }
}
