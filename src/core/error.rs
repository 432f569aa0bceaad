//! error taxonomy
//!
//! Configuration problems are the caller's fault and fatal to one encode.
//! Format problems come from decoding and always reject the whole file.

use std::fmt;

/// result type for dMDFPWM stuff
pub type DmdResult<T> = Result<T, DmdError>;

/// container section named in size and overrun errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Metadata,
    Descriptors,
    Payload,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Header => "header",
            Section::Metadata => "metadata blob",
            Section::Descriptors => "channel descriptor blob",
            Section::Payload => "payload",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DmdError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{section} is {size} bytes, exceeding the {limit}-byte limit")]
    SizeLimit {
        section: Section,
        size: usize,
        limit: usize,
    },

    #[error("malformed container: {0}")]
    Format(#[from] FormatError),

    #[error("channel {channel} ({name}) failed to encode: {reason}")]
    ExternalEncoder {
        channel: usize,
        name: String,
        reason: String,
    },
}

impl DmdError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, DmdError::Configuration(_))
    }

    pub fn is_size_limit(&self) -> bool {
        matches!(self, DmdError::SizeLimit { .. })
    }

    pub fn is_format(&self) -> bool {
        matches!(self, DmdError::Format(_))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("chunk size must be positive")]
    ZeroChunkSize,

    #[error("chunk size {0} does not fit the 16-bit header field")]
    ChunkSizeTooLarge(usize),

    #[error("{0} channels do not fit the 16-bit header field")]
    TooManyChannels(usize),

    #[error("{streams} channel streams for {descriptors} descriptors")]
    ChannelCountMismatch { streams: usize, descriptors: usize },

    #[error("channel config must be a list")]
    NotAList,

    #[error("channel {entry} must be an object")]
    EntryNotAnObject { entry: usize },

    #[error("channel {entry} is missing required field: {field}")]
    MissingField { entry: usize, field: &'static str },

    #[error("channel {entry} has an invalid `{field}`: {reason}")]
    InvalidField {
        entry: usize,
        field: &'static str,
        reason: String,
    },

    #[error("channel config is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("payload of {len} bytes is not a multiple of the {stride}-byte chunk row")]
    MisalignedPayload { len: usize, stride: usize },

    #[error("metadata could not be encoded: {0}")]
    Metadata(#[source] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("buffer too short for {section}: need {needed} bytes, {available} available")]
    Truncated {
        section: Section,
        needed: usize,
        available: usize,
    },

    #[error("bad magic {0:02X?}")]
    BadMagic([u8; 7]),

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    #[error("payload_length {declared} exceeds the {available} bytes after the header")]
    PayloadLengthExceeds { declared: usize, available: usize },

    #[error("chunk size is zero")]
    ZeroChunkSize,

    #[error("payload of {len} bytes is not a multiple of the {stride}-byte chunk row")]
    MisalignedPayload { len: usize, stride: usize },

    #[error("metadata blob is not valid: {0}")]
    MalformedMetadata(#[source] serde_json::Error),

    #[error("channel descriptor blob is not valid: {0}")]
    MalformedDescriptors(#[source] serde_json::Error),
}
