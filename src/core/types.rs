//! common types for the dMDFPWM container

use serde::{Deserialize, Serialize};

use super::descriptor::ChannelDescriptor;
use super::error::FormatError;
use super::metadata::TrackMetadata;

// constants

/// Magic tag "DMDFPWM"
pub const MAGIC: [u8; 7] = *b"DMDFPWM";

/// fixed header size, magic included
pub const HEADER_SIZE: usize = 16;

/// filler for a channel's last, incomplete chunk
pub const PADDING_BYTE: u8 = 0x55;

/// one second of 48 kHz DFPWM per channel
pub const DEFAULT_CHUNK_SIZE: u16 = 6000;

// types

/// width of a section length prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    U8,
    U16,
}

impl LengthPrefix {
    /// bytes taken by the prefix itself
    pub fn width(self) -> usize {
        match self {
            LengthPrefix::U8 => 1,
            LengthPrefix::U16 => 2,
        }
    }

    /// largest blob length the prefix can describe
    pub fn max_len(self) -> usize {
        match self {
            LengthPrefix::U8 => u8::MAX as usize,
            LengthPrefix::U16 => u16::MAX as usize,
        }
    }

    /// append `len` to `buffer`; caller guarantees `len <= max_len()`
    pub(crate) fn write(self, buffer: &mut Vec<u8>, len: usize) {
        debug_assert!(len <= self.max_len());
        match self {
            LengthPrefix::U8 => buffer.push(len as u8),
            LengthPrefix::U16 => buffer.extend_from_slice(&(len as u16).to_le_bytes()),
        }
    }
}

/// Section layout selected by a format version.
///
/// Every version owns exactly one layout; the writer and reader only ever
/// consult this table, never the raw version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub metadata_prefix: LengthPrefix,
    pub descriptor_prefix: LengthPrefix,
}

/// container format version
///
/// | Value | Name | Metadata prefix | Descriptor prefix |
/// |-------|------|-----------------|-------------------|
/// | 0     | V0   | u8              | u8                |
/// | 1     | V1   | u8              | u16 LE            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum FormatVersion {
    /// compact layout, single-byte descriptor length
    V0 = 0,
    /// current layout
    #[default]
    V1 = 1,
}

impl FormatVersion {
    pub fn layout(self) -> Layout {
        match self {
            FormatVersion::V0 => Layout {
                metadata_prefix: LengthPrefix::U8,
                descriptor_prefix: LengthPrefix::U8,
            },
            FormatVersion::V1 => Layout {
                metadata_prefix: LengthPrefix::U8,
                descriptor_prefix: LengthPrefix::U16,
            },
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FormatVersion {
    type Error = FormatError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(FormatVersion::V0),
            1 => Ok(FormatVersion::V1),
            other => Err(FormatError::UnsupportedVersion(other)),
        }
    }
}

// data structures

/// fixed 16 byte header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: FormatVersion,
    /// bytes following the header, from the metadata length prefix to the end of the payload
    pub payload_length: u32,
    pub channel_count: u16,
    pub chunk_size: u16,
}

impl Header {
    /// bytes of one chunk row (every channel's chunk at one chunk index)
    pub fn stride(&self) -> usize {
        self.chunk_size as usize * self.channel_count as usize
    }

    pub(crate) fn write(&self, buffer: &mut Vec<u8>) {
        // Magic "DMDFPWM"
        buffer.extend_from_slice(&MAGIC);

        // Version (u8)
        buffer.push(self.version.as_u8());

        // Payload Length (u32 LE)
        buffer.extend_from_slice(&self.payload_length.to_le_bytes());

        // Channel Count (u16 LE)
        buffer.extend_from_slice(&self.channel_count.to_le_bytes());

        // Chunk Size (u16 LE)
        buffer.extend_from_slice(&self.chunk_size.to_le_bytes());
    }
}

/// complete decoded container
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub header: Header,
    pub metadata: TrackMetadata,
    pub channels: Vec<ChannelDescriptor>,
    /// interleaved, chunk padded channel streams
    pub payload: Vec<u8>,
}

impl Container {
    /// number of chunk rows in the payload
    pub fn chunk_count(&self) -> usize {
        let stride = self.header.stride();
        if stride == 0 {
            0
        } else {
            self.payload.len() / stride
        }
    }

    /// padded byte length of each channel's stream
    pub fn bytes_per_channel(&self) -> usize {
        self.chunk_count() * self.header.chunk_size as usize
    }
}

/// summary of a container, see [`crate::info`]
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub version: u8,
    pub channel_count: u16,
    pub chunk_size: u16,
    pub payload_length: u32,
    /// interleaved audio bytes, excluding metadata and descriptors
    pub audio_bytes: usize,
    pub chunk_count: usize,
    pub bytes_per_channel: usize,
    pub file_size: usize,
    /// descriptors stored, fewer than `channel_count` after truncation
    pub descriptor_count: usize,
    pub metadata: TrackMetadata,
    pub channels: Vec<ChannelDescriptor>,
}
