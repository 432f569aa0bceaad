//! dMDFPWM: several independently encoded one-bit audio channels in one
//! seekable container.
//!
//! ```text
//! offset  size  field
//! 0       7     magic "DMDFPWM"
//! 7       1     format version
//! 8       4     payload_length (u32 LE)
//! 12      2     channel_count (u16 LE)
//! 14      2     chunk_size (u16 LE)
//! 16      1     metadata length, then metadata JSON
//! ...     1|2   descriptor length (by version), then descriptor JSON
//! ...     rest  interleaved channel chunks
//! ```

pub mod channels;
pub mod core;
pub mod encoder;
pub mod interleave;
pub mod modulator;

mod reader;
mod writer;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;

pub use channels::{
    encode_channels, encoder_error, ChannelEncoder, DeltaModulatorEncoder, FailurePolicy,
};
pub use crate::core::{
    from_pairs, normalize, normalize_json, ChannelDescriptor, ConfigError, Container,
    ContainerInfo, DescriptorTruncation, DmdError, DmdResult, FormatError, FormatVersion, Header,
    Layout, LengthPrefix, Section, TrackMetadata, TruncationPolicy, DEFAULT_CHUNK_SIZE,
    HEADER_SIZE, MAGIC, PADDING_BYTE,
};
pub use encoder::{EncodeOptions, Encoder};
pub use interleave::{chunk_offset, deinterleave, interleave};
pub use modulator::{pack_bits, unpack_bits, DeltaModulator};
pub use reader::Reader;
pub use writer::{Writer, Written};

// entry points

/// encode PCM to one 0/1 byte per sample with the delta modulator
///
/// # Arguments
/// * `samples` - Signed 16-bit mono PCM
///
/// # Returns
/// One byte per sample, each 0 (falling) or 1 (rising)
pub fn encode_channel_pcm(samples: &[i16]) -> Vec<u8> {
    DeltaModulator::new().encode(samples)
}

/// interleave channel streams into a container payload
///
/// # Arguments
/// * `streams` - One encoded stream per channel, in interleave order
/// * `chunk_size` - Bytes per channel per chunk, must be positive
///
/// # Returns
/// Chunk rows of every channel, short channels padded with `0x55`
pub fn interleave_channels<S: AsRef<[u8]>>(
    streams: &[S],
    chunk_size: usize,
) -> DmdResult<Vec<u8>> {
    interleave(streams, chunk_size)
}

/// serialize a complete container
///
/// A descriptor list too long for its length prefix is truncated and the
/// truncation logged; use [`Writer`] directly to inspect what was dropped.
///
/// # Arguments
/// * `version` - Format version, selects the descriptor length width
/// * `channel_count` - Channels interleaved in `payload`
/// * `chunk_size` - Bytes per channel per chunk
/// * `metadata` - Artist, title and album
/// * `descriptors` - Channel descriptors, stored as given
/// * `payload` - Interleaved channel data
///
/// # Returns
/// Container bytes
pub fn serialize_container(
    version: FormatVersion,
    channel_count: usize,
    chunk_size: usize,
    metadata: &TrackMetadata,
    descriptors: &[ChannelDescriptor],
    payload: &[u8],
) -> DmdResult<Vec<u8>> {
    Writer::new()
        .with_version(version)
        .write(channel_count, chunk_size, metadata, descriptors, payload)
        .map(|written| written.bytes)
}

/// parse container bytes
///
/// # Arguments
/// * `data` - Container bytes
///
/// # Returns
/// The parsed container, or a format error for any inconsistency
pub fn deserialize_container(data: &[u8]) -> DmdResult<Container> {
    Reader::new().read(data)
}

/// does `data` parse as a complete container?
pub fn validate(data: &[u8]) -> bool {
    Reader::new().read(data).is_ok()
}

/// Get information about a container
///
/// # Arguments
/// * `data` - Container bytes
///
/// # Returns
/// ContainerInfo with layout sizes, metadata and channels
pub fn info(data: &[u8]) -> DmdResult<ContainerInfo> {
    let container = Reader::new().read(data)?;

    Ok(ContainerInfo {
        version: container.header.version.as_u8(),
        channel_count: container.header.channel_count,
        chunk_size: container.header.chunk_size,
        payload_length: container.header.payload_length,
        audio_bytes: container.payload.len(),
        chunk_count: container.chunk_count(),
        bytes_per_channel: container.bytes_per_channel(),
        file_size: data.len(),
        descriptor_count: container.channels.len(),
        metadata: container.metadata,
        channels: container.channels,
    })
}

/// get lib version
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
