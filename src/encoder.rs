use log::debug;
use serde::{Deserialize, Serialize};

use crate::channels::{encode_channels, ChannelEncoder, DeltaModulatorEncoder, FailurePolicy};
use crate::core::{
    ChannelDescriptor, ConfigError, DmdResult, FormatVersion, TrackMetadata, TruncationPolicy,
    DEFAULT_CHUNK_SIZE,
};
use crate::interleave::interleave;
use crate::writer::{Writer, Written};

/// Encoding options for building a container
///
/// Deserializable so callers can keep them in a JSON config file; missing
/// keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// bytes per channel per chunk
    pub chunk_size: u16,
    pub version: FormatVersion,
    pub truncation: TruncationPolicy,
    pub on_channel_failure: FailurePolicy,
    pub metadata: TrackMetadata,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            version: FormatVersion::default(),
            truncation: TruncationPolicy::default(),
            on_channel_failure: FailurePolicy::default(),
            metadata: TrackMetadata::default(),
        }
    }
}

impl EncodeOptions {
    pub fn with_chunk_size(mut self, chunk_size: u16) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_truncation(mut self, policy: TruncationPolicy) -> Self {
        self.truncation = policy;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_channel_failure = policy;
        self
    }

    pub fn with_metadata(mut self, metadata: TrackMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// PCM or pre-encoded streams in, container bytes out
pub struct Encoder<E: ChannelEncoder = DeltaModulatorEncoder> {
    options: EncodeOptions,
    channel_encoder: E,
}

impl Encoder<DeltaModulatorEncoder> {
    /// encoder using the built-in delta modulator
    pub fn new(options: EncodeOptions) -> Self {
        Encoder {
            options,
            channel_encoder: DeltaModulatorEncoder::new(),
        }
    }
}

impl<E: ChannelEncoder> Encoder<E> {
    /// encoder delegating channel encodes to `channel_encoder`
    pub fn with_channel_encoder(options: EncodeOptions, channel_encoder: E) -> Self {
        Encoder {
            options,
            channel_encoder,
        }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// encode `pcm` once per descriptor and package the result
    pub fn encode(&self, pcm: &[i16], descriptors: &[ChannelDescriptor]) -> DmdResult<Written> {
        let streams = encode_channels(
            &self.channel_encoder,
            pcm,
            descriptors,
            self.options.on_channel_failure,
        )?;
        self.encode_streams(&streams, descriptors)
    }

    /// package already encoded channel streams, one per descriptor
    pub fn encode_streams<S: AsRef<[u8]>>(
        &self,
        streams: &[S],
        descriptors: &[ChannelDescriptor],
    ) -> DmdResult<Written> {
        if streams.len() != descriptors.len() {
            return Err(ConfigError::ChannelCountMismatch {
                streams: streams.len(),
                descriptors: descriptors.len(),
            }
            .into());
        }

        let chunk_size = self.options.chunk_size as usize;
        let payload = interleave(streams, chunk_size)?;

        debug!(
            "interleaved {} channels into {} bytes",
            streams.len(),
            payload.len()
        );

        Writer::new()
            .with_version(self.options.version)
            .with_truncation_policy(self.options.truncation)
            .write(
                streams.len(),
                chunk_size,
                &self.options.metadata,
                descriptors,
                &payload,
            )
    }
}
