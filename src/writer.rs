use log::debug;

use crate::core::descriptor;
use crate::core::truncation::fit_descriptor_blob;
use crate::core::{
    ChannelDescriptor, ConfigError, Container, DescriptorTruncation, DmdError, DmdResult,
    FormatVersion, Header, Section, TrackMetadata, TruncationPolicy, HEADER_SIZE,
};

/// serialized container plus anything lost on the way
#[derive(Debug, Clone)]
pub struct Written {
    pub bytes: Vec<u8>,
    /// set when the descriptor blob had to be cut to fit its prefix
    pub truncation: Option<DescriptorTruncation>,
}

/// binary writer for the dMDFPWM container
pub struct Writer {
    buffer: Vec<u8>,
    version: FormatVersion,
    policy: TruncationPolicy,
}

impl Writer {
    /// new writer for the current format version
    pub fn new() -> Self {
        Writer {
            buffer: Vec::new(),
            version: FormatVersion::default(),
            policy: TruncationPolicy::default(),
        }
    }

    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_truncation_policy(mut self, policy: TruncationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// write a complete container
    ///
    /// `payload` must already be interleaved for `channel_count` channels of
    /// `chunk_size` byte chunks.
    pub fn write(
        mut self,
        channel_count: usize,
        chunk_size: usize,
        metadata: &TrackMetadata,
        descriptors: &[ChannelDescriptor],
        payload: &[u8],
    ) -> DmdResult<Written> {
        let layout = self.version.layout();

        // header fields
        let channel_count_u16 = u16::try_from(channel_count)
            .map_err(|_| ConfigError::TooManyChannels(channel_count))?;
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize.into());
        }
        let chunk_size_u16 =
            u16::try_from(chunk_size).map_err(|_| ConfigError::ChunkSizeTooLarge(chunk_size))?;

        let stride = chunk_size * channel_count;
        let aligned = if stride == 0 {
            payload.is_empty()
        } else {
            payload.len() % stride == 0
        };
        if !aligned {
            return Err(ConfigError::MisalignedPayload {
                len: payload.len(),
                stride,
            }
            .into());
        }

        // metadata is never truncated
        let metadata_blob = metadata.to_json()?;
        let metadata_limit = layout.metadata_prefix.max_len();
        if metadata_blob.len() > metadata_limit {
            return Err(DmdError::SizeLimit {
                section: Section::Metadata,
                size: metadata_blob.len(),
                limit: metadata_limit,
            });
        }

        // descriptors may be truncated
        let fitted = fit_descriptor_blob(
            descriptor::to_json(descriptors)?,
            descriptors.len(),
            layout.descriptor_prefix,
            self.policy,
        )?;

        // sizes, from the final blobs
        let total = layout.metadata_prefix.width()
            + metadata_blob.len()
            + layout.descriptor_prefix.width()
            + fitted.blob.len()
            + payload.len();
        let payload_length = u32::try_from(total).map_err(|_| DmdError::SizeLimit {
            section: Section::Payload,
            size: total,
            limit: u32::MAX as usize,
        })?;

        debug!(
            "writing v{} container: {} channels, chunk {}, metadata {} B, descriptors {} B, audio {} B",
            self.version.as_u8(),
            channel_count,
            chunk_size,
            metadata_blob.len(),
            fitted.blob.len(),
            payload.len()
        );

        self.buffer.reserve(HEADER_SIZE + total);

        // header
        Header {
            version: self.version,
            payload_length,
            channel_count: channel_count_u16,
            chunk_size: chunk_size_u16,
        }
        .write(&mut self.buffer);

        // metadata
        layout
            .metadata_prefix
            .write(&mut self.buffer, metadata_blob.len());
        self.buffer.extend_from_slice(&metadata_blob);

        // descriptors
        layout
            .descriptor_prefix
            .write(&mut self.buffer, fitted.blob.len());
        self.buffer.extend_from_slice(&fitted.blob);

        // audio
        self.buffer.extend_from_slice(payload);

        debug_assert_eq!(self.buffer.len(), HEADER_SIZE + total);

        Ok(Written {
            bytes: self.buffer,
            truncation: fitted.truncation,
        })
    }

    /// Write a container struct.
    ///
    /// Version, channel count and chunk size come from `container.header`;
    /// `payload_length` is recomputed.
    pub fn write_container(self, container: &Container) -> DmdResult<Written> {
        self.with_version(container.header.version).write(
            container.header.channel_count as usize,
            container.header.chunk_size as usize,
            &container.metadata,
            &container.channels,
            &container.payload,
        )
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
