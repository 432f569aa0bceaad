//! Per-channel encoding
//!
//! Channel streams come from a [`ChannelEncoder`]. The built-in one runs the
//! delta modulator; callers can plug in an external encoder (an ffmpeg
//! wrapper, say) without the container code knowing about processes.
//!
//! Every channel depends only on the shared PCM and its own descriptor, so
//! channels are encoded concurrently when the `parallel` feature is on.
//! Results always come back in descriptor order.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::{ChannelDescriptor, DmdError, DmdResult, PADDING_BYTE};
use crate::modulator::DeltaModulator;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// produces one channel's bit stream
pub trait ChannelEncoder: Sync {
    /// Encode `pcm` for the channel described by `descriptor`.
    ///
    /// Failures should be reported as [`DmdError::ExternalEncoder`].
    fn encode_channel(&self, pcm: &[i16], descriptor: &ChannelDescriptor) -> DmdResult<Vec<u8>>;

    /// placeholder stream of `len` bytes for a channel that failed
    fn silence(&self, len: usize) -> Vec<u8> {
        vec![PADDING_BYTE; len]
    }
}

/// encodes every channel with the delta modulator
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaModulatorEncoder {
    modulator: DeltaModulator,
}

impl DeltaModulatorEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChannelEncoder for DeltaModulatorEncoder {
    fn encode_channel(&self, pcm: &[i16], _descriptor: &ChannelDescriptor) -> DmdResult<Vec<u8>> {
        Ok(self.modulator.encode(pcm))
    }

    fn silence(&self, len: usize) -> Vec<u8> {
        self.modulator.silence(len)
    }
}

/// what to do when one channel fails to encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// fail the whole encode with the first failing channel's error
    #[default]
    Abort,
    /// replace the channel with the encoder's silence, as long as the longest good channel
    SubstituteSilence,
}

/// Encode every channel of `descriptors` from `pcm`.
///
/// On `Abort` the error returned is the one from the lowest failing position.
pub fn encode_channels<E: ChannelEncoder + ?Sized>(
    encoder: &E,
    pcm: &[i16],
    descriptors: &[ChannelDescriptor],
    policy: FailurePolicy,
) -> DmdResult<Vec<Vec<u8>>> {
    #[cfg(feature = "parallel")]
    let results: Vec<DmdResult<Vec<u8>>> = descriptors
        .par_iter()
        .map(|descriptor| encoder.encode_channel(pcm, descriptor))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<DmdResult<Vec<u8>>> = descriptors
        .iter()
        .map(|descriptor| encoder.encode_channel(pcm, descriptor))
        .collect();

    collect_streams(encoder, descriptors, results, policy)
}

fn collect_streams<E: ChannelEncoder + ?Sized>(
    encoder: &E,
    descriptors: &[ChannelDescriptor],
    results: Vec<DmdResult<Vec<u8>>>,
    policy: FailurePolicy,
) -> DmdResult<Vec<Vec<u8>>> {
    match policy {
        FailurePolicy::Abort => results.into_iter().collect(),
        FailurePolicy::SubstituteSilence => {
            let longest = results
                .iter()
                .filter_map(|r| r.as_ref().ok())
                .map(Vec::len)
                .max()
                .unwrap_or(0);

            let streams = results
                .into_iter()
                .zip(descriptors)
                .map(|(result, descriptor)| match result {
                    Ok(stream) => stream,
                    Err(e) => {
                        warn!(
                            "channel {} ({}) failed, substituting {} bytes of silence: {}",
                            descriptor.index, descriptor.name, longest, e
                        );
                        encoder.silence(longest)
                    }
                })
                .collect();

            Ok(streams)
        }
    }
}

/// build a [`DmdError::ExternalEncoder`] for `descriptor`
pub fn encoder_error(descriptor: &ChannelDescriptor, reason: impl Into<String>) -> DmdError {
    DmdError::ExternalEncoder {
        channel: descriptor.index as usize,
        name: descriptor.name.clone(),
        reason: reason.into(),
    }
}
