//! Chunk interleaving
//!
//! The payload is a sequence of chunk rows. Row `c` holds chunk `c` of every
//! channel in list order, so channel `i`'s chunk `c` always starts at
//! `c * chunk_size * channel_count + i * chunk_size`. Channels shorter than
//! the longest one are filled with [`PADDING_BYTE`].

use crate::core::{ConfigError, DmdResult, PADDING_BYTE};

/// byte offset of `channel`'s chunk number `chunk` in an interleaved payload
pub fn chunk_offset(
    chunk: usize,
    channel: usize,
    chunk_size: usize,
    channel_count: usize,
) -> usize {
    chunk * chunk_size * channel_count + channel * chunk_size
}

/// number of chunk rows needed for streams of at most `max_length` bytes
pub fn chunk_count(max_length: usize, chunk_size: usize) -> usize {
    max_length.div_ceil(chunk_size)
}

/// interleave per-channel streams into one payload
pub fn interleave<S: AsRef<[u8]>>(streams: &[S], chunk_size: usize) -> DmdResult<Vec<u8>> {
    if chunk_size == 0 {
        return Err(ConfigError::ZeroChunkSize.into());
    }

    let max_length = streams
        .iter()
        .map(|s| s.as_ref().len())
        .max()
        .unwrap_or(0);
    let num_chunks = chunk_count(max_length, chunk_size);

    let mut payload = Vec::with_capacity(num_chunks * chunk_size * streams.len());

    for chunk_idx in 0..num_chunks {
        let start = chunk_idx * chunk_size;

        for stream in streams {
            let data = stream.as_ref();
            let begin = start.min(data.len());
            let end = (start + chunk_size).min(data.len());

            payload.extend_from_slice(&data[begin..end]);
            // pad incomplete chunk
            payload.resize(payload.len() + chunk_size - (end - begin), PADDING_BYTE);
        }
    }

    Ok(payload)
}

/// Split a payload back into one padded stream per channel.
///
/// Original lengths are not stored, so every stream comes back padded to a
/// whole number of chunks.
pub fn deinterleave(
    payload: &[u8],
    channel_count: usize,
    chunk_size: usize,
) -> DmdResult<Vec<Vec<u8>>> {
    if chunk_size == 0 {
        return Err(ConfigError::ZeroChunkSize.into());
    }

    let stride = chunk_size * channel_count;
    if channel_count == 0 {
        if !payload.is_empty() {
            return Err(ConfigError::MisalignedPayload {
                len: payload.len(),
                stride,
            }
            .into());
        }
        return Ok(vec![]);
    }
    if payload.len() % stride != 0 {
        return Err(ConfigError::MisalignedPayload {
            len: payload.len(),
            stride,
        }
        .into());
    }

    let num_chunks = payload.len() / stride;
    let mut streams = vec![Vec::with_capacity(num_chunks * chunk_size); channel_count];

    for (i, row_chunk) in payload.chunks_exact(chunk_size).enumerate() {
        streams[i % channel_count].extend_from_slice(row_chunk);
    }

    Ok(streams)
}
