//! Descriptor blob truncation
//!
//! When the encoded descriptor list does not fit its length prefix, the blob
//! is cut back to the longest prefix that still closes into a well-formed,
//! non-empty JSON list. Failing that, the list is written empty. Either way
//! the loss is reported and logged.

use log::warn;
use serde::{Deserialize, Serialize};

use super::descriptor;
use super::error::{DmdError, DmdResult, Section};
use super::types::LengthPrefix;

/// canonical encoding of an empty descriptor list
pub const EMPTY_LIST: &[u8] = b"[]";

/// tuning for the backward search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationPolicy {
    /// Shortest truncated blob worth keeping. Candidates below this length are
    /// skipped and the list is emptied instead. Zero searches the prefix's
    /// whole representable range.
    pub min_len: usize,
}

/// what was dropped while fitting the descriptor blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorTruncation {
    pub original_len: usize,
    pub written_len: usize,
    /// descriptors that survived
    pub kept: usize,
    /// descriptors before truncation
    pub total: usize,
}

impl DescriptorTruncation {
    /// fell back to the empty list
    pub fn emptied(&self) -> bool {
        self.kept == 0
    }
}

pub(crate) struct FittedBlob {
    pub blob: Vec<u8>,
    pub truncation: Option<DescriptorTruncation>,
}

/// make `blob` fit `prefix`, truncating if needed
pub(crate) fn fit_descriptor_blob(
    blob: Vec<u8>,
    total: usize,
    prefix: LengthPrefix,
    policy: TruncationPolicy,
) -> DmdResult<FittedBlob> {
    let limit = prefix.max_len();
    if blob.len() <= limit {
        return Ok(FittedBlob {
            blob,
            truncation: None,
        });
    }

    let original_len = blob.len();
    let (fitted, kept) = match find_truncation_point(&blob, limit, policy.min_len) {
        Some(found) => found,
        None if EMPTY_LIST.len() <= limit => (EMPTY_LIST.to_vec(), 0),
        None => {
            return Err(DmdError::SizeLimit {
                section: Section::Descriptors,
                size: original_len,
                limit,
            })
        }
    };

    let truncation = DescriptorTruncation {
        original_len,
        written_len: fitted.len(),
        kept,
        total,
    };

    if truncation.emptied() {
        warn!(
            "channel descriptor blob of {} bytes exceeds {} bytes and has no safe truncation point; writing an empty list",
            original_len, limit
        );
    } else {
        warn!(
            "channel descriptor blob truncated from {} to {} bytes, keeping {} of {} descriptors",
            original_len,
            truncation.written_len,
            kept,
            total
        );
    }

    Ok(FittedBlob {
        blob: fitted,
        truncation: Some(truncation),
    })
}

/// Search backwards for the longest `blob[..=i] ++ "]"` that fits `limit`,
/// is at least `min_len` bytes, and parses as a non-empty descriptor list.
///
/// Returns the candidate and how many descriptors it holds.
pub fn find_truncation_point(
    blob: &[u8],
    limit: usize,
    min_len: usize,
) -> Option<(Vec<u8>, usize)> {
    // candidate is end + 2 bytes long
    let last = limit.checked_sub(2)?.min(blob.len().checked_sub(1)?);
    let first = min_len.saturating_sub(2);
    if first > last {
        return None;
    }

    (first..=last)
        .rev()
        .filter(|&end| blob[end] == b'}')
        .find_map(|end| {
            let mut candidate = Vec::with_capacity(end + 2);
            candidate.extend_from_slice(&blob[..=end]);
            candidate.push(b']');
            match descriptor::from_json(&candidate) {
                Ok(list) if !list.is_empty() => Some((candidate, list.len())),
                _ => None,
            }
        })
}
