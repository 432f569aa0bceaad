//! Channel descriptors
//!
//! A channel set is an ordered list. Interleave order always follows list
//! position; `index` is carried for round-trip fidelity only and is never
//! used to reorder. Names are not checked against any speaker vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ConfigError, DmdResult};

/// one channel of a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// role tag, conventionally a speaker code such as "FL" or "LFE"
    pub name: String,
    pub index: u32,
    /// opaque post-processing hint for the external encoder
    #[serde(rename = "filter", default, skip_serializing_if = "Option::is_none")]
    pub filter_tag: Option<String>,
}

impl ChannelDescriptor {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        ChannelDescriptor {
            name: name.into(),
            index,
            filter_tag: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_tag = Some(filter.into());
        self
    }
}

/// Validate a raw channel config and fill in missing indices.
///
/// Entries keep their order; a missing `index` becomes the entry's list
/// position. Duplicate names and unknown names are accepted.
pub fn normalize(raw: &Value) -> DmdResult<Vec<ChannelDescriptor>> {
    let entries = raw.as_array().ok_or(ConfigError::NotAList)?;

    let descriptors = entries
        .iter()
        .enumerate()
        .map(|(position, entry)| normalize_entry(position, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(descriptors)
}

/// [`normalize`] for JSON text, e.g. a channel preset file
pub fn normalize_json(text: &str) -> DmdResult<Vec<ChannelDescriptor>> {
    let raw: Value = serde_json::from_str(text).map_err(ConfigError::Json)?;
    normalize(&raw)
}

/// descriptors from `(channel_name, optional_filter_tag)` pairs
pub fn from_pairs<N, F>(pairs: &[(N, Option<F>)]) -> DmdResult<Vec<ChannelDescriptor>>
where
    N: AsRef<str>,
    F: AsRef<str>,
{
    pairs
        .iter()
        .enumerate()
        .map(|(position, (name, filter))| -> DmdResult<ChannelDescriptor> {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(ConfigError::InvalidField {
                    entry: position,
                    field: "name",
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
            Ok(ChannelDescriptor {
                name: name.to_string(),
                index: position_index(position)?,
                filter_tag: filter.as_ref().map(|f| f.as_ref().to_string()),
            })
        })
        .collect()
}

fn normalize_entry(position: usize, entry: &Value) -> Result<ChannelDescriptor, ConfigError> {
    let fields = entry
        .as_object()
        .ok_or(ConfigError::EntryNotAnObject { entry: position })?;

    let name = match fields.get("name") {
        None | Some(Value::Null) => {
            return Err(ConfigError::MissingField {
                entry: position,
                field: "name",
            })
        }
        Some(Value::String(name)) if name.is_empty() => {
            return Err(ConfigError::InvalidField {
                entry: position,
                field: "name",
                reason: "must not be empty".to_string(),
            })
        }
        Some(Value::String(name)) => name.clone(),
        Some(other) => {
            return Err(ConfigError::InvalidField {
                entry: position,
                field: "name",
                reason: format!("expected a string, got {other}"),
            })
        }
    };

    let index = match fields.get("index") {
        None | Some(Value::Null) => position_index(position)?,
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ConfigError::InvalidField {
                entry: position,
                field: "index",
                reason: format!("expected an unsigned 32-bit integer, got {value}"),
            })?,
    };

    let filter_tag = match fields.get("filter") {
        None | Some(Value::Null) => None,
        Some(Value::String(filter)) => Some(filter.clone()),
        Some(other) => {
            return Err(ConfigError::InvalidField {
                entry: position,
                field: "filter",
                reason: format!("expected a string, got {other}"),
            })
        }
    };

    Ok(ChannelDescriptor {
        name,
        index,
        filter_tag,
    })
}

fn position_index(position: usize) -> Result<u32, ConfigError> {
    u32::try_from(position).map_err(|_| ConfigError::InvalidField {
        entry: position,
        field: "index",
        reason: "list position does not fit 32 bits".to_string(),
    })
}

/// serialize a descriptor list to its on-disk JSON blob
pub(crate) fn to_json(descriptors: &[ChannelDescriptor]) -> DmdResult<Vec<u8>> {
    serde_json::to_vec(descriptors).map_err(|e| ConfigError::Json(e).into())
}

/// parse an on-disk descriptor blob
pub(crate) fn from_json(blob: &[u8]) -> Result<Vec<ChannelDescriptor>, serde_json::Error> {
    serde_json::from_slice(blob)
}
