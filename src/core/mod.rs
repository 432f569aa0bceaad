pub mod descriptor;
pub mod error;
pub mod metadata;
pub mod truncation;
pub mod types;

pub use descriptor::{from_pairs, normalize, normalize_json, ChannelDescriptor};
pub use error::{ConfigError, DmdError, DmdResult, FormatError, Section};
pub use metadata::TrackMetadata;
pub use truncation::{find_truncation_point, DescriptorTruncation, TruncationPolicy, EMPTY_LIST};
pub use types::*;
