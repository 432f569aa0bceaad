//! Container serialization tests
use libdmdfpwm::{
    deserialize_container, serialize_container, ChannelDescriptor, DmdError, FormatError,
    FormatVersion, Reader, Section, TrackMetadata, TruncationPolicy, Writer, HEADER_SIZE,
};

fn stereo() -> Vec<ChannelDescriptor> {
    vec![ChannelDescriptor::new("FL", 0), ChannelDescriptor::new("FR", 1)]
}

fn stereo_payload() -> Vec<u8> {
    vec![1, 0, 0, 1, 1, 0x55, 0x55, 0x55]
}

fn simple_container(version: FormatVersion) -> Vec<u8> {
    serialize_container(
        version,
        2,
        2,
        &TrackMetadata::with_basic("A", "B", ""),
        &stereo(),
        &stereo_payload(),
    )
    .unwrap()
}

/// six descriptors encoding to exactly 300 bytes
fn six_channels() -> Vec<ChannelDescriptor> {
    let mut list: Vec<ChannelDescriptor> = ["FL", "FR", "FC", "LFE", "BL", "BR"]
        .iter()
        .enumerate()
        .map(|(i, name)| ChannelDescriptor::new(*name, i as u32).with_filter("highpass=f=200"))
        .collect();
    list[0].filter_tag = Some("highpass=f=2".to_string());
    list
}

fn format_error(err: DmdError) -> FormatError {
    match err {
        DmdError::Format(e) => e,
        other => panic!("expected a format error, got {other:?}"),
    }
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_header_bytes() {
    let data = simple_container(FormatVersion::V1);

    assert_eq!(&data[0..7], b"DMDFPWM");
    assert_eq!(data[7], 1);
    assert_eq!(u32::from_le_bytes(data[8..12].try_into().unwrap()), 97);
    assert_eq!(u16::from_le_bytes([data[12], data[13]]), 2);
    assert_eq!(u16::from_le_bytes([data[14], data[15]]), 2);
    assert_eq!(data.len(), 113);
}

#[test]
fn test_sections_in_order() {
    let data = simple_container(FormatVersion::V1);
    let mut pos = HEADER_SIZE;

    // metadata, u8 prefix
    assert_eq!(data[pos], 37);
    pos += 1;
    assert_eq!(&data[pos..pos + 37], br#"{"artist":"A","title":"B","album":""}"#);
    pos += 37;

    // descriptors, u16 prefix in v1
    assert_eq!(u16::from_le_bytes([data[pos], data[pos + 1]]), 49);
    pos += 2;
    assert_eq!(
        &data[pos..pos + 49],
        br#"[{"name":"FL","index":0},{"name":"FR","index":1}]"#
    );
    pos += 49;

    assert_eq!(&data[pos..], &stereo_payload()[..]);
}

#[test]
fn test_compact_layout_uses_single_byte_prefix() {
    let v0 = simple_container(FormatVersion::V0);
    let v1 = simple_container(FormatVersion::V1);

    assert_eq!(v0[7], 0);
    assert_eq!(v0.len() + 1, v1.len());
    assert_eq!(u32::from_le_bytes(v0[8..12].try_into().unwrap()), 96);
    assert_eq!(v0[HEADER_SIZE + 1 + 37], 49);
}

#[test]
fn test_payload_length_counts_everything_after_header() {
    for version in [FormatVersion::V0, FormatVersion::V1] {
        let data = simple_container(version);
        let declared = u32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;
        assert_eq!(declared, data.len() - HEADER_SIZE);
    }
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_round_trip() {
    for version in [FormatVersion::V0, FormatVersion::V1] {
        let data = simple_container(version);
        let container = deserialize_container(&data).unwrap();

        assert_eq!(container.header.version, version);
        assert_eq!(container.header.channel_count, 2);
        assert_eq!(container.header.chunk_size, 2);
        assert_eq!(container.metadata, TrackMetadata::with_basic("A", "B", ""));
        assert_eq!(container.channels, stereo());
        assert_eq!(container.payload, stereo_payload());
        assert_eq!(container.chunk_count(), 2);
        assert_eq!(container.bytes_per_channel(), 4);
    }
}

#[test]
fn test_write_container_recomputes_length() {
    let mut container = deserialize_container(&simple_container(FormatVersion::V1)).unwrap();
    container.metadata.album = "Longer Album".to_string();
    container.header.payload_length = 0;

    let written = Writer::new().write_container(&container).unwrap();
    let reread = deserialize_container(&written.bytes).unwrap();
    assert_eq!(reread.metadata.album, "Longer Album");
    assert_eq!(
        reread.header.payload_length as usize,
        written.bytes.len() - HEADER_SIZE
    );
}

#[test]
fn test_filters_and_unicode_survive() {
    let descriptors = vec![
        ChannelDescriptor::new("FL", 0).with_filter("highpass=f=200"),
        ChannelDescriptor::new("Höhen", 1),
    ];
    let metadata = TrackMetadata::with_basic("Sigur Rós", "Hoppípolla", "Takk…");
    let data = serialize_container(FormatVersion::V1, 2, 1, &metadata, &descriptors, &[1, 0])
        .unwrap();

    let container = deserialize_container(&data).unwrap();
    assert_eq!(container.metadata, metadata);
    assert_eq!(container.channels, descriptors);
}

#[test]
fn test_zero_channels() {
    let data = serialize_container(
        FormatVersion::V1,
        0,
        6000,
        &TrackMetadata::new(),
        &[],
        &[],
    )
    .unwrap();
    let container = deserialize_container(&data).unwrap();
    assert_eq!(container.header.channel_count, 0);
    assert!(container.channels.is_empty());
    assert!(container.payload.is_empty());
    assert_eq!(container.chunk_count(), 0);
}

// ============================================================================
// Size Limits
// ============================================================================

#[test]
fn test_metadata_at_limit() {
    // 35 bytes of JSON framing plus 220 characters is exactly 255
    let metadata = TrackMetadata::with_basic("a".repeat(220), "", "");
    let data = serialize_container(FormatVersion::V1, 1, 1, &metadata, &[], &[1]).unwrap();
    assert_eq!(data[HEADER_SIZE], 255);
    assert_eq!(deserialize_container(&data).unwrap().metadata, metadata);
}

#[test]
fn test_metadata_over_limit_is_rejected() {
    let metadata = TrackMetadata::with_basic("a".repeat(221), "", "");
    for version in [FormatVersion::V0, FormatVersion::V1] {
        let err = serialize_container(version, 1, 1, &metadata, &[], &[1]).unwrap_err();
        assert!(err.is_size_limit());
        match err {
            DmdError::SizeLimit {
                section,
                size,
                limit,
            } => {
                assert_eq!(section, Section::Metadata);
                assert_eq!(size, 256);
                assert_eq!(limit, 255);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[test]
fn test_compact_layout_truncates_descriptors() {
    let descriptors = six_channels();
    let written = Writer::new()
        .with_version(FormatVersion::V0)
        .write(6, 1, &TrackMetadata::new(), &descriptors, &[0u8; 6])
        .unwrap();

    let truncation = written.truncation.unwrap();
    assert_eq!(truncation.original_len, 300);
    assert_eq!(truncation.written_len, 250);
    assert_eq!(truncation.kept, 5);
    assert_eq!(truncation.total, 6);

    let container = deserialize_container(&written.bytes).unwrap();
    assert_eq!(container.channels, descriptors[..5]);
    // channel count and payload are untouched
    assert_eq!(container.header.channel_count, 6);
    assert_eq!(container.payload, vec![0u8; 6]);
    assert_eq!(
        container.header.payload_length as usize,
        written.bytes.len() - HEADER_SIZE
    );
}

#[test]
fn test_current_layout_keeps_long_descriptors() {
    let descriptors = six_channels();
    let written = Writer::new()
        .write(6, 1, &TrackMetadata::new(), &descriptors, &[0u8; 6])
        .unwrap();

    assert!(written.truncation.is_none());
    let container = deserialize_container(&written.bytes).unwrap();
    assert_eq!(container.channels, descriptors);
}

#[test]
fn test_truncation_floor_empties_list() {
    let written = Writer::new()
        .with_version(FormatVersion::V0)
        .with_truncation_policy(TruncationPolicy { min_len: 254 })
        .write(6, 1, &TrackMetadata::new(), &six_channels(), &[0u8; 6])
        .unwrap();

    let truncation = written.truncation.unwrap();
    assert!(truncation.emptied());
    assert_eq!(truncation.written_len, 2);
    assert!(deserialize_container(&written.bytes)
        .unwrap()
        .channels
        .is_empty());
}

// ============================================================================
// Writer Rejections
// ============================================================================

#[test]
fn test_writer_rejects_bad_geometry() {
    let meta = TrackMetadata::new();

    let err = serialize_container(FormatVersion::V1, 1, 0, &meta, &[], &[]).unwrap_err();
    assert!(err.is_configuration());

    let err = serialize_container(FormatVersion::V1, 1, 70_000, &meta, &[], &[]).unwrap_err();
    assert!(err.is_configuration());

    let err = serialize_container(FormatVersion::V1, 70_000, 1, &meta, &[], &[]).unwrap_err();
    assert!(err.is_configuration());

    // 2 channels of 2 bytes need rows of 4
    let err = serialize_container(FormatVersion::V1, 2, 2, &meta, &[], &[0; 6]).unwrap_err();
    assert!(err.is_configuration());

    let err = serialize_container(FormatVersion::V1, 0, 2, &meta, &[], &[0; 4]).unwrap_err();
    assert!(err.is_configuration());
}

// ============================================================================
// Reader Rejections
// ============================================================================

#[test]
fn test_bad_magic() {
    let mut data = simple_container(FormatVersion::V1);
    data[0] = b'X';
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(err, FormatError::BadMagic(found) if &found == b"XMDFPWM"));
}

#[test]
fn test_unsupported_version() {
    let mut data = simple_container(FormatVersion::V1);
    data[7] = 2;
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(err, FormatError::UnsupportedVersion(2)));
}

#[test]
fn test_magic_checked_before_version() {
    let mut data = simple_container(FormatVersion::V1);
    data[1] = b'?';
    data[7] = 9;
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(err, FormatError::BadMagic(_)));
}

#[test]
fn test_short_header() {
    let data = simple_container(FormatVersion::V1);
    for len in [0, 3, 7, 8, 15] {
        let err = format_error(deserialize_container(&data[..len]).unwrap_err());
        assert!(
            matches!(
                err,
                FormatError::Truncated {
                    section: Section::Header,
                    ..
                }
            ),
            "{len} bytes gave {err:?}"
        );
    }
}

#[test]
fn test_payload_length_exceeds_buffer() {
    let data = simple_container(FormatVersion::V1);
    let err = format_error(deserialize_container(&data[..data.len() - 1]).unwrap_err());
    assert!(matches!(
        err,
        FormatError::PayloadLengthExceeds {
            declared: 97,
            available: 96
        }
    ));
}

#[test]
fn test_section_overruns_declared_length() {
    let mut data = simple_container(FormatVersion::V1);
    // metadata claims more bytes than the declared payload holds
    data[8..12].copy_from_slice(&20u32.to_le_bytes());
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(
        err,
        FormatError::Truncated {
            section: Section::Metadata,
            ..
        }
    ));
}

#[test]
fn test_descriptor_length_overrun() {
    let mut data = simple_container(FormatVersion::V1);
    let at = HEADER_SIZE + 1 + 37;
    data[at..at + 2].copy_from_slice(&500u16.to_le_bytes());
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(
        err,
        FormatError::Truncated {
            section: Section::Descriptors,
            ..
        }
    ));
}

#[test]
fn test_malformed_metadata() {
    let mut data = simple_container(FormatVersion::V1);
    data[HEADER_SIZE + 1] = b'[';
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(err, FormatError::MalformedMetadata(_)));
}

#[test]
fn test_malformed_descriptors() {
    let mut data = simple_container(FormatVersion::V1);
    data[HEADER_SIZE + 1 + 37 + 2] = b'{';
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(err, FormatError::MalformedDescriptors(_)));
}

#[test]
fn test_misaligned_payload() {
    let mut data = simple_container(FormatVersion::V1);
    // claim three channels; 8 payload bytes are not rows of 6
    data[12..14].copy_from_slice(&3u16.to_le_bytes());
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(
        err,
        FormatError::MisalignedPayload { len: 8, stride: 6 }
    ));
}

#[test]
fn test_zero_chunk_size() {
    let mut data = simple_container(FormatVersion::V1);
    data[14..16].copy_from_slice(&0u16.to_le_bytes());
    let err = format_error(deserialize_container(&data).unwrap_err());
    assert!(matches!(err, FormatError::ZeroChunkSize));
}

#[test]
fn test_trailing_bytes_ignored() {
    let mut data = simple_container(FormatVersion::V1);
    data.extend_from_slice(b"garbage after the container");
    let container = deserialize_container(&data).unwrap();
    assert_eq!(container.payload, stereo_payload());
}

#[test]
fn test_read_header_only() {
    let data = simple_container(FormatVersion::V0);
    let header = Reader::new().read_header(&data[..HEADER_SIZE]).unwrap();
    assert_eq!(header.version, FormatVersion::V0);
    assert_eq!(header.payload_length, 96);
    assert_eq!(header.stride(), 4);
}
