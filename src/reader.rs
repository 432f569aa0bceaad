use log::debug;

use crate::core::descriptor;
use crate::core::{
    Container, DmdResult, FormatError, FormatVersion, Header, LengthPrefix, Section,
    TrackMetadata, HEADER_SIZE, MAGIC,
};

/// binary reader for the dMDFPWM container
///
/// Any inconsistency rejects the whole buffer; nothing is partially returned.
pub struct Reader;

impl Reader {
    /// new reader
    pub fn new() -> Self {
        Reader
    }

    /// read and parse a container
    pub fn read(&self, data: &[u8]) -> DmdResult<Container> {
        let header = self.read_header(data)?;

        // completeness from the header alone
        let declared = header.payload_length as usize;
        let available = data.len() - HEADER_SIZE;
        if declared > available {
            return Err(FormatError::PayloadLengthExceeds {
                declared,
                available,
            }
            .into());
        }
        if available > declared {
            debug!("ignoring {} trailing bytes", available - declared);
        }

        let layout = header.version.layout();
        let mut cursor = Cursor::new(&data[HEADER_SIZE..HEADER_SIZE + declared]);

        // metadata
        let metadata_blob = cursor.read_section(layout.metadata_prefix, Section::Metadata)?;
        let metadata =
            TrackMetadata::from_json(metadata_blob).map_err(FormatError::MalformedMetadata)?;

        // descriptors
        let descriptor_blob =
            cursor.read_section(layout.descriptor_prefix, Section::Descriptors)?;
        let channels =
            descriptor::from_json(descriptor_blob).map_err(FormatError::MalformedDescriptors)?;

        // audio
        let payload = cursor.rest();
        let stride = header.stride();
        let aligned = if stride == 0 {
            payload.is_empty()
        } else {
            payload.len() % stride == 0
        };
        if !aligned {
            return Err(FormatError::MisalignedPayload {
                len: payload.len(),
                stride,
            }
            .into());
        }

        Ok(Container {
            header,
            metadata,
            channels,
            payload: payload.to_vec(),
        })
    }

    /// Parse only the fixed header.
    ///
    /// Magic and version are checked before any other field is read.
    pub fn read_header(&self, data: &[u8]) -> DmdResult<Header> {
        let mut cursor = Cursor::new(data);

        // magic
        let magic = cursor.read_bytes(MAGIC.len(), Section::Header)?;
        if magic != MAGIC {
            let mut found = [0u8; 7];
            found.copy_from_slice(magic);
            return Err(FormatError::BadMagic(found).into());
        }

        // version
        let version = FormatVersion::try_from(cursor.read_u8(Section::Header)?)?;

        let header = Header {
            version,
            payload_length: cursor.read_u32_le(Section::Header)?,
            channel_count: cursor.read_u16_le(Section::Header)?,
            chunk_size: cursor.read_u16_le(Section::Header)?,
        };

        if header.chunk_size == 0 {
            return Err(FormatError::ZeroChunkSize.into());
        }

        Ok(header)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

// cursor helper

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, count: usize, section: Section) -> Result<&'a [u8], FormatError> {
        if count > self.remaining() {
            return Err(FormatError::Truncated {
                section,
                needed: count,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn read_u8(&mut self, section: Section) -> Result<u8, FormatError> {
        Ok(self.read_bytes(1, section)?[0])
    }

    fn read_u16_le(&mut self, section: Section) -> Result<u16, FormatError> {
        let bytes = self.read_bytes(2, section)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32_le(&mut self, section: Section) -> Result<u32, FormatError> {
        let bytes = self.read_bytes(4, section)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// length prefix followed by that many bytes
    fn read_section(
        &mut self,
        prefix: LengthPrefix,
        section: Section,
    ) -> Result<&'a [u8], FormatError> {
        let len = match prefix {
            LengthPrefix::U8 => self.read_u8(section)? as usize,
            LengthPrefix::U16 => self.read_u16_le(section)? as usize,
        };
        self.read_bytes(len, section)
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_reads_little_endian() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u16_le(Section::Header).unwrap(), 0x1234);
        assert_eq!(cursor.read_u32_le(Section::Header).unwrap(), 0x1234_5678);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_cursor_overrun_reports_section() {
        let data = [3, b'a'];
        let mut cursor = Cursor::new(&data);
        match cursor.read_section(LengthPrefix::U8, Section::Metadata) {
            Err(FormatError::Truncated {
                section,
                needed,
                available,
            }) => {
                assert_eq!(section, Section::Metadata);
                assert_eq!(needed, 3);
                assert_eq!(available, 1);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }
}
