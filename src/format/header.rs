// Payload envelope: a format marker byte followed by a version byte.

use crate::error::{DecodeError, Result};

use super::cursor::ByteCursor;

/// First byte of every serialized payload.
pub const FORMAT_MARKER: u8 = 0xFF;

/// Second byte: the only version the producer writes.
pub const VERSION_MARKER: u8 = 0x01;

/// Size of the envelope in bytes.
pub const ENVELOPE_LEN: usize = 2;

/// Parsed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub marker: u8,
    pub version: u8,
}

impl Envelope {
    /// Read and validate the two envelope bytes.
    pub fn decode(cur: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cur.offset();
        let marker = cur.read_u8()?;
        if marker != FORMAT_MARKER {
            return Err(DecodeError::BadFormatMarker {
                offset,
                expected: FORMAT_MARKER,
                actual: marker,
            });
        }

        let offset = cur.offset();
        let version = cur.read_u8()?;
        if version != VERSION_MARKER {
            return Err(DecodeError::BadVersionMarker {
                offset,
                expected: VERSION_MARKER,
                actual: version,
            });
        }

        Ok(Self { marker, version })
    }

    /// Cheap check for whether `bytes` starts with a valid envelope.
    pub fn sniff(bytes: &[u8]) -> bool {
        bytes.len() >= ENVELOPE_LEN && bytes[0] == FORMAT_MARKER && bytes[1] == VERSION_MARKER
    }
}
