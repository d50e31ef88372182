// Decode errors.
//
// Every variant records the absolute byte offset at which the problem was
// detected. Offsets inside an embedded binary-serialized payload are
// reported relative to the outer buffer, not the payload slice.

use std::fmt;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Which back-reference table a lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    String,
    Type,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::String => f.write_str("string"),
            TableKind::Type => f.write_str("type"),
        }
    }
}

/// Errors produced while decoding a payload. All of them are terminal for
/// the decode call that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// First envelope byte is not the format marker.
    #[error("bad format marker at offset {offset}: expected {expected:#04X}, got {actual:#04X}")]
    BadFormatMarker { offset: usize, expected: u8, actual: u8 },

    /// Second envelope byte is not the supported version.
    #[error("bad version marker at offset {offset}: expected {expected:#04X}, got {actual:#04X}")]
    BadVersionMarker { offset: usize, expected: u8, actual: u8 },

    /// A read ran past the end of the buffer.
    #[error("unexpected end of input at offset {offset}: need {needed} bytes, {remaining} remaining")]
    UnexpectedEndOfInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A 7-bit encoded integer did not terminate within five bytes.
    #[error("malformed 7-bit encoded integer at offset {offset}")]
    MalformedVarInt { offset: usize },

    /// A token byte has no decode rule.
    #[error("unknown token {code:#04X} at offset {offset}")]
    UnknownToken { offset: usize, code: u8 },

    /// A binary-serialized record tag has no decode rule.
    #[error("unknown record type {tag} at offset {offset}")]
    UnknownRecordType { offset: usize, tag: u8 },

    /// An indexed string or type reference points past the defined entries.
    #[error(
        "undefined {table} reference at offset {offset}: index {index}, {defined} entries defined"
    )]
    UndefinedBackReference {
        offset: usize,
        table: TableKind,
        index: u32,
        defined: usize,
    },

    /// The byte at a type-reference site is not TypeRef/TypeRefAdd/TypeRefAddLocal.
    #[error("malformed type reference at offset {offset}: token {code:#04X}")]
    MalformedTypeReference { offset: usize, code: u8 },

    /// A sparse array declares more populated slots than its length.
    #[error("sparse array at offset {offset} declares {populated} entries for length {length}")]
    SparseArrayOverflow {
        offset: usize,
        populated: u32,
        length: u32,
    },

    /// A sparse array slot index is outside `0..length`.
    #[error("sparse array slot {index} at offset {offset} is outside length {length}")]
    SparseArrayIndexOutOfRange { offset: usize, index: i32, length: u32 },

    /// Nesting went deeper than `DecodeOptions::max_depth`.
    #[error("nesting depth limit {max_depth} exceeded at offset {offset}")]
    DepthLimitExceeded { offset: usize, max_depth: usize },

    /// A class member's binary type byte is outside the known range.
    #[error("unknown member type {code} at offset {offset}")]
    UnknownMemberType { offset: usize, code: u8 },
}

impl DecodeError {
    /// Byte offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match *self {
            Self::BadFormatMarker { offset, .. }
            | Self::BadVersionMarker { offset, .. }
            | Self::UnexpectedEndOfInput { offset, .. }
            | Self::MalformedVarInt { offset }
            | Self::UnknownToken { offset, .. }
            | Self::UnknownRecordType { offset, .. }
            | Self::UndefinedBackReference { offset, .. }
            | Self::MalformedTypeReference { offset, .. }
            | Self::SparseArrayOverflow { offset, .. }
            | Self::SparseArrayIndexOutOfRange { offset, .. }
            | Self::DepthLimitExceeded { offset, .. }
            | Self::UnknownMemberType { offset, .. } => offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset_and_context() {
        let err = DecodeError::UnknownToken {
            offset: 2,
            code: 0x99,
        };
        assert_eq!(err.to_string(), "unknown token 0x99 at offset 2");
        assert_eq!(err.offset(), 2);

        let err = DecodeError::UndefinedBackReference {
            offset: 7,
            table: TableKind::String,
            index: 3,
            defined: 1,
        };
        assert_eq!(
            err.to_string(),
            "undefined string reference at offset 7: index 3, 1 entries defined"
        );
    }

    #[test]
    fn marker_errors_format_hex() {
        let err = DecodeError::BadFormatMarker {
            offset: 0,
            expected: 0xFF,
            actual: 0x0A,
        };
        assert_eq!(
            err.to_string(),
            "bad format marker at offset 0: expected 0xFF, got 0x0A"
        );
    }
}
