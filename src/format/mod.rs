// Object-state wire format.
//
// A payload is a two-byte envelope followed by one self-describing,
// token-tagged value. Strings and type names may be defined once and
// referenced later by index.
//
// # Modules
//
// - `varint`  : 7-bit little-endian unsigned integers (at most 5 bytes)
// - `cursor`  : bounds-checked reads over a byte slice
// - `token`   : the token code table
// - `header`  : envelope marker and version
// - `tables`  : per-decode string and type back-reference tables
// - `value`   : the decoded value tree
// - `color`   : colour values and the known-colour name table
// - `unit`    : measurement units
// - `decoder` : the recursive-descent value decoder

pub mod color;
pub mod cursor;
pub mod decoder;
pub mod header;
pub mod tables;
pub mod token;
pub mod unit;
pub mod value;
pub mod varint;

pub use color::{Color, known_color_name};
pub use cursor::ByteCursor;
pub use decoder::{
    DEFAULT_MAX_DEPTH, DecodeOptions, Decoder, decode, decode_with_options, decode_with_sink,
};
pub use header::{ENVELOPE_LEN, Envelope, FORMAT_MARKER, VERSION_MARKER};
pub use tables::BackReferenceTables;
pub use token::Token;
pub use unit::{Unit, UnitType};
pub use value::{DecodedValue, Dictionary, DictionaryKind, SparseArray};
