// Token-driven recursive-descent decoder.
//
// One decode call owns one cursor and one pair of back-reference tables.
// Values are read left to right; composite tokens recurse for their
// children, so table mutations happen in document order. Nesting is
// bounded by `DecodeOptions::max_depth`.
//
// Trace events go to a `PresentationSink` as values are built: a leaf per
// scalar, a group per composite.

use log::{debug, trace};

use crate::error::{DecodeError, Result};
use crate::nrbf;
use crate::trace::{NoopSink, PresentationSink};

use super::color::Color;
use super::cursor::ByteCursor;
use super::header::Envelope;
use super::tables::BackReferenceTables;
use super::token::Token;
use super::unit::Unit;
use super::value::{DecodedValue, Dictionary, DictionaryKind, SparseArray};

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum value nesting depth. The top-level value is depth 1.
    pub max_depth: usize,
    /// Expect the two-byte envelope before the first token.
    pub require_envelope: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            require_envelope: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decoder state for one payload.
pub struct Decoder<'a, S: PresentationSink = NoopSink> {
    cur: ByteCursor<'a>,
    tables: BackReferenceTables,
    options: DecodeOptions,
    depth: usize,
    sink: S,
}

impl<'a> Decoder<'a, NoopSink> {
    /// Create a decoder that discards trace events.
    pub fn new(bytes: &'a [u8], options: DecodeOptions) -> Self {
        Self::with_sink(bytes, options, NoopSink)
    }
}

impl<'a, S: PresentationSink> Decoder<'a, S> {
    /// Create a decoder that reports trace events to `sink`.
    pub fn with_sink(bytes: &'a [u8], options: DecodeOptions, sink: S) -> Self {
        Self {
            cur: ByteCursor::new(bytes),
            tables: BackReferenceTables::new(),
            options,
            depth: 0,
            sink,
        }
    }

    /// Decode the envelope (unless disabled) followed by one value.
    ///
    /// Bytes after the value are left unread.
    pub fn decode_document(&mut self) -> Result<DecodedValue> {
        if self.options.require_envelope {
            let env = Envelope::decode(&mut self.cur)?;
            debug!("envelope accepted (version {})", env.version);
        }

        let value = self.decode_value()?;

        if !self.cur.at_end() {
            debug!(
                "{} trailing bytes after top-level value at offset {}",
                self.cur.remaining(),
                self.cur.offset()
            );
        }
        Ok(value)
    }

    /// Decode one token and everything it owns.
    pub fn decode_value(&mut self) -> Result<DecodedValue> {
        if self.depth >= self.options.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                offset: self.cur.offset(),
                max_depth: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = self.dispatch();
        self.depth -= 1;
        result
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.cur.offset()
    }

    /// Back-reference tables as built so far.
    pub fn tables(&self) -> &BackReferenceTables {
        &self.tables
    }

    /// Consume the decoder and hand back its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn dispatch(&mut self) -> Result<DecodedValue> {
        let offset = self.cur.offset();
        let code = self.cur.read_u8()?;
        let token = Token::try_from(code).map_err(|code| DecodeError::UnknownToken { offset, code })?;
        trace!("{token} at offset {offset}");

        let value = match token {
            Token::Null => DecodedValue::Null,
            Token::EmptyString => DecodedValue::String(String::new()),
            Token::ZeroInt32 => DecodedValue::Int32(0),
            Token::True => DecodedValue::Bool(true),
            Token::False => DecodedValue::Bool(false),
            Token::Int16 => DecodedValue::Int16(self.cur.read_i16_le()?),
            Token::Int32 => DecodedValue::Int32(self.cur.read_var_i32()?),
            Token::Byte => DecodedValue::Byte(self.cur.read_u8()?),
            Token::Char => DecodedValue::Char(self.cur.read_char()?),
            Token::Double => DecodedValue::Double(self.cur.read_f64()?),
            Token::Single => DecodedValue::Single(self.cur.read_f32()?),
            Token::DateTime => DecodedValue::DateTime(self.cur.read_i64_le()?),
            Token::String => DecodedValue::String(self.cur.read_string()?),
            Token::IndexedStringAdd => {
                let s = self.cur.read_string()?;
                self.tables.add_string(s.clone());
                DecodedValue::String(s)
            }
            Token::IndexedString => {
                let at = self.cur.offset();
                let index = self.cur.read_u8()?;
                DecodedValue::String(self.tables.string(u32::from(index), at)?.to_owned())
            }
            Token::Color => DecodedValue::Color(Color::Argb(self.cur.read_u32_le()?)),
            Token::EmptyColor => DecodedValue::Color(Color::Empty),
            // Only the low 16 bits name a color.
            Token::KnownColor => {
                DecodedValue::Color(Color::Known(self.cur.read_var_u32()? & 0xFFFF))
            }
            Token::Unit => {
                let value = self.cur.read_f64()?;
                let type_code = self.cur.read_i32_le()?;
                DecodedValue::Unit(Unit { value, type_code })
            }
            Token::EmptyUnit => DecodedValue::Unit(Unit::EMPTY),
            Token::StringFormatted => {
                let type_name = self.read_type_ref()?;
                let text = self.cur.read_string()?;
                DecodedValue::Formatted { type_name, text }
            }
            Token::IntEnum => {
                let type_name = self.read_type_ref()?;
                let value = self.cur.read_var_i32()?;
                DecodedValue::Enum { type_name, value }
            }
            Token::Type => DecodedValue::Type(self.read_type_ref()?),

            Token::Pair => return self.read_pair(),
            Token::Triplet => return self.read_triplet(),
            Token::ArrayList => return self.read_array_list(),
            Token::StringArray => return self.read_string_array(),
            Token::Array => return self.read_array(),
            Token::Hashtable => return self.read_dictionary(DictionaryKind::Hashtable),
            Token::HybridDictionary => return self.read_dictionary(DictionaryKind::HybridDictionary),
            Token::BinarySerialized => return self.read_binary_serialized(),
            Token::SparseArray => return self.read_sparse_array(),

            Token::Nullable
            | Token::EventValidationStore
            | Token::TypeRefAdd
            | Token::TypeRefAddLocal
            | Token::TypeRef => return Err(DecodeError::UnknownToken { offset, code }),
        };

        self.emit_leaf(&value);
        Ok(value)
    }

    fn emit_leaf(&mut self, value: &DecodedValue) {
        match value {
            DecodedValue::Null => self.sink.leaf("Null"),
            _ => self.sink.leaf(&format!("{}: {value}", value.kind())),
        }
    }

    /// Upper bound for preallocating `count` elements: every element takes
    /// at least one byte, so never reserve more than the bytes left.
    fn capacity_hint(&self, count: u32) -> usize {
        (count as usize).min(self.cur.remaining())
    }

    /// Type-reference sub-protocol: a `TypeRef` index into the type table,
    /// or a `TypeRefAdd`/`TypeRefAddLocal` name that is appended to it.
    fn read_type_ref(&mut self) -> Result<String> {
        let offset = self.cur.offset();
        let code = self.cur.read_u8()?;
        match Token::try_from(code) {
            Ok(Token::TypeRef) => {
                let at = self.cur.offset();
                let index = self.cur.read_var_u32()?;
                Ok(self.tables.type_name(index, at)?.to_owned())
            }
            Ok(Token::TypeRefAdd | Token::TypeRefAddLocal) => {
                let name = self.cur.read_string()?;
                self.tables.add_type(name.clone());
                Ok(name)
            }
            _ => Err(DecodeError::MalformedTypeReference { offset, code }),
        }
    }

    fn read_pair(&mut self) -> Result<DecodedValue> {
        self.sink.begin_group("Pair");
        let first = self.decode_value()?;
        let second = self.decode_value()?;
        self.sink.end_group();
        Ok(DecodedValue::Pair(Box::new((first, second))))
    }

    fn read_triplet(&mut self) -> Result<DecodedValue> {
        self.sink.begin_group("Triplet");
        let first = self.decode_value()?;
        let second = self.decode_value()?;
        let third = self.decode_value()?;
        self.sink.end_group();
        Ok(DecodedValue::Triplet(Box::new((first, second, third))))
    }

    fn read_items(&mut self, count: u32) -> Result<Vec<DecodedValue>> {
        let mut items = Vec::with_capacity(self.capacity_hint(count));
        for _ in 0..count {
            items.push(self.decode_value()?);
        }
        Ok(items)
    }

    fn read_array_list(&mut self) -> Result<DecodedValue> {
        let count = self.cur.read_var_u32()?;
        self.sink.begin_group(&format!("ArrayList ({count})"));
        let items = self.read_items(count)?;
        self.sink.end_group();
        Ok(DecodedValue::ArrayList(items))
    }

    fn read_array(&mut self) -> Result<DecodedValue> {
        let element_type = self.read_type_ref()?;
        let count = self.cur.read_var_u32()?;
        self.sink
            .begin_group(&format!("Array<{element_type}> ({count})"));
        let items = self.read_items(count)?;
        self.sink.end_group();
        Ok(DecodedValue::Array {
            element_type,
            items,
        })
    }

    fn read_string_array(&mut self) -> Result<DecodedValue> {
        let count = self.cur.read_var_u32()?;
        self.sink.begin_group(&format!("StringArray ({count})"));
        let mut items = Vec::with_capacity(self.capacity_hint(count));
        for _ in 0..count {
            let s = self.cur.read_string()?;
            self.sink.leaf(&format!("{s:?}"));
            items.push(s);
        }
        self.sink.end_group();
        Ok(DecodedValue::StringArray(items))
    }

    fn read_dictionary(&mut self, kind: DictionaryKind) -> Result<DecodedValue> {
        let count = self.cur.read_var_u32()?;
        self.sink.begin_group(&format!("{} ({count})", kind.name()));
        let mut dict = Dictionary::new(kind);
        for _ in 0..count {
            self.sink.begin_group("Entry");
            let key = self.decode_value()?;
            let value = self.decode_value()?;
            self.sink.end_group();
            if let Some(old) = dict.insert(key, value) {
                trace!("duplicate {} key replaced a {} value", kind.name(), old.kind());
            }
        }
        self.sink.end_group();
        Ok(DecodedValue::Dictionary(dict))
    }

    fn read_sparse_array(&mut self) -> Result<DecodedValue> {
        let element_type = self.read_type_ref()?;
        let length = self.cur.read_var_u32()?;
        let count_at = self.cur.offset();
        let populated = self.cur.read_var_u32()?;
        if populated > length {
            return Err(DecodeError::SparseArrayOverflow {
                offset: count_at,
                populated,
                length,
            });
        }

        self.sink.begin_group(&format!(
            "SparseArray<{element_type}> ({populated}/{length})"
        ));
        let mut array = SparseArray::new(element_type, length);
        for _ in 0..populated {
            let at = self.cur.offset();
            let index = self.cur.read_var_i32()?;
            let slot = u32::try_from(index)
                .ok()
                .filter(|&i| i < length)
                .ok_or(DecodeError::SparseArrayIndexOutOfRange {
                    offset: at,
                    index,
                    length,
                })?;
            self.sink.begin_group(&format!("[{slot}]"));
            let value = self.decode_value()?;
            self.sink.end_group();
            array.set(slot, value);
        }
        self.sink.end_group();
        Ok(DecodedValue::SparseArray(array))
    }

    /// The payload gets its own cursor over exactly the declared bytes, so
    /// the record decoder can neither under- nor over-read the outer stream.
    fn read_binary_serialized(&mut self) -> Result<DecodedValue> {
        let length = self.cur.read_var_u32()? as usize;
        let base = self.cur.offset();
        let bytes = self.cur.read_exact(length)?;
        debug!("binary-serialized payload: {length} bytes at offset {base}");

        let mut payload = ByteCursor::with_base(bytes, base);
        self.sink
            .begin_group(&format!("BinarySerialized ({length} bytes)"));
        let record = nrbf::decode_record(&mut payload, &mut self.sink)?;
        self.sink.end_group();
        Ok(DecodedValue::Binary(Box::new(record)))
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Decode a complete payload (envelope + one value) with default options.
pub fn decode(bytes: &[u8]) -> Result<DecodedValue> {
    decode_with_options(bytes, DecodeOptions::default())
}

/// Decode a payload with explicit options.
pub fn decode_with_options(bytes: &[u8], options: DecodeOptions) -> Result<DecodedValue> {
    Decoder::new(bytes, options).decode_document()
}

/// Decode a payload, reporting trace events to `sink`.
pub fn decode_with_sink<S: PresentationSink>(
    bytes: &[u8],
    options: DecodeOptions,
    sink: &mut S,
) -> Result<DecodedValue> {
    Decoder::with_sink(bytes, options, sink).decode_document()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
