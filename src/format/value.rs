// Decoded value tree.
//
// Each token decodes to exactly one `DecodedValue` variant. Composite
// variants own their children; nothing in a tree is shared.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::nrbf::Record;

use super::color::Color;
use super::unit::Unit;

/// Hash a float by bit pattern, folding `-0.0` onto `0.0` so that values
/// comparing equal hash equally. NaN never compares equal, so NaN keys in
/// a dictionary stay distinct.
pub(crate) fn hash_f64<H: Hasher>(v: f64, state: &mut H) {
    let bits = if v == 0.0 { 0 } else { v.to_bits() };
    bits.hash(state);
}

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// `Null`.
    Null,
    /// `True` / `False`.
    Bool(bool),
    /// `Int16`, fixed two bytes.
    Int16(i16),
    /// `Int32` (7-bit encoded) and `ZeroInt32`.
    Int32(i32),
    /// `Byte`.
    Byte(u8),
    /// `Char`.
    Char(char),
    /// `Double`.
    Double(f64),
    /// `Single`.
    Single(f32),
    /// `DateTime`: the raw 64-bit tick word, uninterpreted.
    DateTime(i64),
    /// `String`, `EmptyString`, `IndexedStringAdd` and `IndexedString`.
    String(String),
    /// `StringFormatted`: the raw text and the informational type name.
    Formatted { type_name: String, text: String },
    /// `IntEnum`: an enum type and its underlying integer.
    Enum { type_name: String, value: i32 },
    /// `Type`: a bare type reference.
    Type(String),
    /// `Pair`.
    Pair(Box<(DecodedValue, DecodedValue)>),
    /// `Triplet`.
    Triplet(Box<(DecodedValue, DecodedValue, DecodedValue)>),
    /// `Array`: typed element sequence.
    Array {
        element_type: String,
        items: Vec<DecodedValue>,
    },
    /// `StringArray`: raw strings, no per-element tokens.
    StringArray(Vec<String>),
    /// `ArrayList`.
    ArrayList(Vec<DecodedValue>),
    /// `Hashtable` / `HybridDictionary`.
    Dictionary(Dictionary),
    /// `Color`, `KnownColor`, `EmptyColor`.
    Color(Color),
    /// `Unit`, `EmptyUnit`.
    Unit(Unit),
    /// `BinarySerialized`: the first record of the embedded payload.
    Binary(Box<Record>),
    /// `SparseArray`.
    SparseArray(SparseArray),
}

impl Eq for DecodedValue {}

impl Hash for DecodedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            DecodedValue::Null => {}
            DecodedValue::Bool(v) => v.hash(state),
            DecodedValue::Int16(v) => v.hash(state),
            DecodedValue::Int32(v) => v.hash(state),
            DecodedValue::Byte(v) => v.hash(state),
            DecodedValue::Char(v) => v.hash(state),
            DecodedValue::Double(v) => hash_f64(*v, state),
            DecodedValue::Single(v) => hash_f64(f64::from(*v), state),
            DecodedValue::DateTime(v) => v.hash(state),
            DecodedValue::String(s) | DecodedValue::Type(s) => s.hash(state),
            DecodedValue::Formatted { type_name, text } => {
                type_name.hash(state);
                text.hash(state);
            }
            DecodedValue::Enum { type_name, value } => {
                type_name.hash(state);
                value.hash(state);
            }
            DecodedValue::Pair(p) => p.hash(state),
            DecodedValue::Triplet(t) => t.hash(state),
            DecodedValue::Array {
                element_type,
                items,
            } => {
                element_type.hash(state);
                items.hash(state);
            }
            DecodedValue::StringArray(items) => items.hash(state),
            DecodedValue::ArrayList(items) => items.hash(state),
            DecodedValue::Dictionary(d) => d.hash(state),
            DecodedValue::Color(c) => c.hash(state),
            DecodedValue::Unit(u) => u.hash(state),
            DecodedValue::Binary(r) => r.hash(state),
            DecodedValue::SparseArray(s) => s.hash(state),
        }
    }
}

impl DecodedValue {
    /// Short variant name, used for trace labels and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedValue::Null => "Null",
            DecodedValue::Bool(_) => "Boolean",
            DecodedValue::Int16(_) => "Int16",
            DecodedValue::Int32(_) => "Int32",
            DecodedValue::Byte(_) => "Byte",
            DecodedValue::Char(_) => "Char",
            DecodedValue::Double(_) => "Double",
            DecodedValue::Single(_) => "Single",
            DecodedValue::DateTime(_) => "DateTime",
            DecodedValue::String(_) => "String",
            DecodedValue::Formatted { .. } => "StringFormatted",
            DecodedValue::Enum { .. } => "Enum",
            DecodedValue::Type(_) => "Type",
            DecodedValue::Pair(_) => "Pair",
            DecodedValue::Triplet(_) => "Triplet",
            DecodedValue::Array { .. } => "Array",
            DecodedValue::StringArray(_) => "StringArray",
            DecodedValue::ArrayList(_) => "ArrayList",
            DecodedValue::Dictionary(d) => d.kind.name(),
            DecodedValue::Color(_) => "Color",
            DecodedValue::Unit(_) => "Unit",
            DecodedValue::Binary(_) => "BinarySerialized",
            DecodedValue::SparseArray(_) => "SparseArray",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DecodedValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            DecodedValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Integer view of `Int16`, `Int32`, `Byte` and `Enum` values.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            DecodedValue::Int16(v) => Some(i32::from(v)),
            DecodedValue::Int32(v) => Some(v),
            DecodedValue::Byte(v) => Some(i32::from(v)),
            DecodedValue::Enum { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            DecodedValue::Double(v) => Some(v),
            DecodedValue::Single(v) => Some(f64::from(v)),
            _ => None,
        }
    }

    /// Text of string-carrying values, including formatted strings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s),
            DecodedValue::Formatted { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Ordered children of sequence-shaped values.
    pub fn as_slice(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Array { items, .. } | DecodedValue::ArrayList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(&DecodedValue, &DecodedValue)> {
        match self {
            DecodedValue::Pair(p) => Some((&p.0, &p.1)),
            _ => None,
        }
    }

    pub fn as_triplet(&self) -> Option<(&DecodedValue, &DecodedValue, &DecodedValue)> {
        match self {
            DecodedValue::Triplet(t) => Some((&t.0, &t.1, &t.2)),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            DecodedValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_sparse_array(&self) -> Option<&SparseArray> {
        match self {
            DecodedValue::SparseArray(s) => Some(s),
            _ => None,
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + match self {
            DecodedValue::Pair(p) => p.0.node_count() + p.1.node_count(),
            DecodedValue::Triplet(t) => t.0.node_count() + t.1.node_count() + t.2.node_count(),
            DecodedValue::Array { items, .. } | DecodedValue::ArrayList(items) => {
                items.iter().map(DecodedValue::node_count).sum()
            }
            DecodedValue::Dictionary(d) => d
                .iter()
                .map(|(k, v)| k.node_count() + v.node_count())
                .sum(),
            DecodedValue::SparseArray(s) => s.iter().map(|(_, v)| v.node_count()).sum(),
            _ => 0,
        }
    }
}

/// One-line rendering of scalars; composites render as their kind and size.
impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Null => f.write_str("null"),
            DecodedValue::Bool(v) => write!(f, "{v}"),
            DecodedValue::Int16(v) => write!(f, "{v}"),
            DecodedValue::Int32(v) => write!(f, "{v}"),
            DecodedValue::Byte(v) => write!(f, "{v}"),
            DecodedValue::Char(v) => write!(f, "{v:?}"),
            DecodedValue::Double(v) => write!(f, "{v}"),
            DecodedValue::Single(v) => write!(f, "{v}"),
            DecodedValue::DateTime(ticks) => write!(f, "ticks {ticks:#018X}"),
            DecodedValue::String(s) => write!(f, "{s:?}"),
            DecodedValue::Formatted { type_name, text } => write!(f, "{text:?} ({type_name})"),
            DecodedValue::Enum { type_name, value } => write!(f, "{type_name} = {value}"),
            DecodedValue::Type(name) => f.write_str(name),
            DecodedValue::Pair(_) => f.write_str("Pair"),
            DecodedValue::Triplet(_) => f.write_str("Triplet"),
            DecodedValue::Array {
                element_type,
                items,
            } => write!(f, "Array<{element_type}> ({})", items.len()),
            DecodedValue::StringArray(items) => write!(f, "StringArray ({})", items.len()),
            DecodedValue::ArrayList(items) => write!(f, "ArrayList ({})", items.len()),
            DecodedValue::Dictionary(d) => write!(f, "{} ({})", d.kind.name(), d.len()),
            DecodedValue::Color(c) => write!(f, "{c}"),
            DecodedValue::Unit(u) => write!(f, "{u}"),
            DecodedValue::Binary(r) => f.write_str(r.name()),
            DecodedValue::SparseArray(s) => write!(
                f,
                "SparseArray<{}> ({}/{})",
                s.element_type,
                s.populated(),
                s.length
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Dictionary
// ---------------------------------------------------------------------------

/// Which token produced a dictionary. Both share one wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionaryKind {
    Hashtable,
    HybridDictionary,
}

impl DictionaryKind {
    pub fn name(self) -> &'static str {
        match self {
            DictionaryKind::Hashtable => "Hashtable",
            DictionaryKind::HybridDictionary => "HybridDictionary",
        }
    }
}

/// Insertion-ordered association list. Re-inserting a key replaces its
/// value in place: the key keeps its first position, the last value wins.
/// Equality and hashing both follow entry order.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pub kind: DictionaryKind,
    entries: IndexMap<DecodedValue, DecodedValue>,
}

impl Dictionary {
    pub fn new(kind: DictionaryKind) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    /// Insert, returning the replaced value for a duplicate key.
    pub fn insert(&mut self, key: DecodedValue, value: DecodedValue) -> Option<DecodedValue> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &DecodedValue) -> Option<&DecodedValue> {
        self.entries.get(key)
    }

    /// Look up a string key.
    pub fn get_str(&self, key: &str) -> Option<&DecodedValue> {
        self.entries.get(&DecodedValue::String(key.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DecodedValue, &DecodedValue)> {
        self.entries.iter()
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for Dictionary {}

impl Hash for Dictionary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.entries.len().hash(state);
        for (k, v) in &self.entries {
            k.hash(state);
            v.hash(state);
        }
    }
}

// ---------------------------------------------------------------------------
// Sparse array
// ---------------------------------------------------------------------------

/// Array with a fixed logical length and a subset of populated slots.
/// Unpopulated slots are absent, not zero.
#[derive(Debug, Clone)]
pub struct SparseArray {
    pub element_type: String,
    pub length: u32,
    /// Populated slots in wire order.
    entries: IndexMap<u32, DecodedValue>,
}

impl SparseArray {
    pub fn new(element_type: String, length: u32) -> Self {
        Self {
            element_type,
            length,
            entries: IndexMap::new(),
        }
    }

    /// Record a populated slot. A repeated index replaces the earlier value.
    /// The caller has already bounds-checked `index` against `length`.
    pub(crate) fn set(&mut self, index: u32, value: DecodedValue) {
        self.entries.insert(index, value);
    }

    /// Value at `index`, or `None` for an unpopulated or out-of-range slot.
    pub fn get(&self, index: u32) -> Option<&DecodedValue> {
        self.entries.get(&index)
    }

    /// Number of populated slots.
    pub fn populated(&self) -> usize {
        self.entries.len()
    }

    /// Populated `(index, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &DecodedValue)> {
        self.entries.iter().map(|(i, v)| (*i, v))
    }

    /// Expand to a dense vector of `length` slots, or `None` when `length`
    /// exceeds `max_len`. The declared length is untrusted input.
    pub fn to_dense(&self, max_len: usize) -> Option<Vec<Option<&DecodedValue>>> {
        let len = self.length as usize;
        if len > max_len {
            return None;
        }
        let mut dense = vec![None; len];
        for (i, v) in &self.entries {
            dense[*i as usize] = Some(v);
        }
        Some(dense)
    }
}

impl PartialEq for SparseArray {
    fn eq(&self, other: &Self) -> bool {
        self.element_type == other.element_type
            && self.length == other.length
            && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for SparseArray {}

impl Hash for SparseArray {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.element_type.hash(state);
        self.length.hash(state);
        for (i, v) in &self.entries {
            i.hash(state);
            v.hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> DecodedValue {
        DecodedValue::String(v.to_owned())
    }

    #[test]
    fn dictionary_last_write_wins_keeps_first_position() {
        let mut d = Dictionary::new(DictionaryKind::Hashtable);
        d.insert(s("a"), DecodedValue::Int32(1));
        d.insert(s("b"), DecodedValue::Int32(2));
        let old = d.insert(s("a"), DecodedValue::Int32(3));
        assert_eq!(old, Some(DecodedValue::Int32(1)));
        assert_eq!(d.len(), 2);
        let keys: Vec<_> = d.iter().map(|(k, _)| k.as_str().unwrap()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(d.get_str("a"), Some(&DecodedValue::Int32(3)));
    }

    #[test]
    fn float_keys_fold_negative_zero() {
        let mut d = Dictionary::new(DictionaryKind::HybridDictionary);
        d.insert(DecodedValue::Double(0.0), DecodedValue::Null);
        d.insert(DecodedValue::Double(-0.0), DecodedValue::Bool(true));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn sparse_array_absent_slots() {
        let mut a = SparseArray::new("System.String".into(), 4);
        a.set(2, s("x"));
        assert_eq!(a.get(0), None);
        assert_eq!(a.get(2), Some(&s("x")));
        assert_eq!(a.populated(), 1);
        assert_eq!(a.to_dense(4), Some(vec![None, None, Some(&s("x")), None]));
        assert_eq!(a.to_dense(3), None);
    }

    #[test]
    fn huge_sparse_length_is_not_densified() {
        let a = SparseArray::new("System.Object".into(), u32::MAX);
        assert_eq!(a.to_dense(1 << 20), None);
        assert_eq!(a.iter().count(), 0);
    }

    #[test]
    fn dictionary_equality_follows_entry_order() {
        let mut ab = Dictionary::new(DictionaryKind::Hashtable);
        ab.insert(s("a"), DecodedValue::Int32(1));
        ab.insert(s("b"), DecodedValue::Int32(2));
        let mut ba = Dictionary::new(DictionaryKind::Hashtable);
        ba.insert(s("b"), DecodedValue::Int32(2));
        ba.insert(s("a"), DecodedValue::Int32(1));
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());

        let mut x = SparseArray::new("T".into(), 4);
        x.set(0, s("p"));
        x.set(1, s("q"));
        let mut y = SparseArray::new("T".into(), 4);
        y.set(1, s("q"));
        y.set(0, s("p"));
        assert_ne!(x, y);
    }

    #[test]
    fn node_count_walks_children() {
        let v = DecodedValue::Pair(Box::new((
            DecodedValue::Int32(1),
            DecodedValue::ArrayList(vec![DecodedValue::Null, DecodedValue::Null]),
        )));
        assert_eq!(v.node_count(), 5);
    }

    #[test]
    fn display_scalars() {
        assert_eq!(DecodedValue::Int32(5).to_string(), "5");
        assert_eq!(s("hi").to_string(), "\"hi\"");
        assert_eq!(DecodedValue::Bool(false).to_string(), "false");
        assert_eq!(
            DecodedValue::DateTime(1).to_string(),
            "ticks 0x0000000000000001"
        );
    }

    #[test]
    fn accessors() {
        assert_eq!(DecodedValue::Int16(-2).as_i32(), Some(-2));
        assert_eq!(DecodedValue::Single(1.5).as_f64(), Some(1.5));
        let f = DecodedValue::Formatted {
            type_name: "System.Guid".into(),
            text: "abc".into(),
        };
        assert_eq!(f.as_str(), Some("abc"));
        assert!(DecodedValue::Null.is_null());
    }
}
