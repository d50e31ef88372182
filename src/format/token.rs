// Token codes.
//
// Every value in the stream is prefixed by one of these bytes. The numeric
// codes are part of the wire format.

/// One-byte value discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Token {
    Int16 = 1,
    Int32 = 2,
    Byte = 3,
    Char = 4,
    String = 5,
    DateTime = 6,
    Double = 7,
    Single = 8,
    Color = 9,
    KnownColor = 10,
    IntEnum = 11,
    EmptyColor = 12,
    Pair = 15,
    Triplet = 16,
    Array = 20,
    StringArray = 21,
    ArrayList = 22,
    Hashtable = 23,
    HybridDictionary = 24,
    Type = 25,
    /// Deprecated by the producer; never decoded.
    Nullable = 26,
    Unit = 27,
    EmptyUnit = 28,
    EventValidationStore = 29,
    IndexedStringAdd = 30,
    IndexedString = 31,
    StringFormatted = 40,
    TypeRefAdd = 41,
    TypeRefAddLocal = 42,
    TypeRef = 43,
    BinarySerialized = 50,
    SparseArray = 60,
    Null = 100,
    EmptyString = 101,
    ZeroInt32 = 102,
    True = 103,
    False = 104,
}

impl Token {
    /// All tokens in code order.
    pub const ALL: [Token; 37] = [
        Token::Int16,
        Token::Int32,
        Token::Byte,
        Token::Char,
        Token::String,
        Token::DateTime,
        Token::Double,
        Token::Single,
        Token::Color,
        Token::KnownColor,
        Token::IntEnum,
        Token::EmptyColor,
        Token::Pair,
        Token::Triplet,
        Token::Array,
        Token::StringArray,
        Token::ArrayList,
        Token::Hashtable,
        Token::HybridDictionary,
        Token::Type,
        Token::Nullable,
        Token::Unit,
        Token::EmptyUnit,
        Token::EventValidationStore,
        Token::IndexedStringAdd,
        Token::IndexedString,
        Token::StringFormatted,
        Token::TypeRefAdd,
        Token::TypeRefAddLocal,
        Token::TypeRef,
        Token::BinarySerialized,
        Token::SparseArray,
        Token::Null,
        Token::EmptyString,
        Token::ZeroInt32,
        Token::True,
        Token::False,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Token::Int16 => "Int16",
            Token::Int32 => "Int32",
            Token::Byte => "Byte",
            Token::Char => "Char",
            Token::String => "String",
            Token::DateTime => "DateTime",
            Token::Double => "Double",
            Token::Single => "Single",
            Token::Color => "Color",
            Token::KnownColor => "KnownColor",
            Token::IntEnum => "IntEnum",
            Token::EmptyColor => "EmptyColor",
            Token::Pair => "Pair",
            Token::Triplet => "Triplet",
            Token::Array => "Array",
            Token::StringArray => "StringArray",
            Token::ArrayList => "ArrayList",
            Token::Hashtable => "Hashtable",
            Token::HybridDictionary => "HybridDictionary",
            Token::Type => "Type",
            Token::Nullable => "Nullable",
            Token::Unit => "Unit",
            Token::EmptyUnit => "EmptyUnit",
            Token::EventValidationStore => "EventValidationStore",
            Token::IndexedStringAdd => "IndexedStringAdd",
            Token::IndexedString => "IndexedString",
            Token::StringFormatted => "StringFormatted",
            Token::TypeRefAdd => "TypeRefAdd",
            Token::TypeRefAddLocal => "TypeRefAddLocal",
            Token::TypeRef => "TypeRef",
            Token::BinarySerialized => "BinarySerialized",
            Token::SparseArray => "SparseArray",
            Token::Null => "Null",
            Token::EmptyString => "EmptyString",
            Token::ZeroInt32 => "ZeroInt32",
            Token::True => "True",
            Token::False => "False",
        }
    }

    /// Whether a value position holding this token has a decode rule.
    pub fn is_value(self) -> bool {
        !matches!(
            self,
            Token::Nullable
                | Token::EventValidationStore
                | Token::TypeRefAdd
                | Token::TypeRefAddLocal
                | Token::TypeRef
        )
    }
}

impl TryFrom<u8> for Token {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        Token::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or(code)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for token in Token::ALL {
            assert_eq!(Token::try_from(token.code()), Ok(token));
        }
    }

    #[test]
    fn wire_codes_are_fixed() {
        assert_eq!(Token::Int16.code(), 1);
        assert_eq!(Token::EmptyColor.code(), 12);
        assert_eq!(Token::Pair.code(), 15);
        assert_eq!(Token::Array.code(), 20);
        assert_eq!(Token::IndexedString.code(), 31);
        assert_eq!(Token::StringFormatted.code(), 40);
        assert_eq!(Token::TypeRef.code(), 43);
        assert_eq!(Token::BinarySerialized.code(), 50);
        assert_eq!(Token::SparseArray.code(), 60);
        assert_eq!(Token::Null.code(), 0x64);
        assert_eq!(Token::False.code(), 0x68);
    }

    #[test]
    fn gaps_are_rejected() {
        for code in [0u8, 13, 14, 17, 19, 32, 39, 44, 49, 51, 61, 99, 105, 0x99, 0xFF] {
            assert_eq!(Token::try_from(code), Err(code));
        }
    }

    #[test]
    fn codes_are_sorted_and_unique() {
        assert!(Token::ALL.windows(2).all(|w| w[0].code() < w[1].code()));
    }
}
