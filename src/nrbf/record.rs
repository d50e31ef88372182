// Binary-serialized records.
//
// Only the structural envelope of a class graph is modelled: headers,
// class shapes and library references. Member values are not decoded.

/// Record tag of [`SerializationHeader`].
pub const RECORD_SERIALIZATION_HEADER: u8 = 0;
/// Record tag of [`ClassWithMembersAndTypes`].
pub const RECORD_CLASS_WITH_MEMBERS_AND_TYPES: u8 = 5;
/// Record tag of [`BinaryLibrary`].
pub const RECORD_BINARY_LIBRARY: u8 = 12;

/// Added to a primitive sub-type byte so it indexes the primitive range
/// of [`TYPE_NAMES`].
pub const PRIMITIVE_TYPE_OFFSET: u16 = 7;

/// Highest binary type code that is stored directly (1..=7); 0 defers to a
/// primitive sub-type read in the second pass.
pub const MAX_BINARY_TYPE: u8 = 7;

/// Shared type-name table. Entries 0..=7 are binary type tags, entries
/// from 8 are primitive types offset by [`PRIMITIVE_TYPE_OFFSET`].
pub const TYPE_NAMES: [&str; 26] = [
    "Primitive",
    "String",
    "Object",
    "SystemClass",
    "Class",
    "ObjectArray",
    "StringArray",
    "PrimitiveArray",
    "Boolean",
    "Byte",
    "Char",
    "INVALID",
    "Decimal",
    "Double",
    "Int16",
    "Int32",
    "Int64",
    "SByte",
    "Single",
    "TimeSpan",
    "DateTime",
    "UInt16",
    "UInt32",
    "UInt64",
    "Null",
    "String2",
];

/// Name of a stored member type code.
pub fn type_name(code: u16) -> Option<&'static str> {
    TYPE_NAMES.get(code as usize).copied()
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Record {
    SerializationHeader(SerializationHeader),
    ClassWithMembersAndTypes(ClassWithMembersAndTypes),
    BinaryLibrary(BinaryLibrary),
}

impl Record {
    pub fn tag(&self) -> u8 {
        match self {
            Record::SerializationHeader(_) => RECORD_SERIALIZATION_HEADER,
            Record::ClassWithMembersAndTypes(_) => RECORD_CLASS_WITH_MEMBERS_AND_TYPES,
            Record::BinaryLibrary(_) => RECORD_BINARY_LIBRARY,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Record::SerializationHeader(_) => "SerializationHeaderRecord",
            Record::ClassWithMembersAndTypes(_) => "ClassWithMembersAndTypes",
            Record::BinaryLibrary(_) => "BinaryLibrary",
        }
    }
}

/// Stream header: always the first record of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializationHeader {
    pub root_id: i32,
    pub header_id: i32,
    pub major_version: i32,
    pub minor_version: i32,
}

/// Class identity and member names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassInfo {
    pub object_id: i32,
    pub name: String,
    /// Declared member count; `member_names` has `max(member_count, 0)` entries.
    pub member_count: i32,
    pub member_names: Vec<String>,
}

/// Per-member type codes, indexes into [`TYPE_NAMES`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MemberTypeInfo {
    pub types: Vec<u16>,
}

impl MemberTypeInfo {
    /// Type names in member order. Codes past the table render as
    /// `Unknown(n)`.
    pub fn type_names(&self) -> Vec<String> {
        self.types
            .iter()
            .map(|&code| match type_name(code) {
                Some(name) => name.to_owned(),
                None => format!("Unknown({code})"),
            })
            .collect()
    }
}

/// A class record carrying its member names and member types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassWithMembersAndTypes {
    pub class_info: ClassInfo,
    pub member_type_info: MemberTypeInfo,
    /// Trailing library id, when the payload still has four bytes for it.
    pub library_id: Option<i32>,
}

/// Library (assembly) reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryLibrary {
    pub library_id: i32,
    pub library_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_codes_land_in_primitive_range() {
        // Primitive sub-type 1 is Boolean, 8 is Int32, 18 is String.
        assert_eq!(type_name(1 + PRIMITIVE_TYPE_OFFSET), Some("Boolean"));
        assert_eq!(type_name(8 + PRIMITIVE_TYPE_OFFSET), Some("Int32"));
        assert_eq!(type_name(18 + PRIMITIVE_TYPE_OFFSET), Some("String2"));
        assert_eq!(type_name(19 + PRIMITIVE_TYPE_OFFSET), None);
    }

    #[test]
    fn member_type_names_render_unknowns() {
        let info = MemberTypeInfo {
            types: vec![1, 15, 200],
        };
        assert_eq!(info.type_names(), ["String", "Int32", "Unknown(200)"]);
    }
}
