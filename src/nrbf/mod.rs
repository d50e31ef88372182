// Embedded binary-serialized class-graph payloads.
//
// The primary token stream can carry an opaque blob produced by a second,
// record-oriented serializer. This module decodes the structural envelope
// of such a blob: the header, class shapes and library references.
//
// # Modules
//
// - `record`  : Record types and the shared member type-name table
// - `decoder` : Single-record decoder over a payload-scoped cursor

pub mod decoder;
pub mod record;

pub use decoder::decode_record;
pub use record::{
    BinaryLibrary, ClassInfo, ClassWithMembersAndTypes, MemberTypeInfo, Record,
    SerializationHeader,
};
