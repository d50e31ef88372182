// Binary-serialized payload decoder.
//
// Reads one record tag and the record it selects, then returns. The cursor
// is private to the payload: it spans exactly the bytes the outer stream
// declared, so a short record fails here instead of reading into the
// surrounding token stream.

use log::{debug, trace};

use crate::error::{DecodeError, Result};
use crate::format::cursor::ByteCursor;
use crate::trace::PresentationSink;

use super::record::{
    BinaryLibrary, ClassInfo, ClassWithMembersAndTypes, MAX_BINARY_TYPE, MemberTypeInfo,
    PRIMITIVE_TYPE_OFFSET, RECORD_BINARY_LIBRARY, RECORD_CLASS_WITH_MEMBERS_AND_TYPES,
    RECORD_SERIALIZATION_HEADER, Record, SerializationHeader,
};

/// Decode the first record of a binary-serialized payload.
pub fn decode_record<S: PresentationSink>(
    cur: &mut ByteCursor<'_>,
    sink: &mut S,
) -> Result<Record> {
    let offset = cur.offset();
    let tag = cur.read_u8()?;
    trace!("record tag {tag} at offset {offset}");

    let record = match tag {
        RECORD_SERIALIZATION_HEADER => {
            sink.begin_group("SerializationHeaderRecord");
            let header = read_serialization_header(cur, sink)?;
            sink.end_group();
            Record::SerializationHeader(header)
        }
        RECORD_CLASS_WITH_MEMBERS_AND_TYPES => {
            sink.begin_group("ClassWithMembersAndTypes");
            let class = read_class_with_members_and_types(cur, sink)?;
            sink.end_group();
            Record::ClassWithMembersAndTypes(class)
        }
        RECORD_BINARY_LIBRARY => {
            sink.begin_group("BinaryLibrary");
            let library = read_binary_library(cur, sink)?;
            sink.end_group();
            Record::BinaryLibrary(library)
        }
        _ => return Err(DecodeError::UnknownRecordType { offset, tag }),
    };

    if !cur.at_end() {
        debug!(
            "{} record left {} payload bytes unread",
            record.name(),
            cur.remaining()
        );
    }
    Ok(record)
}

fn read_serialization_header<S: PresentationSink>(
    cur: &mut ByteCursor<'_>,
    sink: &mut S,
) -> Result<SerializationHeader> {
    let header = SerializationHeader {
        root_id: cur.read_i32_le()?,
        header_id: cur.read_i32_le()?,
        major_version: cur.read_i32_le()?,
        minor_version: cur.read_i32_le()?,
    };
    sink.leaf(&format!("RootId: {}", header.root_id));
    sink.leaf(&format!("HeaderId: {}", header.header_id));
    sink.leaf(&format!("Major Version: {}", header.major_version));
    sink.leaf(&format!("Minor Version: {}", header.minor_version));
    Ok(header)
}

fn read_binary_library<S: PresentationSink>(
    cur: &mut ByteCursor<'_>,
    sink: &mut S,
) -> Result<BinaryLibrary> {
    let library_id = cur.read_i32_le()?;
    let library_name = cur.read_short_string()?;
    sink.leaf(&format!("LibraryId: {library_id}"));
    sink.leaf(&format!("LibraryName: {library_name:?}"));
    Ok(BinaryLibrary {
        library_id,
        library_name,
    })
}

fn read_class_info<S: PresentationSink>(
    cur: &mut ByteCursor<'_>,
    sink: &mut S,
) -> Result<ClassInfo> {
    let object_id = cur.read_i32_le()?;
    let name = cur.read_short_string()?;
    let member_count = cur.read_i32_le()?;
    sink.leaf(&format!("ObjectId: {object_id}"));
    sink.leaf(&format!("Name: {name:?}"));
    sink.leaf(&format!("MemberCount: {member_count}"));

    // Each name costs at least its length byte, which bounds the
    // preallocation by what the payload can actually hold.
    let count = usize::try_from(member_count).unwrap_or(0);
    let mut member_names = Vec::with_capacity(count.min(cur.remaining()));
    sink.begin_group("MemberNames");
    for _ in 0..count {
        let member = cur.read_short_string()?;
        sink.leaf(&format!("{member:?}"));
        member_names.push(member);
    }
    sink.end_group();

    Ok(ClassInfo {
        object_id,
        name,
        member_count,
        member_names,
    })
}

/// Two passes: one binary type byte per member, then one primitive
/// sub-type byte for each member whose binary type was 0, in the order
/// those members appeared.
fn read_member_type_info<S: PresentationSink>(
    cur: &mut ByteCursor<'_>,
    member_count: usize,
    sink: &mut S,
) -> Result<MemberTypeInfo> {
    let mut types = Vec::with_capacity(member_count.min(cur.remaining()));
    let mut deferred = Vec::new();

    for i in 0..member_count {
        let offset = cur.offset();
        let code = cur.read_u8()?;
        if code > MAX_BINARY_TYPE {
            return Err(DecodeError::UnknownMemberType { offset, code });
        }
        if code == 0 {
            deferred.push(i);
        }
        types.push(u16::from(code));
    }

    for i in deferred {
        let code = cur.read_u8()?;
        types[i] = u16::from(code) + PRIMITIVE_TYPE_OFFSET;
    }

    let info = MemberTypeInfo { types };
    sink.begin_group("Types");
    for name in info.type_names() {
        sink.leaf(&name);
    }
    sink.end_group();
    Ok(info)
}

fn read_class_with_members_and_types<S: PresentationSink>(
    cur: &mut ByteCursor<'_>,
    sink: &mut S,
) -> Result<ClassWithMembersAndTypes> {
    sink.begin_group("ClassInfo");
    let class_info = read_class_info(cur, sink)?;
    sink.end_group();

    sink.begin_group("MemberTypeInfo");
    let member_type_info = read_member_type_info(cur, class_info.member_names.len(), sink)?;
    sink.end_group();

    let library_id = if cur.remaining() >= 4 {
        let id = cur.read_i32_le()?;
        sink.leaf(&format!("LibraryId: {id}"));
        Some(id)
    } else {
        None
    };

    Ok(ClassWithMembersAndTypes {
        class_info,
        member_type_info,
        library_id,
    })
}
