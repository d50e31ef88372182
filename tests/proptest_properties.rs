use proptest::prelude::*;
use viewstate::format::{ByteCursor, DecodeOptions, Token, decode_with_options, decode_with_sink};
use viewstate::format::varint;
use viewstate::trace::TraceCollector;
use viewstate::{DecodeError, DecodedValue, TableKind, decode};

fn envelope() -> Vec<u8> {
    vec![0xFF, 0x01]
}

fn push_string(out: &mut Vec<u8>, s: &str) {
    varint::write_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

fn bare() -> DecodeOptions {
    DecodeOptions {
        require_envelope: false,
        ..DecodeOptions::default()
    }
}

proptest! {
    #[test]
    fn prop_varint_roundtrip(v in any::<u32>()) {
        let mut buf = Vec::new();
        varint::write_u32(&mut buf, v);
        prop_assert!(buf.len() <= varint::MAX_VARINT_LEN);
        prop_assert_eq!(buf.len(), varint::sizeof_u32(v));

        let mut cur = ByteCursor::new(&buf);
        prop_assert_eq!(cur.read_var_u32().unwrap(), v);
        prop_assert!(cur.at_end());
    }

    #[test]
    fn prop_fifth_continuation_is_malformed(
        low in proptest::collection::vec(0x80u8..=0xFF, 5),
        tail in any::<u8>(),
    ) {
        let mut data = low;
        data.push(tail);
        let mut cur = ByteCursor::with_base(&data, 10);
        prop_assert_eq!(
            cur.read_var_u32(),
            Err(DecodeError::MalformedVarInt { offset: 10 })
        );
    }

    #[test]
    fn prop_int32_scalar(v in any::<i32>()) {
        let mut data = envelope();
        data.push(Token::Int32.code());
        varint::write_u32(&mut data, v as u32);
        prop_assert_eq!(decode(&data).unwrap(), DecodedValue::Int32(v));
    }

    #[test]
    fn prop_indexed_string_resolves(s in "[ -~]{0,40}") {
        let mut data = envelope();
        data.push(Token::Pair.code());
        data.push(Token::IndexedStringAdd.code());
        push_string(&mut data, &s);
        data.push(Token::IndexedString.code());
        data.push(0);

        let v = decode(&data).unwrap();
        let (a, b) = v.as_pair().unwrap();
        prop_assert_eq!(a.as_str(), Some(s.as_str()));
        prop_assert_eq!(b.as_str(), Some(s.as_str()));
    }

    #[test]
    fn prop_undefined_indexed_string_fails(defined in 0usize..8, index in any::<u8>()) {
        prop_assume!(usize::from(index) >= defined);

        let mut data = envelope();
        data.push(Token::ArrayList.code());
        varint::write_u32(&mut data, defined as u32 + 1);
        for i in 0..defined {
            data.push(Token::IndexedStringAdd.code());
            push_string(&mut data, &format!("s{i}"));
        }
        data.push(Token::IndexedString.code());
        data.push(index);

        match decode(&data) {
            Err(DecodeError::UndefinedBackReference { table, index: got, defined: d, .. }) => {
                prop_assert_eq!(table, TableKind::String);
                prop_assert_eq!(got, u32::from(index));
                prop_assert_eq!(d, defined);
            }
            other => prop_assert!(false, "unexpected result: {other:?}"),
        }
    }

    #[test]
    fn prop_sparse_overflow_ignores_payload(
        length in 0u32..64,
        extra in 1u32..64,
        tail in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut data = envelope();
        data.push(Token::SparseArray.code());
        data.push(Token::TypeRefAdd.code());
        push_string(&mut data, "System.Object");
        varint::write_u32(&mut data, length);
        varint::write_u32(&mut data, length + extra);
        data.extend_from_slice(&tail);

        let is_overflow = matches!(
            decode(&data),
            Err(DecodeError::SparseArrayOverflow { .. })
        );
        prop_assert!(is_overflow);
    }

    #[test]
    fn prop_pair_keeps_member_types(n in any::<i32>(), s in "[a-zA-Z0-9]{0,24}") {
        let mut data = envelope();
        data.push(Token::Pair.code());
        data.push(Token::Int32.code());
        varint::write_u32(&mut data, n as u32);
        data.push(Token::String.code());
        push_string(&mut data, &s);

        let v = decode(&data).unwrap();
        let (a, b) = v.as_pair().unwrap();
        prop_assert_eq!(a, &DecodedValue::Int32(n));
        prop_assert_eq!(b, &DecodedValue::String(s));
    }

    #[test]
    fn prop_single_reversed_bytes(f in any::<f32>().prop_filter("finite", |f| f.is_finite())) {
        let mut data = envelope();
        data.push(Token::Single.code());
        data.extend_from_slice(&f.to_le_bytes());
        prop_assert_eq!(decode(&data).unwrap(), DecodedValue::Single(f));
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode(&data);
        let _ = decode_with_options(&data, bare());
    }

    #[test]
    fn prop_trace_does_not_change_result(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let plain = decode_with_options(&data, bare());
        let mut sink = TraceCollector::new();
        let traced = decode_with_sink(&data, bare(), &mut sink);
        prop_assert_eq!(format!("{plain:?}"), format!("{traced:?}"));
        if traced.is_ok() {
            prop_assert!(sink.is_balanced());
        }
    }
}
