#![no_main]
use libfuzzer_sys::fuzz_target;
use viewstate::format::{DecodeOptions, decode_with_options, decode_with_sink};
use viewstate::trace::TraceCollector;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics.
    let _ = viewstate::decode(data);

    // Bare token streams reach every token rule without the envelope gate.
    let bare = DecodeOptions {
        require_envelope: false,
        ..DecodeOptions::default()
    };
    let plain = decode_with_options(data, bare);

    // The trace must not change the result.
    let mut sink = TraceCollector::new();
    let traced = decode_with_sink(data, bare, &mut sink);
    assert_eq!(format!("{plain:?}"), format!("{traced:?}"));
    if traced.is_ok() {
        assert!(sink.is_balanced());
    }
});
