#![no_main]
use libfuzzer_sys::fuzz_target;
use viewstate::format::ByteCursor;
use viewstate::nrbf::decode_record;
use viewstate::trace::NoopSink;

fuzz_target!(|data: &[u8]| {
    let mut cur = ByteCursor::new(data);
    let _ = decode_record(&mut cur, &mut NoopSink);
});
