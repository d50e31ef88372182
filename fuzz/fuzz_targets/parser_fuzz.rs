#![no_main]
use libfuzzer_sys::fuzz_target;

const WORDS: &[&str] = &[
    "decode",
    "tokens",
    "--json",
    "-q",
    "-v",
    "-vv",
    "--max-depth",
    "--no-envelope",
    "--",
    "-",
];

// Each input byte either names a known word or, past the table, starts a
// free-form argument taken from the NUL-delimited run that follows.
fuzz_target!(|data: &[u8]| {
    let mut args = Vec::new();
    let mut rest = data;
    while let Some((&b, tail)) = rest.split_first() {
        if args.len() == 16 {
            break;
        }
        if let Some(word) = WORDS.get(b as usize) {
            args.push((*word).to_string());
            rest = tail;
        } else {
            let end = tail.iter().position(|&c| c == 0).unwrap_or(tail.len());
            args.push(String::from_utf8_lossy(&tail[..end]).into_owned());
            rest = tail.get(end + 1..).unwrap_or(&[]);
        }
    }
    viewstate::cli::fuzz_try_parse_args(&args);
});
