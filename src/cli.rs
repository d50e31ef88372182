// Command-line front end for the viewstate decoder.
//
// `decode` prints an indented outline of a payload (or its value tree as
// JSON), `tokens` prints the token code table. Input is a raw payload
// file or stdin; any textual wrapper must be stripped beforehand.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use log::info;
use serde_json::{Value, json};

use crate::error::DecodeError;
use crate::format::{
    DEFAULT_MAX_DEPTH, DecodeOptions, DecodedValue, Envelope, Token, decode_with_options,
    decode_with_sink,
};
use crate::nrbf::Record;
use crate::trace::IndentRenderer;

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Object-state (view-state) payload decoder.
#[derive(Parser, Debug)]
#[command(
    name = "viewstate",
    version,
    about = "Object-state payload decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode a payload and print its structure.
    Decode(DecodeArgs),
    /// Print the token code table.
    Tokens,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Input payload file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Maximum value nesting depth.
    #[arg(long = "max-depth", value_parser = clap::value_parser!(u32).range(1..), default_value_t = DEFAULT_MAX_DEPTH as u32)]
    max_depth: u32,

    /// Decode a bare token stream without the two-byte envelope.
    #[arg(long = "no-envelope")]
    no_envelope: bool,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Decode,
    Tokens,
}

struct Options {
    command: Command,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    input_file: Option<PathBuf>,
    decode: DecodeOptions,
}

fn resolve_options(cli: Cli) -> Options {
    let quiet = cli.quiet;
    let verbose = cli.verbose.min(2);
    let json_output = cli.json_output;

    match cli.command {
        Cmd::Decode(args) => Options {
            command: Command::Decode,
            quiet,
            verbose,
            json_output,
            input_file: args.input,
            decode: DecodeOptions {
                max_depth: args.max_depth as usize,
                require_envelope: !args.no_envelope,
            },
        },
        Cmd::Tokens => Options {
            command: Command::Tokens,
            quiet,
            verbose,
            json_output,
            input_file: None,
            decode: DecodeOptions::default(),
        },
    }
}

/// Default log filter for the resolved verbosity. `RUST_LOG` still wins.
fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "off";
    }
    match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("viewstate".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// JSON rendering
// ---------------------------------------------------------------------------

fn value_to_json(value: &DecodedValue) -> Value {
    match value {
        DecodedValue::Null => Value::Null,
        DecodedValue::Bool(b) => json!(b),
        DecodedValue::Int16(v) => json!(v),
        DecodedValue::Int32(v) => json!(v),
        DecodedValue::Byte(v) => json!(v),
        DecodedValue::Char(c) => json!(c.to_string()),
        // Non-finite floats have no JSON form and come out as null.
        DecodedValue::Double(v) => json!(v),
        DecodedValue::Single(v) => json!(v),
        DecodedValue::DateTime(ticks) => json!({ "type": "DateTime", "ticks": ticks }),
        DecodedValue::String(s) => json!(s),
        DecodedValue::Formatted { type_name, text } => json!({
            "type": "StringFormatted",
            "type_name": type_name,
            "text": text,
        }),
        DecodedValue::Enum { type_name, value } => json!({
            "type": "Enum",
            "type_name": type_name,
            "value": value,
        }),
        DecodedValue::Type(name) => json!({ "type": "Type", "name": name }),
        DecodedValue::Pair(p) => json!({
            "type": "Pair",
            "first": value_to_json(&p.0),
            "second": value_to_json(&p.1),
        }),
        DecodedValue::Triplet(t) => json!({
            "type": "Triplet",
            "first": value_to_json(&t.0),
            "second": value_to_json(&t.1),
            "third": value_to_json(&t.2),
        }),
        DecodedValue::Array {
            element_type,
            items,
        } => json!({
            "type": "Array",
            "element_type": element_type,
            "items": items.iter().map(value_to_json).collect::<Vec<_>>(),
        }),
        DecodedValue::StringArray(items) => json!(items),
        DecodedValue::ArrayList(items) => {
            Value::Array(items.iter().map(value_to_json).collect())
        }
        // Keys need not be strings, so entries stay a list of pairs.
        DecodedValue::Dictionary(d) => json!({
            "type": d.kind.name(),
            "entries": d
                .iter()
                .map(|(k, v)| json!([value_to_json(k), value_to_json(v)]))
                .collect::<Vec<_>>(),
        }),
        DecodedValue::Color(c) => json!({
            "type": "Color",
            "argb": c.argb(),
            "text": c.to_string(),
        }),
        DecodedValue::Unit(u) => json!({
            "type": "Unit",
            "value": u.value,
            "unit": u.kind_name(),
        }),
        DecodedValue::Binary(record) => record_to_json(record),
        DecodedValue::SparseArray(s) => json!({
            "type": "SparseArray",
            "element_type": s.element_type,
            "length": s.length,
            "entries": s
                .iter()
                .map(|(i, v)| json!({ "index": i, "value": value_to_json(v) }))
                .collect::<Vec<_>>(),
        }),
    }
}

fn record_to_json(record: &Record) -> Value {
    match record {
        Record::SerializationHeader(h) => json!({
            "type": record.name(),
            "root_id": h.root_id,
            "header_id": h.header_id,
            "major_version": h.major_version,
            "minor_version": h.minor_version,
        }),
        Record::ClassWithMembersAndTypes(c) => json!({
            "type": record.name(),
            "object_id": c.class_info.object_id,
            "name": c.class_info.name,
            "member_count": c.class_info.member_count,
            "member_names": c.class_info.member_names,
            "member_types": c.member_type_info.type_names(),
            "library_id": c.library_id,
        }),
        Record::BinaryLibrary(l) => json!({
            "type": record.name(),
            "library_id": l.library_id,
            "library_name": l.library_name,
        }),
    }
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn read_input(path: Option<&Path>) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    match path {
        Some(path) => {
            BufReader::with_capacity(BUF_SIZE, File::open(path)?).read_to_end(&mut data)?;
        }
        None => {
            io::stdin().lock().read_to_end(&mut data)?;
        }
    }
    Ok(data)
}

fn decode_error_hint(opts: &Options, data: &[u8], e: &DecodeError) -> Option<&'static str> {
    match e {
        DecodeError::BadFormatMarker { .. } => {
            Some("use --no-envelope for a bare token stream")
        }
        DecodeError::UnknownToken { offset: 0, .. }
            if !opts.decode.require_envelope && Envelope::sniff(data) =>
        {
            Some("input starts with an envelope; drop --no-envelope")
        }
        _ => None,
    }
}

fn report_decode_error(opts: &Options, data: &[u8], e: &DecodeError) {
    eprintln!("viewstate: {e}");
    if opts.quiet {
        return;
    }
    if let Some(hint) = decode_error_hint(opts, data, e) {
        eprintln!("viewstate: hint: {hint}");
    }
}

fn cmd_decode(opts: &Options) -> i32 {
    let data = match read_input(opts.input_file.as_deref()) {
        Ok(data) => data,
        Err(e) => {
            match &opts.input_file {
                Some(path) => eprintln!("viewstate: input file: {}: {e}", path.display()),
                None => eprintln!("viewstate: stdin: {e}"),
            }
            return 1;
        }
    };
    info!("read {} input bytes", data.len());

    let value = if opts.json_output {
        match decode_with_options(&data, opts.decode) {
            Ok(value) => {
                println!("{}", serde_json::to_string_pretty(&value_to_json(&value)).unwrap());
                value
            }
            Err(e) => {
                report_decode_error(opts, &data, &e);
                return 1;
            }
        }
    } else {
        let out = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
        let mut renderer = IndentRenderer::new(out);
        let result = decode_with_sink(&data, opts.decode, &mut renderer);
        // Flush whatever outline was produced before reporting a failure.
        if let Err(e) = renderer.finish() {
            eprintln!("viewstate: write error: {e}");
            return 1;
        }
        match result {
            Ok(value) => value,
            Err(e) => {
                report_decode_error(opts, &data, &e);
                return 1;
            }
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "viewstate: decoded {} nodes from {} bytes",
            value.node_count(),
            data.len()
        );
    }

    0
}

// ---------------------------------------------------------------------------
// Tokens command
// ---------------------------------------------------------------------------

fn cmd_tokens(opts: &Options) -> i32 {
    if opts.json_output {
        let rows: Vec<Value> = Token::ALL
            .iter()
            .map(|t| {
                json!({
                    "code": t.code(),
                    "name": t.name(),
                    "value": t.is_value(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows).unwrap());
        return 0;
    }

    let mut out = BufWriter::new(io::stdout().lock());
    let mut write_rows = || -> io::Result<()> {
        for t in Token::ALL {
            let marker = if t.is_value() { "" } else { "  (no value rule)" };
            writeln!(out, "{:3}  {:#04X}  {}{marker}", t.code(), t.code(), t.name())?;
        }
        out.flush()
    };
    if let Err(e) = write_rows() {
        eprintln!("viewstate: write error: {e}");
        return 1;
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Decode => cmd_decode(&opts),
        Command::Tokens => cmd_tokens(&opts),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Color, Dictionary, DictionaryKind, Unit};
    use crate::nrbf::BinaryLibrary;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("viewstate".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn decode_subcommand_maps_correctly() {
        let opts = parse_opts(&["decode", "--max-depth", "64", "--no-envelope", "in.bin"]);
        assert_eq!(opts.command, Command::Decode);
        assert_eq!(opts.input_file, Some(PathBuf::from("in.bin")));
        assert_eq!(opts.decode.max_depth, 64);
        assert!(!opts.decode.require_envelope);
    }

    #[test]
    fn envelope_hints() {
        let bare = parse_opts(&["decode", "--no-envelope"]);
        let err = decode_with_options(&[0xFF, 0x01, 0x64], bare.decode).unwrap_err();
        assert_eq!(
            decode_error_hint(&bare, &[0xFF, 0x01, 0x64], &err),
            Some("input starts with an envelope; drop --no-envelope")
        );

        let enveloped = parse_opts(&["decode"]);
        let err = decode_with_options(&[0x64], enveloped.decode).unwrap_err();
        assert_eq!(
            decode_error_hint(&enveloped, &[0x64], &err),
            Some("use --no-envelope for a bare token stream")
        );

        let err = decode_with_options(&[0xFE], bare.decode).unwrap_err();
        assert_eq!(decode_error_hint(&bare, &[0xFE], &err), None);
    }

    #[test]
    fn decode_defaults() {
        let opts = parse_opts(&["decode"]);
        assert!(opts.input_file.is_none());
        assert_eq!(opts.decode, DecodeOptions::default());
        assert!(!opts.json_output);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let argv = ["viewstate", "decode", "--max-depth", "0"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let opts = parse_opts(&["tokens", "--json"]);
        assert_eq!(opts.command, Command::Tokens);
        assert!(opts.json_output);
    }

    #[test]
    fn verbose_is_capped() {
        let verbose = parse_opts(&["-v", "-v", "-v", "decode"]);
        assert_eq!(verbose.verbose, 2);
        assert_eq!(log_filter(&verbose), "debug");
    }

    #[test]
    fn quiet_silences_logging() {
        assert_eq!(log_filter(&parse_opts(&["-q", "decode"])), "off");
        assert_eq!(log_filter(&parse_opts(&["decode"])), "warn");
        assert_eq!(log_filter(&parse_opts(&["-v", "decode"])), "info");
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let argv = ["viewstate", "-q", "-v", "decode"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn fuzz_helper_tolerates_garbage() {
        fuzz_try_parse_args(&["--bogus".to_string()]);
        fuzz_try_parse_args(&["decode".to_string(), "--max-depth".to_string()]);
    }

    #[test]
    fn json_scalars() {
        assert_eq!(value_to_json(&DecodedValue::Null), Value::Null);
        assert_eq!(value_to_json(&DecodedValue::Int32(-3)), json!(-3));
        assert_eq!(value_to_json(&DecodedValue::Char('z')), json!("z"));
        assert_eq!(value_to_json(&DecodedValue::Double(f64::NAN)), Value::Null);
        assert_eq!(
            value_to_json(&DecodedValue::Unit(Unit {
                value: 2.5,
                type_code: 8,
            })),
            json!({ "type": "Unit", "value": 2.5, "unit": "Em" })
        );
    }

    #[test]
    fn json_dictionary_keeps_non_string_keys() {
        let mut d = Dictionary::new(DictionaryKind::Hashtable);
        d.insert(DecodedValue::Int32(1), DecodedValue::String("one".into()));
        d.insert(
            DecodedValue::Color(Color::Known(141)),
            DecodedValue::Bool(true),
        );
        let v = value_to_json(&DecodedValue::Dictionary(d));
        assert_eq!(
            v,
            json!({
                "type": "Hashtable",
                "entries": [
                    [1, "one"],
                    [{ "type": "Color", "argb": 0, "text": "Color [Red]" }, true],
                ],
            })
        );
    }

    #[test]
    fn json_binary_record() {
        let v = value_to_json(&DecodedValue::Binary(Box::new(Record::BinaryLibrary(
            BinaryLibrary {
                library_id: 2,
                library_name: "System.Web".into(),
            },
        ))));
        assert_eq!(v["type"], "BinaryLibrary");
        assert_eq!(v["library_id"], 2);
        assert_eq!(v["library_name"], "System.Web");
    }

    #[test]
    fn read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");
        std::fs::write(&path, [0xFF, 0x01, 0x64]).unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), [0xFF, 0x01, 0x64]);
        assert!(read_input(Some(&dir.path().join("missing.bin"))).is_err());
    }
}
