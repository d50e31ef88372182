//! Viewstate: a decoder for the ASP.NET object-state ("view-state") wire
//! format and the binary-serialized records it can embed.
//!
//! The crate provides:
//! - The token-stream decoder and value tree (`format`)
//! - A structural decoder for embedded binary-serialized payloads (`nrbf`)
//! - A presentation seam for tracing decodes as an outline (`trace`)
//! - An optional CLI (`cli` feature)
//!
//! Input is the raw payload; stripping any textual transport encoding is
//! up to the caller.
//!
//! # Quick Start
//!
//! ```
//! use viewstate::{DecodedValue, decode};
//!
//! // Envelope, then a Pair of Int32(5) and String("hi").
//! let payload = [0xFF, 0x01, 0x0F, 0x02, 0x05, 0x05, 0x02, b'h', b'i'];
//! let value = decode(&payload).unwrap();
//! let (first, second) = value.as_pair().unwrap();
//! assert_eq!(first, &DecodedValue::Int32(5));
//! assert_eq!(second.as_str(), Some("hi"));
//! ```

pub mod error;
pub mod format;
pub mod nrbf;
pub mod trace;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{DecodeError, Result, TableKind};
pub use format::{
    DecodeOptions, DecodedValue, Decoder, Dictionary, DictionaryKind, SparseArray, decode,
    decode_with_options, decode_with_sink,
};
pub use trace::{IndentRenderer, NoopSink, PresentationSink, TraceCollector, TraceEvent};
