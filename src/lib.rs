// coltok - Columnar tokenization of delimited text
//
// Pipeline:
// 1. Bind a borrowed byte source (optionally via SourceMap)
// 2. skip_lines() advances past comments and blanks to the starting offset
// 3. tokenize() drives the byte state machine into per-column buffers
// 4. Iterate each column's fields; convert numerics with the scalar
//    converters
//
// Within a column buffer, fields are separated by a 0x00 byte and an empty
// field is stored as 0x01 0x00, so the buffer doubles as its own index.

// No unwrap/expect in production paths; fallible code returns ParseError.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod convert;
pub mod core;
mod error;
pub mod source;
pub mod tokenizer;

pub use error::ParseError;
pub use source::SourceMap;
pub use tokenizer::{Tokenizer, TokenizerConfig};
