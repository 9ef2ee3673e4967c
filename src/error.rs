// Failure codes for tokenization and numeric conversion.

use thiserror::Error;

/// Errors surfaced by the tokenizer entry points and the scalar converters.
///
/// A successful call returns `Ok`; there is no "no error" variant. The most
/// recent failure is additionally recorded on the tokenizer instance (see
/// [`Tokenizer::last_error`](crate::Tokenizer::last_error)) so that callers
/// holding partial output can still report what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A header line was required but the input ran out before one was found.
    #[error("expected a header line but reached end of input")]
    InvalidLine,
    /// A field would begin past the last configured column.
    #[error("too many columns in data row")]
    TooManyCols,
    /// A row ended short of the configured column count and filling is off.
    #[error("not enough columns in data row")]
    NotEnoughCols,
    /// A field could not be parsed as a number (garbage or empty input).
    #[error("field could not be converted to a number")]
    ConversionError,
    /// A numeric field parsed but its value is out of range.
    #[error("numeric value out of range")]
    OverflowError,
}
