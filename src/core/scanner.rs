// Byte scanning helpers built on memchr (SIMD-accelerated)
//
// The tokenizer state machine consumes one byte at a time, but in several
// states only a small set of bytes can change anything. These helpers jump
// to the next such byte so the runs in between can be handled in bulk.

use memchr::{memchr2, memchr3};

/// Position of the next line terminator byte (`\r` or `\n`) at or after
/// `start`, or `None` when the rest of the input holds neither.
#[inline]
pub fn find_line_terminator(input: &[u8], start: usize) -> Option<usize> {
    memchr2(b'\r', b'\n', &input[start..]).map(|i| start + i)
}

/// Next byte a quoted field cares about: the closing quote or a terminator.
#[inline]
pub fn find_quote_or_terminator(input: &[u8], start: usize, quote: u8) -> Option<usize> {
    memchr3(quote, b'\r', b'\n', &input[start..]).map(|i| start + i)
}

/// Next byte an unquoted field cares about: the delimiter or a terminator.
#[inline]
pub fn find_delimiter_or_terminator(input: &[u8], start: usize, delimiter: u8) -> Option<usize> {
    memchr3(delimiter, b'\r', b'\n', &input[start..]).map(|i| start + i)
}

/// ASCII space or tab, the two bytes whitespace stripping acts on.
#[inline]
pub fn is_field_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// C `isspace` over the ASCII range; the numeric converters use this for
/// leading/trailing whitespace.
#[inline]
pub fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_line_terminator() {
        assert_eq!(find_line_terminator(b"abc\ndef", 0), Some(3));
        assert_eq!(find_line_terminator(b"abc\r\ndef", 0), Some(3));
        assert_eq!(find_line_terminator(b"abc\ndef", 4), None);
        assert_eq!(find_line_terminator(b"", 0), None);
    }

    #[test]
    fn test_find_quote_or_terminator() {
        assert_eq!(find_quote_or_terminator(b"ab\"cd", 0, b'"'), Some(2));
        assert_eq!(find_quote_or_terminator(b"ab\ncd", 0, b'"'), Some(2));
        assert_eq!(find_quote_or_terminator(b"abcd", 0, b'"'), None);
    }

    #[test]
    fn test_find_delimiter_or_terminator() {
        assert_eq!(find_delimiter_or_terminator(b"ab,cd", 0, b','), Some(2));
        assert_eq!(find_delimiter_or_terminator(b"ab\rcd", 0, b','), Some(2));
        assert_eq!(find_delimiter_or_terminator(b"ab cd", 3, b' '), None);
    }

    #[test]
    fn test_space_predicates() {
        assert!(is_field_space(b' '));
        assert!(is_field_space(b'\t'));
        assert!(!is_field_space(b'\n'));
        assert!(is_c_space(b'\n'));
        assert!(is_c_space(b'\x0b'));
        assert!(!is_c_space(b'0'));
    }
}
