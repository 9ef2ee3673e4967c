// Byte-driven tokenization of delimited text into the column store
//
// A single-pass state machine classifies every input byte and appends field
// content to per-column buffers. Quoting, comment lines, whitespace
// stripping, and LF / CRLF / CR terminators are all handled by state
// transitions. The machine consumes exactly one byte per outer-loop step;
// an inner re-dispatch loop lets a new state re-process the current byte
// without advancing the cursor.

use crate::convert;
use crate::core::columns::{ColumnStore, EMPTY_FIELD_MARKER, FIELD_TERMINATOR};
use crate::core::scanner::{
    find_delimiter_or_terminator, find_line_terminator, find_quote_or_terminator, is_field_space,
};
use crate::error::ParseError;

/// Tokenizer configuration. `comment: None` disables comment handling.
#[derive(Debug, Clone, Copy)]
pub struct TokenizerConfig {
    /// Field separator byte.
    pub delimiter: u8,
    /// Byte introducing a comment line, or `None` to disable.
    pub comment: Option<u8>,
    /// Quote byte toggling verbatim mode for delimiters and terminators.
    pub quote: u8,
    /// Pad short rows with empty fields instead of raising an error.
    pub fill_extra_cols: bool,
    /// Discard leading space/tab at the line level.
    pub strip_whitespace_lines: bool,
    /// Discard leading/trailing space/tab at the field level.
    pub strip_whitespace_fields: bool,
    /// Use the locale-free converter for `str_to_double`.
    pub use_fast_converter: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            delimiter: b',',
            comment: None,
            quote: b'"',
            fill_extra_cols: false,
            strip_whitespace_lines: true,
            strip_whitespace_fields: true,
            use_fast_converter: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartLine,
    StartField,
    Field,
    StartQuotedField,
    QuotedField,
    QuotedFieldNewline,
    Comment,
    CarriageReturn,
}

/// Streaming tokenizer over a borrowed byte source.
///
/// The source is bound with [`set_source`](Tokenizer::set_source) and never
/// copied; column buffers are owned by the tokenizer and replaced on the
/// next [`tokenize`](Tokenizer::tokenize) call.
pub struct Tokenizer<'s> {
    source: &'s [u8],
    pos: usize,
    config: TokenizerConfig,
    store: ColumnStore,
    num_cols: usize,
    num_rows: usize,
    state: State,
    code: Option<ParseError>,
    iter_col: usize,
    curr_pos: usize,
    // Reserved storage backing the slice returned for empty fields, so
    // callers always receive a stable address.
    empty_buf: [u8; 2],
}

impl<'s> Tokenizer<'s> {
    pub fn new(config: TokenizerConfig) -> Tokenizer<'s> {
        Tokenizer {
            source: &[],
            pos: 0,
            config,
            store: ColumnStore::new(),
            num_cols: 0,
            num_rows: 0,
            state: State::StartLine,
            code: None,
            iter_col: 0,
            curr_pos: 0,
            empty_buf: [0; 2],
        }
    }

    /// Bind a source slice and rewind to its start.
    pub fn set_source(&mut self, source: &'s [u8]) {
        self.source = source;
        self.pos = 0;
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// The most recent failure recorded by any entry point.
    pub fn last_error(&self) -> Option<ParseError> {
        self.code
    }

    fn record(&mut self, err: ParseError) -> ParseError {
        self.code = Some(err);
        tracing::debug!(error = %err, pos = self.pos, "tokenizer error");
        err
    }

    /// Advance past `offset` significant lines: non-comment lines holding at
    /// least one byte that is not a terminator. Whitespace-only lines count
    /// as blank for data but as significant for the header, and comment
    /// detection looks at the first counted byte of each line.
    pub fn skip_lines(&mut self, offset: usize, header: bool) -> Result<(), ParseError> {
        let mut signif_chars = 0usize;
        let mut comment = false;
        let mut skipped = 0usize;

        while skipped < offset {
            if self.pos >= self.source.len() {
                if header {
                    // A header line is required.
                    return Err(self.record(ParseError::InvalidLine));
                }
                // No data in the input; tokenization becomes a no-op.
                return Ok(());
            }

            let c = self.source[self.pos];

            if c == b'\r' || c == b'\n' {
                if c == b'\r' && self.source.get(self.pos + 1) == Some(&b'\n') {
                    self.pos += 1; // consume the \n of a \r\n pair
                }
                if !comment && signif_chars > 0 {
                    skipped += 1;
                }
                signif_chars = 0;
                comment = false;
            } else if !is_field_space(c) || !self.config.strip_whitespace_lines || header {
                if signif_chars == 0 && self.config.comment == Some(c) {
                    comment = true;
                }
                // Header skipping counts whitespace as significant, data
                // skipping does not.
                signif_chars += 1;
            }

            self.pos += 1;

            // Once the line is classified nothing before its terminator can
            // change the outcome; jump straight there.
            if signif_chars > 0 {
                self.pos = find_line_terminator(self.source, self.pos)
                    .unwrap_or(self.source.len());
            }
        }

        Ok(())
    }

    /// Tokenize rows starting at the current position.
    ///
    /// Stops after `end` data rows (`None` reads to end of input), at end of
    /// input, or on the first error. With `header` set, the first
    /// significant line is stored in a single column — field boundaries
    /// within it still terminated — and parsing stops after that line;
    /// otherwise each row must yield exactly `num_cols` fields.
    pub fn tokenize(
        &mut self,
        end: Option<usize>,
        header: bool,
        num_cols: usize,
    ) -> Result<(), ParseError> {
        tracing::trace!(?end, header, num_cols, pos = self.pos, "tokenize");
        self.code = None;
        self.num_rows = 0;
        self.num_cols = if header { 1 } else { num_cols };
        self.store.reset(self.num_cols);

        if end == Some(0) {
            return Ok(());
        }

        let src = self.source;
        let strip_lines = self.config.strip_whitespace_lines;
        let strip_fields = self.config.strip_whitespace_fields;
        let delimiter = self.config.delimiter;
        let quote = self.config.quote;

        let mut col = 0usize;
        let mut old_state = State::StartLine;
        let mut whitespace = true;
        self.state = State::StartLine;

        // One extra step past the end feeds a virtual newline so a final
        // line without a terminator still flushes.
        while self.pos < src.len() + 1 {
            let mut c = if self.pos == src.len() {
                b'\n'
            } else {
                src[self.pos]
            };

            // Each arm either consumes the byte (break) or hands it to the
            // next state for re-processing (continue) without advancing.
            loop {
                match self.state {
                    State::StartLine => {
                        if c == b'\n' {
                            break;
                        }
                        if c == b'\r' {
                            old_state = State::StartLine;
                            self.state = State::CarriageReturn;
                            break;
                        }
                        if is_field_space(c) && strip_lines {
                            break;
                        }
                        if self.config.comment == Some(c) {
                            self.state = State::Comment;
                            break;
                        }
                        col = 0;
                        whitespace = true;
                        self.state = State::StartField;
                        continue;
                    }

                    State::StartField => {
                        if is_field_space(c) && strip_fields {
                            // strip whitespace before the field begins
                            break;
                        }
                        if !strip_lines && self.config.comment == Some(c) {
                            // comment line not caught at line start because
                            // line stripping is off
                            self.state = State::Comment;
                            break;
                        }
                        if c == delimiter {
                            // field ends before it begins
                            if col >= self.num_cols {
                                return Err(self.record(ParseError::TooManyCols));
                            }
                            self.store.end_field(col, strip_fields);
                            if !header {
                                col += 1;
                            }
                            whitespace = true;
                            break;
                        }
                        if c == b'\r' {
                            old_state = State::StartField;
                            self.state = State::CarriageReturn;
                            break;
                        }
                        if c == b'\n' {
                            if strip_lines {
                                if is_field_space(delimiter) {
                                    // A whitespace delimiter never produces a
                                    // trailing empty field: '1 2 3   ' is
                                    // three fields.
                                } else {
                                    // '1,2, ' ends with an empty field.
                                    if col >= self.num_cols {
                                        return Err(self.record(ParseError::TooManyCols));
                                    }
                                    self.store.end_field(col, strip_fields);
                                    if !header {
                                        col += 1;
                                    }
                                }
                            } else {
                                // Line stripping is off, so trailing
                                // whitespace after the last delimiter counts
                                // as a field: replay it from the delimiter.
                                let line_end = self.pos;
                                let mut scan = self.pos;
                                let mut last_delim = None;
                                loop {
                                    if scan == 0 {
                                        break;
                                    }
                                    scan -= 1;
                                    let b = src[scan];
                                    if b == delimiter {
                                        last_delim = Some(scan);
                                        break;
                                    }
                                    if b == b'\n' || b == b'\r' {
                                        break;
                                    }
                                }
                                match last_delim {
                                    None => {
                                        // Backtracked to the line beginning:
                                        // the whole line is whitespace.
                                        self.pos = line_end;
                                    }
                                    Some(d) => {
                                        if col >= self.num_cols {
                                            return Err(self.record(ParseError::TooManyCols));
                                        }
                                        self.pos = d + 1;
                                        while self.pos < line_end {
                                            self.store.push(col, src[self.pos]);
                                            self.pos += 1;
                                        }
                                        self.store.end_field(col, strip_fields);
                                        if !header {
                                            col += 1;
                                        }
                                    }
                                }
                            }

                            if self.end_line(&mut col, end, header)? {
                                return Ok(());
                            }
                            old_state = State::StartLine;
                            self.state = State::StartLine;
                            break;
                        }
                        if c == quote {
                            self.state = State::StartQuotedField;
                            break;
                        }
                        if col >= self.num_cols {
                            return Err(self.record(ParseError::TooManyCols));
                        }
                        // Valid field byte; re-process it in Field mode.
                        self.state = State::Field;
                        continue;
                    }

                    State::Field => {
                        if whitespace && col == 0 && self.config.comment == Some(c) {
                            // Comment byte before any data on the line, with
                            // whitespace stripping off: ' # a b c'.
                            self.state = State::Comment;
                            break;
                        }
                        if c == delimiter {
                            self.store.end_field(col, strip_fields);
                            if !header {
                                col += 1;
                            }
                            whitespace = true;
                            self.state = State::StartField;
                            break;
                        }
                        if c == b'\r' {
                            old_state = State::Field;
                            self.state = State::CarriageReturn;
                            break;
                        }
                        if c == b'\n' {
                            self.store.end_field(col, strip_fields);
                            if !header {
                                col += 1;
                            }
                            if self.end_line(&mut col, end, header)? {
                                return Ok(());
                            }
                            old_state = State::StartLine;
                            self.state = State::StartLine;
                            break;
                        }
                        if !is_field_space(c) {
                            whitespace = false;
                        }
                        if !whitespace && self.pos < src.len() {
                            // Nothing but the delimiter or a terminator can
                            // end this run; copy it in one go.
                            let run_end = find_delimiter_or_terminator(src, self.pos, delimiter)
                                .unwrap_or(src.len());
                            self.store.push_slice(col, &src[self.pos..run_end]);
                            self.pos = run_end - 1;
                        } else {
                            self.store.push(col, c);
                        }
                        break;
                    }

                    State::StartQuotedField => {
                        if is_field_space(c) && strip_fields {
                            // ignore initial whitespace
                            break;
                        }
                        if c == quote {
                            // empty quotes
                            if col >= self.num_cols {
                                return Err(self.record(ParseError::TooManyCols));
                            }
                            self.store.end_field(col, strip_fields);
                            if !header {
                                col += 1;
                            }
                            break;
                        }
                        if col >= self.num_cols {
                            return Err(self.record(ParseError::TooManyCols));
                        }
                        // Data begins; re-process it in QuotedField mode.
                        self.state = State::QuotedField;
                        continue;
                    }

                    State::QuotedField => {
                        if c == quote {
                            // Parse the rest of the field normally: '"ab"c'
                            // becomes 'abc'.
                            self.state = State::Field;
                            break;
                        }
                        if c == b'\n' {
                            // The newline is part of the field; what follows
                            // may still be a blank continuation.
                            self.store.push(col, b'\n');
                            self.state = State::QuotedFieldNewline;
                            break;
                        }
                        if c == b'\r' {
                            old_state = State::QuotedField;
                            self.state = State::CarriageReturn;
                            break;
                        }
                        if self.pos < src.len() {
                            let run_end = find_quote_or_terminator(src, self.pos, quote)
                                .unwrap_or(src.len());
                            self.store.push_slice(col, &src[self.pos..run_end]);
                            self.pos = run_end - 1;
                        } else {
                            self.store.push(col, c);
                        }
                        break;
                    }

                    State::QuotedFieldNewline => {
                        if (is_field_space(c) && strip_lines) || c == b'\n' {
                            // blank continuation inside the quoted field
                            break;
                        }
                        if c == b'\r' {
                            old_state = State::QuotedFieldNewline;
                            self.state = State::CarriageReturn;
                            break;
                        }
                        if c == quote {
                            // The outer quote closes cleanly after the blank
                            // continuation.
                            self.state = State::Field;
                            break;
                        }
                        // Data resumed; re-process it as quoted content.
                        self.state = State::QuotedField;
                        continue;
                    }

                    State::Comment => {
                        if c == b'\n' {
                            self.state = State::StartLine;
                            break;
                        }
                        if c == b'\r' {
                            old_state = State::Comment;
                            self.state = State::CarriageReturn;
                            break;
                        }
                        if self.pos < src.len() {
                            // Discard the rest of the line in one jump.
                            match find_line_terminator(src, self.pos) {
                                Some(t) => self.pos = t - 1,
                                None => self.pos = src.len() - 1,
                            }
                        }
                        break;
                    }

                    State::CarriageReturn => {
                        self.state = old_state;
                        if c != b'\n' {
                            // CR-only terminator: rewind onto the CR and
                            // hand the interrupted state a synthesized
                            // newline; the current byte is re-read after.
                            self.pos -= 1;
                            c = b'\n';
                        }
                        // For CRLF the LF itself is re-processed in the
                        // interrupted state, pairing the two bytes into one
                        // terminator.
                        continue;
                    }
                }
            }

            self.pos += 1;
        }

        tracing::trace!(rows = self.num_rows, "tokenize complete");
        Ok(())
    }

    /// Close out a data line; returns `Ok(true)` when tokenization should
    /// stop (header handled, or the requested row count was reached).
    fn end_line(
        &mut self,
        col: &mut usize,
        end: Option<usize>,
        header: bool,
    ) -> Result<bool, ParseError> {
        if header {
            self.pos += 1;
            return Ok(true);
        }
        if self.config.fill_extra_cols {
            while *col < self.num_cols {
                self.store.push(*col, EMPTY_FIELD_MARKER);
                self.store.end_field(*col, self.config.strip_whitespace_fields);
                *col += 1;
            }
        } else if *col < self.num_cols {
            return Err(self.record(ParseError::NotEnoughCols));
        }
        self.num_rows += 1;
        if end == Some(self.num_rows) {
            self.pos += 1;
            return Ok(true);
        }
        Ok(false)
    }

    /// Begin walking the fields stored in `col`.
    pub fn start_iteration(&mut self, col: usize) {
        self.iter_col = col;
        self.curr_pos = 0;
    }

    /// True once the cursor has walked off the column buffer or reached the
    /// zero-filled tail.
    pub fn finished_iteration(&self) -> bool {
        let data = self.store.data(self.iter_col);
        self.curr_pos >= data.len() || data[self.curr_pos] == FIELD_TERMINATOR
    }

    /// The next field of the column under iteration. Empty fields come back
    /// as a zero-length slice of the reserved empty-field buffer.
    pub fn next_field(&mut self) -> &[u8] {
        let data = self.store.data(self.iter_col);
        let start = self.curr_pos;
        let mut pos = start;
        while pos < data.len() && data[pos] != FIELD_TERMINATOR {
            pos += 1;
        }
        self.curr_pos = pos + 1; // the next field begins past the terminator

        if pos > start && data[start] == EMPTY_FIELD_MARKER {
            return &self.empty_buf[..0];
        }
        &self.store.data(self.iter_col)[start..pos]
    }

    /// All fields of a column, without touching the iteration cursor.
    pub fn column_values(&self, col: usize) -> Vec<&[u8]> {
        let data = self.store.data(col);
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < data.len() && data[pos] != FIELD_TERMINATOR {
            let start = pos;
            while pos < data.len() && data[pos] != FIELD_TERMINATOR {
                pos += 1;
            }
            if data[start] == EMPTY_FIELD_MARKER {
                out.push(&self.empty_buf[..0]);
            } else {
                out.push(&data[start..pos]);
            }
            pos += 1;
        }
        out
    }

    /// Convert a field to a signed integer with strtol base-auto-detection.
    /// Trailing garbage or empty input is a conversion error; out-of-range
    /// values are an overflow error.
    pub fn str_to_long(&mut self, field: &[u8]) -> Result<i64, ParseError> {
        let (value, end, range_error) = convert::strtol_base0(field);
        if end == 0 || end < field.len() {
            return Err(self.record(ParseError::ConversionError));
        }
        if range_error {
            return Err(self.record(ParseError::OverflowError));
        }
        Ok(value)
    }

    /// Convert a field to a double. The fast path is the locale-free
    /// converter with `.` decimal, `E` exponent, and `,` thousands
    /// separator; the slow path is the standard library parser.
    pub fn str_to_double(&mut self, field: &[u8]) -> Result<f64, ParseError> {
        if self.config.use_fast_converter {
            let r = convert::xstrtod(field, b'.', b'E', Some(b','), true);
            if r.end == 0 || r.end < field.len() {
                return Err(self.record(ParseError::ConversionError));
            }
            if r.range_error {
                return Err(self.record(ParseError::OverflowError));
            }
            Ok(r.value)
        } else {
            let Ok(s) = std::str::from_utf8(field) else {
                return Err(self.record(ParseError::ConversionError));
            };
            let trimmed = s.trim_start();
            match trimmed.parse::<f64>() {
                Ok(v) => {
                    if v.is_infinite() && trimmed.bytes().any(|b| b.is_ascii_digit()) {
                        Err(self.record(ParseError::OverflowError))
                    } else {
                        Ok(v)
                    }
                }
                Err(_) => Err(self.record(ParseError::ConversionError)),
            }
        }
    }
}
