//! Value readers: trial dispatch over the scalar matchers plus the
//! container and string readers that may consume further lines.

use crate::DatetimeKind;
use crate::error::{Error, ErrorKind};
use crate::matcher::{self, FloatMatch};
use crate::parser::ParseOptions;
use crate::source::Source;
use crate::table::TableBuilder;
use crate::value::Value;

/// Arrays and inline tables deeper than this are rejected instead of
/// overflowing the stack.
const MAX_NESTING: u32 = 128;

pub(crate) struct Reader<'a, 'src> {
    pub(crate) source: &'a mut Source<'src>,
    pub(crate) options: &'a ParseOptions,
}

impl Reader<'_, '_> {
    fn error(&self, kind: ErrorKind, offset: usize) -> Error {
        Error {
            kind,
            pos: Some(self.source.pos(offset)),
        }
    }

    fn check_text(&self, text: &str, base: usize) -> Result<(), Error> {
        let strict = self.options.check_replacement_character;
        if let Some((i, c)) = matcher::find_invalid_char(text, strict) {
            return Err(self.error(ErrorKind::InvalidCharacter(c), base + i));
        }
        Ok(())
    }

    /// Tries to read one value at `offset` on the current line. Returns
    /// `None` when nothing matches; the caller decides what that means.
    /// Multi-line strings and arrays advance the source, so the returned
    /// offset is relative to the line the value ended on.
    pub(crate) fn try_read(
        &mut self,
        offset: usize,
        depth: u32,
    ) -> Result<Option<(Value, usize)>, Error> {
        let line = self.source.line();
        if let Some((b, end)) = matcher::match_boolean(line, offset) {
            return Ok(Some((Value::Boolean(b), end)));
        }
        if let Some((m, end)) = matcher::match_datetime(line, offset) {
            let kind = match (m.date, m.time, m.offset) {
                (Some(..), Some(..), Some(..)) => DatetimeKind::OffsetDatetime,
                (Some(..), Some(..), None) => DatetimeKind::LocalDatetime,
                (Some(..), None, _) => DatetimeKind::LocalDate,
                (None, ..) => DatetimeKind::LocalTime,
            };
            // An hour of 24 rolls over to the next day in some date
            // backends, so it never reaches the converter.
            if let (Some(..), Some(time)) = (m.date, m.time) {
                if &time[..2] > "23" {
                    let message = format!("Invalid datetime {} in TOML", m.lexeme);
                    return Err(self.error(ErrorKind::InvalidValue(message), offset));
                }
            }
            let value = self
                .options
                .converters
                .datetime
                .parse(m.lexeme, kind)
                .map_err(|e| self.error(ErrorKind::InvalidValue(e.into_message()), offset))?;
            return Ok(Some((value, end)));
        }
        if let Some((m, end)) = matcher::match_float(line, offset) {
            let value = match m {
                FloatMatch::Number(lexeme) => self
                    .options
                    .converters
                    .float
                    .parse(&lexeme.replace('_', ""))
                    .map_err(|e| self.error(ErrorKind::InvalidValue(e.into_message()), offset))?,
                FloatMatch::Infinity { negative: true } => Value::Float(f64::NEG_INFINITY),
                FloatMatch::Infinity { negative: false } => Value::Float(f64::INFINITY),
                FloatMatch::Nan => Value::Float(f64::NAN),
            };
            return Ok(Some((value, end)));
        }
        if let Some((m, end)) = matcher::match_integer(line, offset) {
            let digits = m.digits.replace('_', "");
            let value = self
                .options
                .converters
                .integer
                .parse(&digits, m.negative, m.radix)
                .map_err(|e| self.error(ErrorKind::InvalidValue(e.into_message()), offset))?;
            return Ok(Some((value, end)));
        }
        match line.as_bytes().get(offset) {
            Some(b'\'' | b'"') => self.read_string(offset),
            Some(b'[') => self.read_array(offset, depth).map(Some),
            Some(b'{') => self.read_inline_table(offset, depth).map(Some),
            _ => Ok(None),
        }
    }

    fn read_string(&mut self, offset: usize) -> Result<Option<(Value, usize)>, Error> {
        let line = self.source.line();
        if line[offset..].starts_with("'''") {
            return self.read_multiline_literal(offset + 3).map(Some);
        }
        if line[offset..].starts_with("\"\"\"") {
            return self.read_multiline_basic(offset + 3).map(Some);
        }
        match line.as_bytes()[offset] {
            b'\'' => self.read_single_literal(offset),
            _ => self.read_single_basic(offset),
        }
    }

    /// `'...'` on one line. An unterminated string is a non-match, the
    /// dispatch failure gets reported at the value start.
    fn read_single_literal(&self, offset: usize) -> Result<Option<(Value, usize)>, Error> {
        let line = self.source.line();
        let Some(close) = line[offset + 1..].find('\'') else {
            return Ok(None);
        };
        let end = offset + 1 + close;
        let content = &line[offset + 1..end];
        self.check_text(content, offset + 1)?;
        Ok(Some((Value::String(content.to_owned()), end + 1)))
    }

    /// `"..."` on one line, escape-aware.
    fn read_single_basic(&self, offset: usize) -> Result<Option<(Value, usize)>, Error> {
        let line = self.source.line();
        let bytes = line.as_bytes();
        let mut i = offset + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'"' => {
                    let raw = &line[offset + 1..i];
                    self.check_text(raw, offset + 1)?;
                    let value = self.unescape(raw, offset + 1)?;
                    return Ok(Some((Value::String(value), i + 1)));
                }
                b'\\' => i += 2,
                _ => i += 1,
            }
        }
        Ok(None)
    }

    /// `'''...'''`, `offset` past the opening delimiter.
    fn read_multiline_literal(&mut self, mut offset: usize) -> Result<(Value, usize), Error> {
        let mut content = String::new();
        let mut first = true;
        loop {
            let line = self.source.line();
            let rest = &line[offset..];
            if let Some((content_end, after)) = find_literal_close(rest) {
                let body = &rest[..content_end];
                self.check_text(body, offset)?;
                content.push_str(body);
                return Ok((Value::String(content), offset + after));
            }
            // A newline straight after the opening delimiter is trimmed.
            if !(first && (rest.is_empty() || rest == "\r")) {
                self.check_text(rest, offset)?;
                content.push_str(rest);
                content.push('\n');
            }
            if !self.source.advance() {
                return Err(self.error(ErrorKind::Syntax, offset));
            }
            offset = 0;
            first = false;
        }
    }

    /// `"""..."""`, `offset` past the opening delimiter.
    fn read_multiline_basic(&mut self, offset: usize) -> Result<(Value, usize), Error> {
        let mut content = String::new();
        let mut first = true;
        let mut continued = false;
        let mut start = offset;
        loop {
            let line = self.source.line();
            if continued {
                // A line-ending backslash swallows whitespace, including
                // whole blank lines, up to the next content.
                start = matcher::skip_ws(line, 0);
                let rest = &line[start..];
                if rest.is_empty() || rest == "\r" {
                    if !self.source.advance() {
                        return Err(self.error(ErrorKind::Syntax, start));
                    }
                    continue;
                }
                continued = false;
            }
            let rest = &line[start..];
            match scan_basic_line(rest) {
                BasicScan::Close { content_end, after } => {
                    let raw = &rest[..content_end];
                    self.check_text(raw, start)?;
                    content.push_str(&self.unescape(raw, start)?);
                    return Ok((Value::String(content), start + after));
                }
                BasicScan::Continuation { content_end } => {
                    let raw = &rest[..content_end];
                    self.check_text(raw, start)?;
                    content.push_str(&self.unescape(raw, start)?);
                    continued = true;
                }
                BasicScan::Line => {
                    if !(first && (rest.is_empty() || rest == "\r")) {
                        self.check_text(rest, start)?;
                        content.push_str(&self.unescape(rest, start)?);
                        content.push('\n');
                    }
                }
            }
            if !self.source.advance() {
                return Err(self.error(ErrorKind::Syntax, start));
            }
            start = 0;
            first = false;
        }
    }

    /// Resolves backslash escapes. `base` is the offset of `raw` within the
    /// current line, for error positions.
    fn unescape(&self, raw: &str, base: usize) -> Result<String, Error> {
        matcher::unescape(raw).map_err(|(code, backslash)| {
            self.error(ErrorKind::InvalidEscapeCodes(code), base + backslash)
        })
    }

    /// `[ ... ]`, possibly spanning lines, with comments between elements.
    fn read_array(&mut self, offset: usize, depth: u32) -> Result<(Value, usize), Error> {
        if depth >= MAX_NESTING {
            return Err(self.error(ErrorKind::RecursionLimit, offset));
        }
        let mut values = Vec::new();
        let mut i = offset + 1;
        loop {
            // Up to the next element or the closing bracket.
            loop {
                let line = self.source.line();
                i = matcher::skip_ws(line, i);
                match line.as_bytes().get(i) {
                    Some(b']') => return Ok((Value::Array(values), i + 1)),
                    Some(b'#') => {
                        self.check_comment(line, i)?;
                        if !self.source.advance() {
                            return Err(self.error(ErrorKind::Syntax, line.len()));
                        }
                        i = 0;
                    }
                    Some(b'\r') if i + 1 == line.len() => {
                        if !self.source.advance() {
                            return Err(self.error(ErrorKind::Syntax, i));
                        }
                        i = 0;
                    }
                    None => {
                        if !self.source.advance() {
                            return Err(self.error(ErrorKind::Syntax, i));
                        }
                        i = 0;
                    }
                    Some(..) => break,
                }
            }
            let Some((value, end)) = self.try_read(i, depth + 1)? else {
                return Err(self.error(ErrorKind::Syntax, i));
            };
            values.push(value);
            i = end;
            // Separator, close, or end of line.
            let closed = loop {
                let line = self.source.line();
                i = matcher::skip_ws(line, i);
                match line.as_bytes().get(i) {
                    Some(b']') => break true,
                    Some(b',') => {
                        i += 1;
                        break false;
                    }
                    Some(b'#') => {
                        self.check_comment(line, i)?;
                        if !self.source.advance() {
                            return Err(self.error(ErrorKind::Syntax, line.len()));
                        }
                        i = 0;
                    }
                    Some(b'\r') if i + 1 == line.len() => {
                        if !self.source.advance() {
                            return Err(self.error(ErrorKind::Syntax, i));
                        }
                        i = 0;
                    }
                    None => {
                        if !self.source.advance() {
                            return Err(self.error(ErrorKind::Syntax, i));
                        }
                        i = 0;
                    }
                    Some(..) => return Err(self.error(ErrorKind::Syntax, i)),
                }
            };
            if closed {
                return Ok((Value::Array(values), i + 1));
            }
        }
    }

    fn check_comment(&self, line: &str, hash: usize) -> Result<(), Error> {
        let text = &line[hash + 1..];
        let text = text.strip_suffix('\r').unwrap_or(text);
        self.check_text(text, hash + 1)
    }

    /// `{ k = v, ... }`. The pairs go through their own builder so inline
    /// duplicate keys are caught with the same rules as top-level ones.
    /// A comma before the closing brace is rejected.
    fn read_inline_table(&mut self, offset: usize, depth: u32) -> Result<(Value, usize), Error> {
        if depth >= MAX_NESTING {
            return Err(self.error(ErrorKind::RecursionLimit, offset));
        }
        let mut builder = TableBuilder::new(false);
        let mut i = matcher::skip_ws(self.source.line(), offset + 1);
        let mut after_comma = false;
        loop {
            let key = matcher::match_statement_key(self.source.line(), i)
                .map_err(|e| self.error(ErrorKind::InvalidEscapeCodes(e.code), e.offset))?;
            match key {
                Some((path, value_offset)) => {
                    let Some((value, end)) = self.try_read(value_offset, depth + 1)? else {
                        return Err(self.error(ErrorKind::Syntax, value_offset));
                    };
                    if let Err(kind) = builder.set(path, value) {
                        return Err(self.error(kind, i));
                    }
                    i = end;
                }
                None if after_comma => return Err(self.error(ErrorKind::Syntax, i)),
                None => {}
            }
            // A multi-line string value may have moved the cursor, so the
            // separator is looked for on the line the value ended on.
            let line = self.source.line();
            i = matcher::skip_ws(line, i);
            match line.as_bytes().get(i) {
                Some(b'}') => return Ok((Value::Table(builder.into_table()), i + 1)),
                Some(b',') => {
                    i = matcher::skip_ws(line, i + 1);
                    after_comma = true;
                }
                _ => return Err(self.error(ErrorKind::Syntax, i)),
            }
        }
    }
}

/// Finds the closing `'''`, folding up to two extra quotes into the content.
/// Returns `(content_end, after_close)` relative to `text`.
fn find_literal_close(text: &str) -> Option<(usize, usize)> {
    let pos = text.find("'''")?;
    let bytes = text.as_bytes();
    let mut content_end = pos;
    let mut close = pos;
    for _ in 0..2 {
        if bytes.get(close + 3) == Some(&b'\'') {
            content_end += 1;
            close += 1;
        } else {
            break;
        }
    }
    Some((content_end, close + 3))
}

enum BasicScan {
    Close { content_end: usize, after: usize },
    /// The line ends in an unescaped backslash, trailing whitespace aside.
    Continuation { content_end: usize },
    Line,
}

/// Whether only spaces and tabs remain before the end of the line, so a
/// backslash here joins it to the next one. A `\ ` with content after it
/// stays an invalid escape.
fn ws_to_line_end(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    bytes.iter().all(|&b| b == b' ' || b == b'\t')
}

fn scan_basic_line(rest: &str) -> BasicScan {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if ws_to_line_end(&bytes[i + 1..]) {
                    return BasicScan::Continuation { content_end: i };
                }
                i += 2;
            }
            b'"' if rest[i..].starts_with("\"\"\"") => {
                let mut content_end = i;
                let mut close = i;
                for _ in 0..2 {
                    if bytes.get(close + 3) == Some(&b'"') {
                        content_end += 1;
                        close += 1;
                    } else {
                        break;
                    }
                }
                return BasicScan::Close {
                    content_end,
                    after: close + 3,
                };
            }
            _ => i += 1,
        }
    }
    BasicScan::Line
}

#[cfg(test)]
#[path = "./reader_tests.rs"]
mod tests;
