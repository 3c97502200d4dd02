//! Byte-level matchers over single lines.
//!
//! Lines never contain `\n`; a trailing `\r` is treated as line end by the
//! blank and tail matchers. All offsets are byte offsets into the line.

/// Bytes allowed in a bare key: `A-Za-z0-9_-`.
pub(crate) fn is_bare_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Skips spaces and tabs, returning the offset of the next other byte.
pub(crate) fn skip_ws(line: &str, offset: usize) -> usize {
    let bytes = line.as_bytes();
    let mut i = offset;
    while matches!(bytes.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    i
}

/// What a line is, judging by its first non-whitespace bytes.
pub(crate) enum Line<'a> {
    Blank,
    /// Offsets point at the byte after `#`.
    Comment { offset: usize, text: &'a str },
    /// Offset points at `[`.
    Table { offset: usize },
    /// Offset points at the first `[`.
    ArrayOfTables { offset: usize },
    /// Offset points at the first byte of the key.
    Statement { offset: usize },
}

pub(crate) fn classify(line: &str) -> Line<'_> {
    let offset = skip_ws(line, 0);
    let rest = &line[offset..];
    if rest.is_empty() || rest == "\r" {
        Line::Blank
    } else if rest.starts_with("[[") {
        Line::ArrayOfTables { offset }
    } else if rest.starts_with('[') {
        Line::Table { offset }
    } else if rest.starts_with('#') {
        Line::Comment {
            offset: offset + 1,
            text: strip_cr(&line[offset + 1..]),
        }
    } else {
        Line::Statement { offset }
    }
}

fn strip_cr(text: &str) -> &str {
    text.strip_suffix('\r').unwrap_or(text)
}

/// The remainder of a line after a completed statement or header.
pub(crate) enum Tail<'a> {
    Clean,
    /// Offset points at the byte after `#`.
    Comment { offset: usize, text: &'a str },
    /// Offset points at the first unexpected byte.
    Junk { offset: usize },
}

pub(crate) fn match_tail(line: &str, offset: usize) -> Tail<'_> {
    let i = skip_ws(line, offset);
    let rest = &line[i..];
    if rest.is_empty() || rest == "\r" {
        Tail::Clean
    } else if rest.starts_with('#') {
        Tail::Comment {
            offset: i + 1,
            text: strip_cr(&line[i + 1..]),
        }
    } else {
        Tail::Junk { offset: i }
    }
}

/// Finds the first disallowed character in `text`: controls other than tab
/// and carriage return, delete, and optionally U+FFFD. Returns its byte
/// offset within `text`.
pub(crate) fn find_invalid_char(text: &str, check_replacement: bool) -> Option<(usize, char)> {
    for (i, c) in text.char_indices() {
        let invalid = match c {
            '\t' | '\r' => false,
            c if (c as u32) < 0x20 => true,
            '\u{7f}' => true,
            '\u{fffd}' => check_replacement,
            _ => false,
        };
        if invalid {
            return Some((i, c));
        }
    }
    None
}

/// A bad escape in a quoted key segment. `offset` is the byte offset of the
/// backslash within the line.
#[derive(Debug)]
pub(crate) struct KeyEscape {
    pub code: String,
    pub offset: usize,
}

/// Matches a dotted key and the `=` after it, returning the key path and the
/// offset of the first byte of the value.
pub(crate) fn match_statement_key(
    line: &str,
    offset: usize,
) -> Result<Option<(Vec<String>, usize)>, KeyEscape> {
    let Some((path, end)) = match_dotted_key(line, offset)? else {
        return Ok(None);
    };
    if line.as_bytes().get(end) == Some(&b'=') {
        Ok(Some((path, skip_ws(line, end + 1))))
    } else {
        Ok(None)
    }
}

/// Matches the inside of a `[table]` header. `offset` points at `[`; the
/// returned offset is past `]`.
pub(crate) fn match_table_header(
    line: &str,
    offset: usize,
) -> Result<Option<(Vec<String>, usize)>, KeyEscape> {
    let Some((path, end)) = match_dotted_key(line, offset + 1)? else {
        return Ok(None);
    };
    if line.as_bytes().get(end) == Some(&b']') {
        Ok(Some((path, end + 1)))
    } else {
        Ok(None)
    }
}

/// Matches the inside of a `[[table]]` header. `offset` points at the first
/// `[`; the returned offset is past `]]`.
pub(crate) fn match_array_header(
    line: &str,
    offset: usize,
) -> Result<Option<(Vec<String>, usize)>, KeyEscape> {
    let Some((path, end)) = match_dotted_key(line, offset + 2)? else {
        return Ok(None);
    };
    if line[end..].starts_with("]]") {
        Ok(Some((path, end + 2)))
    } else {
        Ok(None)
    }
}

/// Matches `seg ( ws* . ws* seg )*` with whitespace skipped on both sides.
/// Segments are bare keys or single-line quoted strings; basic-quoted
/// segments get their escapes resolved. The returned offset is past the
/// trailing whitespace.
pub(crate) fn match_dotted_key(
    line: &str,
    offset: usize,
) -> Result<Option<(Vec<String>, usize)>, KeyEscape> {
    let mut path = Vec::new();
    let mut i = skip_ws(line, offset);
    loop {
        let Some((segment, end)) = match_key_segment(line, i)? else {
            return Ok(None);
        };
        path.push(segment);
        let after = skip_ws(line, end);
        if line.as_bytes().get(after) == Some(&b'.') {
            i = skip_ws(line, after + 1);
        } else {
            return Ok(Some((path, after)));
        }
    }
}

fn match_key_segment(line: &str, offset: usize) -> Result<Option<(String, usize)>, KeyEscape> {
    let bytes = line.as_bytes();
    match bytes.get(offset) {
        None => Ok(None),
        Some(b'\'') => {
            let Some(close) = line[offset + 1..].find('\'') else {
                return Ok(None);
            };
            let end = offset + 1 + close;
            Ok(Some((line[offset + 1..end].to_owned(), end + 1)))
        }
        Some(b'"') => {
            let mut i = offset + 1;
            loop {
                match bytes.get(i) {
                    None => return Ok(None),
                    Some(b'"') => break,
                    Some(b'\\') => i += 2,
                    Some(..) => i += 1,
                }
            }
            let raw = &line[offset + 1..i];
            match unescape(raw) {
                Ok(segment) => Ok(Some((segment, i + 1))),
                Err((code, backslash)) => Err(KeyEscape {
                    code,
                    offset: offset + 1 + backslash,
                }),
            }
        }
        Some(..) => {
            let mut end = offset;
            while matches!(bytes.get(end), Some(&b) if is_bare_key_byte(b)) {
                end += 1;
            }
            if end == offset {
                Ok(None)
            } else {
                Ok(Some((line[offset..end].to_owned(), end)))
            }
        }
    }
}

/// Resolves backslash escapes. On failure returns the offending escape text
/// and the byte offset of its backslash within `raw`.
pub(crate) fn unescape(raw: &str) -> Result<String, (String, usize)> {
    if !raw.contains('\\') {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let Some(backslash) = raw[i..].find('\\').map(|p| i + p) else {
            out.push_str(&raw[i..]);
            break;
        };
        out.push_str(&raw[i..backslash]);
        let code = match raw[backslash + 1..].chars().next() {
            None => return Err(escape_code(raw, backslash, backslash + 1)),
            Some(c) => c,
        };
        match code {
            'b' => out.push('\u{8}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{c}'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'u' => out.push(hex_escape(raw, backslash, 4)?),
            'U' => out.push(hex_escape(raw, backslash, 8)?),
            other => {
                return Err(escape_code(raw, backslash, backslash + 1 + other.len_utf8()));
            }
        }
        i = match code {
            'u' => backslash + 6,
            'U' => backslash + 10,
            _ => backslash + 2,
        };
    }
    Ok(out)
}

/// `\uXXXX` or `\UXXXXXXXX`; rejects surrogates and values past the Unicode
/// scalar range.
fn hex_escape(raw: &str, backslash: usize, len: usize) -> Result<char, (String, usize)> {
    let start = backslash + 2;
    match raw.get(start..start + len) {
        Some(d) if d.bytes().all(|b| b.is_ascii_hexdigit()) => {
            match u32::from_str_radix(d, 16).ok().and_then(char::from_u32) {
                Some(c) => Ok(c),
                None => Err(escape_code(raw, backslash, start + len)),
            }
        }
        _ => Err(escape_code(raw, backslash, start)),
    }
}

fn escape_code(raw: &str, backslash: usize, end: usize) -> (String, usize) {
    (raw[backslash..end.min(raw.len())].to_owned(), backslash)
}

/// True when a scalar can end at `i`: end of line or a byte that cannot
/// continue a keylike token. Rejecting `.` here makes trailing garbage like
/// `1.2.3` fail the whole dispatch instead of matching a prefix.
fn at_value_boundary(bytes: &[u8], i: usize) -> bool {
    match bytes.get(i) {
        None => true,
        Some(&b) => !is_bare_key_byte(b) && b != b'.',
    }
}

pub(crate) fn match_boolean(line: &str, offset: usize) -> Option<(bool, usize)> {
    for (text, value) in [("true", true), ("false", false)] {
        if line[offset..].starts_with(text) {
            let end = offset + text.len();
            if at_value_boundary(line.as_bytes(), end) {
                return Some((value, end));
            }
        }
    }
    None
}

pub(crate) enum FloatMatch<'a> {
    /// A decimal number that committed to float by a fraction or exponent.
    /// The lexeme keeps its sign and underscores.
    Number(&'a str),
    Infinity { negative: bool },
    Nan,
}

pub(crate) fn match_float(line: &str, offset: usize) -> Option<(FloatMatch<'_>, usize)> {
    let bytes = line.as_bytes();
    let mut i = offset;
    let mut negative = false;
    match bytes.get(i) {
        Some(b'+') => i += 1,
        Some(b'-') => {
            negative = true;
            i += 1;
        }
        _ => {}
    }
    for (text, matched) in [
        ("inf", FloatMatch::Infinity { negative }),
        ("nan", FloatMatch::Nan),
    ] {
        if line[i..].starts_with(text) && at_value_boundary(bytes, i + 3) {
            return Some((matched, i + 3));
        }
    }
    let mut end = match_dec_int(bytes, i)?;
    let mut committed = false;
    if bytes.get(end) == Some(&b'.') {
        if let Some(frac_end) = match_digits(bytes, end + 1, |b| b.is_ascii_digit()) {
            end = frac_end;
            committed = true;
        }
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut j = end + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if let Some(exp_end) = match_digits(bytes, j, |b| b.is_ascii_digit()) {
            end = exp_end;
            committed = true;
        }
    }
    if !committed || !at_value_boundary(bytes, end) {
        return None;
    }
    Some((FloatMatch::Number(&line[offset..end]), end))
}

pub(crate) struct IntegerMatch<'a> {
    /// Digit run without sign or radix prefix, underscores included.
    pub digits: &'a str,
    pub negative: bool,
    pub radix: u32,
}

pub(crate) fn match_integer(line: &str, offset: usize) -> Option<(IntegerMatch<'_>, usize)> {
    let bytes = line.as_bytes();
    let mut i = offset;
    let mut negative = false;
    match bytes.get(i) {
        Some(b'+') => i += 1,
        Some(b'-') => {
            negative = true;
            i += 1;
        }
        _ => {}
    }
    // Radix prefixes take no sign.
    if i == offset && bytes.get(i) == Some(&b'0') {
        let radix = match bytes.get(i + 1) {
            Some(b'x') => Some(16),
            Some(b'o') => Some(8),
            Some(b'b') => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            let valid: fn(u8) -> bool = match radix {
                16 => |b| b.is_ascii_hexdigit(),
                8 => |b| (b'0'..=b'7').contains(&b),
                _ => |b| b == b'0' || b == b'1',
            };
            let end = match_digits(bytes, i + 2, valid)?;
            if !at_value_boundary(bytes, end) {
                return None;
            }
            let matched = IntegerMatch {
                digits: &line[i + 2..end],
                negative: false,
                radix,
            };
            return Some((matched, end));
        }
    }
    let end = match_dec_int(bytes, i)?;
    if !at_value_boundary(bytes, end) {
        return None;
    }
    let matched = IntegerMatch {
        digits: &line[i..end],
        negative,
        radix: 10,
    };
    Some((matched, end))
}

/// `0`, or a nonzero digit followed by underscore-separated digits. A zero
/// directly followed by another digit fails the boundary check in the caller.
fn match_dec_int(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes.get(i) {
        Some(b'0') => Some(i + 1),
        Some(b'1'..=b'9') => match_digits(bytes, i, |b| b.is_ascii_digit()),
        _ => None,
    }
}

/// `digit ( _? digit )*` in the given digit set.
fn match_digits(bytes: &[u8], start: usize, valid: impl Fn(u8) -> bool) -> Option<usize> {
    let mut i = start;
    if !matches!(bytes.get(i), Some(&b) if valid(b)) {
        return None;
    }
    i += 1;
    loop {
        match bytes.get(i) {
            Some(&b) if valid(b) => i += 1,
            Some(b'_') if matches!(bytes.get(i + 1), Some(&b) if valid(b)) => i += 2,
            _ => return Some(i),
        }
    }
}

pub(crate) struct DatetimeMatch<'a> {
    /// The full matched text, for error messages.
    pub lexeme: &'a str,
    pub date: Option<&'a str>,
    pub time: Option<&'a str>,
    pub offset: Option<&'a str>,
}

pub(crate) fn match_datetime(line: &str, offset: usize) -> Option<(DatetimeMatch<'_>, usize)> {
    let bytes = line.as_bytes();
    if let Some(date_end) = match_full_date(bytes, offset) {
        let date = &line[offset..date_end];
        let time_start = match bytes.get(date_end) {
            Some(b'T' | b't') => Some(date_end + 1),
            // A space separator only counts when a time follows.
            Some(b' ') if matches!(bytes.get(date_end + 1), Some(b) if b.is_ascii_digit()) => {
                Some(date_end + 1)
            }
            _ => None,
        };
        if let Some(time_start) = time_start {
            if let Some(time_end) = match_partial_time(bytes, time_start) {
                let (off, end) = match match_time_offset(bytes, time_end) {
                    Some(off_end) => (Some(&line[time_end..off_end]), off_end),
                    None => (None, time_end),
                };
                if !at_value_boundary(bytes, end) {
                    return None;
                }
                let matched = DatetimeMatch {
                    lexeme: &line[offset..end],
                    date: Some(date),
                    time: Some(&line[time_start..time_end]),
                    offset: off,
                };
                return Some((matched, end));
            }
        }
        if !at_value_boundary(bytes, date_end) {
            return None;
        }
        let matched = DatetimeMatch {
            lexeme: date,
            date: Some(date),
            time: None,
            offset: None,
        };
        return Some((matched, date_end));
    }
    let time_end = match_partial_time(bytes, offset)?;
    if !at_value_boundary(bytes, time_end) {
        return None;
    }
    let matched = DatetimeMatch {
        lexeme: &line[offset..time_end],
        date: None,
        time: Some(&line[offset..time_end]),
        offset: None,
    };
    Some((matched, time_end))
}

fn match_full_date(bytes: &[u8], i: usize) -> Option<usize> {
    if digits_at(bytes, i, 4)
        && bytes.get(i + 4) == Some(&b'-')
        && digits_at(bytes, i + 5, 2)
        && bytes.get(i + 7) == Some(&b'-')
        && digits_at(bytes, i + 8, 2)
    {
        Some(i + 10)
    } else {
        None
    }
}

/// `hh:mm:ss` with an optional `.` fraction. Seconds are required.
fn match_partial_time(bytes: &[u8], i: usize) -> Option<usize> {
    if !(digits_at(bytes, i, 2)
        && bytes.get(i + 2) == Some(&b':')
        && digits_at(bytes, i + 3, 2)
        && bytes.get(i + 5) == Some(&b':')
        && digits_at(bytes, i + 6, 2))
    {
        return None;
    }
    let mut end = i + 8;
    if bytes.get(end) == Some(&b'.') && matches!(bytes.get(end + 1), Some(b) if b.is_ascii_digit())
    {
        end += 1;
        while matches!(bytes.get(end), Some(b) if b.is_ascii_digit()) {
            end += 1;
        }
    }
    Some(end)
}

fn match_time_offset(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes.get(i) {
        Some(b'Z' | b'z') => Some(i + 1),
        Some(b'+' | b'-')
            if digits_at(bytes, i + 1, 2)
                && bytes.get(i + 3) == Some(&b':')
                && digits_at(bytes, i + 4, 2) =>
        {
            Some(i + 5)
        }
        _ => None,
    }
}

fn digits_at(bytes: &[u8], i: usize, n: usize) -> bool {
    bytes.len() >= i + n && bytes[i..i + n].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
#[path = "./matcher_tests.rs"]
mod tests;
