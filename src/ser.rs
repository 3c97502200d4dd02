//! Serialization back to TOML text.
//!
//! Output is organized the way documents are usually written by hand:
//! plain values first, then one `[section]` per nested table and one
//! `[[section]]` per element of an array of tables. Sections follow each
//! other directly — the parser reads a fully blank line as the end of the
//! document, so none are ever written. Arrays directly under a key are
//! laid out one element per line; anything nested deeper stays on one
//! line.

use crate::convert::{
    ConvertError, Converters, DefaultDatetimeConverter, DefaultFloatConverter,
    DefaultIntegerConverter, FloatConverter, IntegerConverter,
};
use crate::convert::DatetimeConverter;
use crate::error::{Error, ErrorKind};
use crate::matcher::is_bare_key_byte;
use crate::value::{Table, Value};

/// Knobs for [`stringify_with`].
#[derive(Debug)]
pub struct StringifyOptions {
    /// Line terminator, `"\n"` by default.
    pub newline: String,
    /// Quote to prefer for strings that can be written either way: `'\''`
    /// (the default) or `'"'`.
    pub prefer_quote: char,
    /// Escape newlines instead of switching to a multi-line string.
    pub prefer_one_line_string: bool,
    /// Escape tabs in basic strings instead of writing them raw.
    pub escape_tab_char: bool,
    /// Hooks for integer, float, and datetime formatting.
    pub converters: Converters,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        StringifyOptions {
            newline: "\n".to_owned(),
            prefer_quote: '\'',
            prefer_one_line_string: false,
            escape_tab_char: false,
            converters: Converters::default(),
        }
    }
}

/// Serializes a table with the default [`StringifyOptions`].
///
/// ```
/// let table = toml_scribe::parse("[server]\nhost = 'db1'\nport = 80\n")?;
/// assert_eq!(toml_scribe::stringify(&table)?, "[server]\nhost = 'db1'\nport = 80\n");
/// # Ok::<(), toml_scribe::Error>(())
/// ```
pub fn stringify(table: &Table) -> Result<String, Error> {
    stringify_with(table, &StringifyOptions::default())
}

/// Serializes a table to TOML text.
pub fn stringify_with(table: &Table, options: &StringifyOptions) -> Result<String, Error> {
    let mut ser = Serializer {
        out: String::new(),
        options,
    };
    ser.section(table, &mut Vec::new())?;
    Ok(ser.out)
}

struct Serializer<'a> {
    out: String,
    options: &'a StringifyOptions,
}

impl Serializer<'_> {
    fn newline(&mut self) {
        self.out.push_str(&self.options.newline);
    }

    /// Emits the plain entries of `table`, then one section per nested
    /// table and array of tables. `path` holds the key segments leading
    /// here; the header has already been written.
    fn section(&mut self, table: &Table, path: &mut Vec<String>) -> Result<(), Error> {
        for (key, value) in table.iter() {
            if is_section(value) {
                continue;
            }
            self.key(key);
            self.out.push_str(" = ");
            self.value(value, false)?;
            self.newline();
        }
        for (key, value) in table.iter() {
            match value {
                Value::Table(child) => {
                    path.push(key.clone());
                    self.table_section(child, path)?;
                    path.pop();
                }
                Value::Array(elements) if is_table_array(elements) => {
                    path.push(key.clone());
                    for element in elements {
                        if let Value::Table(child) = element {
                            self.header(path, true);
                            self.section(child, path)?;
                        }
                    }
                    path.pop();
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// A table holding nothing but further sections contributes no lines
    /// of its own, so its header is skipped.
    fn table_section(&mut self, table: &Table, path: &mut Vec<String>) -> Result<(), Error> {
        let only_sections = !table.is_empty() && table.values().all(is_section);
        if !only_sections {
            self.header(path, false);
        }
        self.section(table, path)
    }

    fn header(&mut self, path: &[String], array: bool) {
        self.out.push_str(if array { "[[" } else { "[" });
        for (i, segment) in path.iter().enumerate() {
            if i > 0 {
                self.out.push('.');
            }
            self.key(segment);
        }
        self.out.push_str(if array { "]]" } else { "]" });
        self.newline();
    }

    fn key(&mut self, key: &str) {
        if !key.is_empty() && key.bytes().all(is_bare_key_byte) {
            self.out.push_str(key);
        } else if self.options.prefer_quote == '\'' && fits_literal(key, true) {
            self.out.push('\'');
            self.out.push_str(key);
            self.out.push('\'');
        } else {
            self.basic_string(key, true);
        }
    }

    /// `nested` selects the one-line layout for arrays and renders tables
    /// inline.
    fn value(&mut self, value: &Value, nested: bool) -> Result<(), Error> {
        let converters = &self.options.converters;
        if converters.integer.matches(value) {
            let text = converters.integer.format(value).map_err(convert_err)?;
            self.out.push_str(&text);
            return Ok(());
        }
        if converters.float.matches(value) {
            let text = converters.float.format(value).map_err(convert_err)?;
            self.out.push_str(&text);
            return Ok(());
        }
        if converters.datetime.matches(value) {
            let text = converters.datetime.format(value).map_err(convert_err)?;
            self.out.push_str(&text);
            return Ok(());
        }
        match value {
            Value::String(s) => self.string(s),
            Value::Boolean(true) => self.out.push_str("true"),
            Value::Boolean(false) => self.out.push_str("false"),
            Value::Array(elements) => self.array(elements, nested)?,
            Value::Table(table) => self.inline_table(table)?,
            // A replaced converter opted out of these; fall back to the
            // stock formatting.
            Value::Integer(..) | Value::BigInt(..) => {
                let text = DefaultIntegerConverter.format(value).map_err(convert_err)?;
                self.out.push_str(&text);
            }
            Value::Float(..) => {
                let text = DefaultFloatConverter.format(value).map_err(convert_err)?;
                self.out.push_str(&text);
            }
            Value::Datetime(..) => {
                let text = DefaultDatetimeConverter.format(value).map_err(convert_err)?;
                self.out.push_str(&text);
            }
        }
        Ok(())
    }

    fn array(&mut self, elements: &[Value], nested: bool) -> Result<(), Error> {
        if elements.is_empty() {
            self.out.push_str("[]");
            return Ok(());
        }
        if nested {
            self.out.push('[');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.value(element, true)?;
            }
            self.out.push(']');
        } else {
            self.out.push('[');
            self.newline();
            for (i, element) in elements.iter().enumerate() {
                self.out.push_str("  ");
                self.value(element, true)?;
                if i + 1 < elements.len() {
                    self.out.push(',');
                }
                self.newline();
            }
            self.out.push(']');
        }
        Ok(())
    }

    fn inline_table(&mut self, table: &Table) -> Result<(), Error> {
        if table.is_empty() {
            self.out.push_str("{}");
            return Ok(());
        }
        self.out.push_str("{ ");
        for (i, (key, value)) in table.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.key(key);
            self.out.push_str(" = ");
            self.value(value, true)?;
        }
        self.out.push_str(" }");
        Ok(())
    }

    fn string(&mut self, s: &str) {
        if s.contains('\n') && !self.options.prefer_one_line_string {
            if self.options.prefer_quote == '\'' && fits_multiline_literal(s) {
                self.multiline_literal(s);
            } else {
                self.multiline_basic(s);
            }
            return;
        }
        if self.options.prefer_quote == '\'' && fits_literal(s, self.options.escape_tab_char) {
            self.out.push('\'');
            self.out.push_str(s);
            self.out.push('\'');
        } else {
            self.basic_string(s, self.options.escape_tab_char);
        }
    }

    fn basic_string(&mut self, s: &str, escape_tab: bool) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '\u{8}' => self.out.push_str("\\b"),
                '\t' if escape_tab => self.out.push_str("\\t"),
                '\t' => self.out.push('\t'),
                '\n' => self.out.push_str("\\n"),
                '\u{c}' => self.out.push_str("\\f"),
                '\r' => self.out.push_str("\\r"),
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                c if (c as u32) < 0x20 || c == '\u{7f}' => {
                    self.push_unicode_escape(c);
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    /// Newlines inside the string are written verbatim so the value reads
    /// back exactly; `options.newline` only shapes the frame around it.
    fn multiline_literal(&mut self, s: &str) {
        self.out.push_str("'''");
        self.newline();
        self.out.push_str(s);
        self.out.push_str("'''");
    }

    fn multiline_basic(&mut self, s: &str) {
        self.out.push_str("\"\"\"");
        self.newline();
        let mut quotes = 0;
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '"' {
                quotes += 1;
                // Break up any run of three quotes.
                if quotes == 3 {
                    self.out.push_str("\\\"");
                    quotes = 0;
                } else {
                    self.out.push('"');
                }
                continue;
            }
            quotes = 0;
            match c {
                '\u{8}' => self.out.push_str("\\b"),
                '\t' if self.options.escape_tab_char => self.out.push_str("\\t"),
                '\t' => self.out.push('\t'),
                // Newlines stay verbatim; a CR survives only as part of a
                // CRLF pair.
                '\n' => self.out.push('\n'),
                '\r' if chars.peek() == Some(&'\n') => self.out.push('\r'),
                '\r' => self.out.push_str("\\r"),
                '\u{c}' => self.out.push_str("\\f"),
                '\\' => self.out.push_str("\\\\"),
                c if (c as u32) < 0x20 || c == '\u{7f}' => {
                    self.push_unicode_escape(c);
                }
                c => self.out.push(c),
            }
        }
        self.out.push_str("\"\"\"");
    }

    fn push_unicode_escape(&mut self, c: char) {
        let code = c as u32;
        self.out.push_str("\\u");
        for shift in [12, 8, 4, 0] {
            let digit = (code >> shift) & 0xF;
            self.out.push(char::from_digit(digit, 16).map_or('0', |d| d.to_ascii_uppercase()));
        }
    }
}

/// Tables and arrays whose elements are all tables become sections rather
/// than `key = value` entries.
fn is_section(value: &Value) -> bool {
    match value {
        Value::Table(..) => true,
        Value::Array(elements) => is_table_array(elements),
        _ => false,
    }
}

fn is_table_array(elements: &[Value]) -> bool {
    !elements.is_empty() && elements.iter().all(|v| matches!(v, Value::Table(..)))
}

fn fits_literal(s: &str, escape_tab: bool) -> bool {
    s.chars().all(|c| match c {
        '\'' => false,
        '\t' => !escape_tab,
        c => (c as u32) >= 0x20 && c != '\u{7f}',
    })
}

fn fits_multiline_literal(s: &str) -> bool {
    !s.contains("'''")
        && s.chars().all(|c| match c {
            '\n' => true,
            '\t' => true,
            c => (c as u32) >= 0x20 && c != '\u{7f}',
        })
        && !s.ends_with('\'')
}

fn convert_err(e: ConvertError) -> Error {
    Error {
        kind: ErrorKind::InvalidValue(e.into_message()),
        pos: None,
    }
}

#[cfg(test)]
#[path = "./ser_tests.rs"]
mod tests;
