use crate::convert::Converters;
use crate::error::{Error, ErrorKind};
use crate::matcher::{self, Line, Tail};
use crate::reader::Reader;
use crate::source::Source;
use crate::table::TableBuilder;
use crate::value::Table;

/// Knobs for [`parse_with`].
///
/// ```
/// use toml_scribe::ParseOptions;
///
/// let options = ParseOptions {
///     attach_comments: true,
///     ..ParseOptions::default()
/// };
/// let table = toml_scribe::parse_with("# servers\n[server]\nport = 80\n", &options)?;
/// assert_eq!(table["server"].as_table().and_then(|t| t.comment()), Some(" servers"));
/// # Ok::<(), toml_scribe::Error>(())
/// ```
#[derive(Debug)]
pub struct ParseOptions {
    /// Buffer full-line comments and attach them to the table the next
    /// header defines. Off by default.
    pub attach_comments: bool,
    /// Reject U+FFFD wherever other invalid characters are rejected. On by
    /// default, since a replacement character usually means the input was
    /// decoded lossily.
    pub check_replacement_character: bool,
    /// Hooks for integer, float, and datetime conversion.
    pub converters: Converters,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            attach_comments: false,
            check_replacement_character: true,
            converters: Converters::default(),
        }
    }
}

/// Parses a TOML document with the default [`ParseOptions`].
///
/// ```
/// let table = toml_scribe::parse("title = \"example\"\n[owner]\nname = \"tom\"\n")?;
/// assert_eq!(table["title"].as_str(), Some("example"));
/// assert_eq!(table["owner"]["name"].as_str(), Some("tom"));
/// # Ok::<(), toml_scribe::Error>(())
/// ```
pub fn parse(text: &str) -> Result<Table, Error> {
    parse_with(text, &ParseOptions::default())
}

/// Parses a TOML document.
///
/// The document is processed line by line; a final newline is not required.
/// An entirely empty line ends the document early, so anything after it is
/// ignored — lines of only spaces or tabs do not. Errors carry the 1-based
/// row and column of the offending byte.
pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Table, Error> {
    let mut source = Source::new(text);
    let mut builder = TableBuilder::new(options.attach_comments);
    loop {
        let line = source.line();
        // An empty line is an end marker, not a separator. Whitespace-only
        // lines fall through to `Line::Blank` below and keep going.
        if line.is_empty() {
            break;
        }
        match matcher::classify(line) {
            Line::Blank => builder.clear_comments(),
            Line::Comment { offset, text } => {
                check_comment_text(&source, options, offset, text)?;
                builder.add_comment(text);
            }
            Line::Table { offset } => {
                let header = matcher::match_table_header(line, offset)
                    .map_err(|e| escape_error(&source, e))?;
                let Some((path, end)) = header else {
                    return Err(syntax_error(&source, offset));
                };
                check_tail(&source, options, end)?;
                if let Err(kind) = builder.switch_table(path) {
                    return Err(kind.at(source.pos(offset)));
                }
            }
            Line::ArrayOfTables { offset } => {
                let header = matcher::match_array_header(line, offset)
                    .map_err(|e| escape_error(&source, e))?;
                let Some((path, end)) = header else {
                    return Err(syntax_error(&source, offset));
                };
                check_tail(&source, options, end)?;
                if let Err(kind) = builder.switch_array_of_tables(path) {
                    return Err(kind.at(source.pos(offset)));
                }
            }
            Line::Statement { offset } => {
                let key = matcher::match_statement_key(line, offset)
                    .map_err(|e| escape_error(&source, e))?;
                let Some((path, value_offset)) = key else {
                    return Err(syntax_error(&source, offset));
                };
                let key_pos = source.pos(offset);
                let mut reader = Reader {
                    source: &mut source,
                    options,
                };
                let Some((value, end)) = reader.try_read(value_offset, 0)? else {
                    return Err(syntax_error(&source, value_offset));
                };
                // The value may have consumed lines; the tail check applies
                // to whichever line it ended on.
                check_tail(&source, options, end)?;
                if let Err(kind) = builder.set(path, value) {
                    return Err(kind.at(key_pos));
                }
            }
        }
        if !source.advance() {
            break;
        }
    }
    Ok(builder.into_table())
}

fn syntax_error(source: &Source, offset: usize) -> Error {
    Error {
        kind: ErrorKind::Syntax,
        pos: Some(source.pos(offset)),
    }
}

fn escape_error(source: &Source, escape: matcher::KeyEscape) -> Error {
    Error {
        kind: ErrorKind::InvalidEscapeCodes(escape.code),
        pos: Some(source.pos(escape.offset)),
    }
}

fn check_comment_text(
    source: &Source,
    options: &ParseOptions,
    offset: usize,
    text: &str,
) -> Result<(), Error> {
    if let Some((i, c)) = matcher::find_invalid_char(text, options.check_replacement_character) {
        return Err(Error {
            kind: ErrorKind::InvalidCharacter(c),
            pos: Some(source.pos(offset + i)),
        });
    }
    Ok(())
}

fn check_tail(source: &Source, options: &ParseOptions, end: usize) -> Result<(), Error> {
    match matcher::match_tail(source.line(), end) {
        Tail::Clean => Ok(()),
        Tail::Comment { offset, text } => check_comment_text(source, options, offset, text),
        Tail::Junk { offset } => Err(syntax_error(source, offset)),
    }
}

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;
