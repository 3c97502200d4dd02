use std::fmt::{self, Debug, Display};

/// A 1-based source position.
///
/// `col` is the byte offset within the line plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    /// Line number, starting at 1.
    pub line: u32,
    /// Column, starting at 1.
    pub col: u32,
}

impl Pos {
    pub(crate) fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// The scope a key-value statement was committed in, used in table errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No table header has been seen yet (or an inline table).
    Global,
    /// Inside a `[table]` with the given path.
    Table(Vec<String>),
    /// Inside the latest element of a `[[table]]` with the given path.
    ArrayOfTables(Vec<String>),
}

impl Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Table(path) => write!(f, "Table [{}]", KeyPath(path)),
            Scope::ArrayOfTables(path) => {
                write!(f, "\"Array of Tables\" [[{}]]", KeyPath(path))
            }
        }
    }
}

/// Error that can occur when parsing or serializing TOML.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The error kind.
    pub kind: ErrorKind,
    /// Source position, only available for errors coming from the parser.
    pub pos: Option<Pos>,
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, pos: None }
    }
}

/// Errors that can occur when parsing or serializing a document.
#[derive(Clone, PartialEq)]
pub enum ErrorKind {
    /// The line doesn't match any grammar production at the current offset.
    Syntax,

    /// A disallowed control character (or U+FFFD in strict mode) was found.
    InvalidCharacter(char),

    /// An unknown escape, or a `\u`/`\U` value outside the Unicode scalar range.
    InvalidEscapeCodes(String),

    /// A lexically well-formed value was rejected by a converter.
    InvalidValue(String),

    /// Value nesting exceeded the supported depth.
    RecursionLimit,

    /// The final key of a key-value statement already exists.
    DuplicateKey {
        /// The full dotted key of the statement.
        path: Vec<String>,
        /// The scope the statement appeared in.
        scope: Scope,
    },

    /// A `[table]` name was already defined.
    DuplicateTable {
        /// The header path.
        path: Vec<String>,
    },

    /// A `[table]` name is occupied by an array.
    TableIsArrayOfTables {
        /// The header path.
        path: Vec<String>,
    },

    /// A header path segment is occupied by a non-table value.
    TableIsNonTable {
        /// The header path.
        path: Vec<String>,
        /// The prefix of the path that resolved to a non-table.
        culprit: Vec<String>,
        /// Whether the header was an array-of-tables header.
        array: bool,
    },

    /// A `[[table]]` name is occupied by something other than an array.
    ArrayOfTablesIsOtherType {
        /// The header path.
        path: Vec<String>,
    },

    /// A `[[table]]` name is occupied by a static array.
    ArrayOfTablesIsKey {
        /// The header path.
        path: Vec<String>,
    },

    /// A dotted key reopened a table that was already explicitly defined.
    KeyNotAllowed {
        /// The full dotted key of the statement.
        path: Vec<String>,
        /// The path of the table the statement appeared in.
        table: Vec<String>,
        /// The already-defined table the key tried to extend.
        culprit: Vec<String>,
        /// Whether the culprit is an array of tables.
        array: bool,
    },

    /// A dotted-key intermediate segment resolved to a non-table value.
    FailedToAccess {
        /// The full dotted key of the statement.
        path: Vec<String>,
        /// The prefix of the path that could not be traversed.
        culprit: Vec<String>,
        /// The scope the statement appeared in.
        scope: Scope,
    },

    /// A header path traversed into a plain literal array.
    ExtendStaticArray {
        /// The header path.
        path: Vec<String>,
        /// The prefix of the path that resolved to the static array.
        culprit: Vec<String>,
    },
}

impl ErrorKind {
    /// Attaches a source position, producing an [`Error`].
    pub(crate) fn at(self, pos: Pos) -> Error {
        Error {
            kind: self,
            pos: Some(pos),
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Syntax => "syntax",
            Self::InvalidCharacter(..) => "invalid-character",
            Self::InvalidEscapeCodes(..) => "invalid-escape-codes",
            Self::InvalidValue(..) => "invalid-value",
            Self::RecursionLimit => "recursion-limit",
            Self::DuplicateKey { .. } => "duplicate-key",
            Self::DuplicateTable { .. } => "duplicate-table",
            Self::TableIsArrayOfTables { .. } => "table-is-array-of-tables",
            Self::TableIsNonTable { .. } => "table-is-non-table",
            Self::ArrayOfTablesIsOtherType { .. } => "array-of-tables-is-other-type",
            Self::ArrayOfTablesIsKey { .. } => "array-of-tables-is-key",
            Self::KeyNotAllowed { .. } => "key-not-allowed",
            Self::FailedToAccess { .. } => "failed-to-access",
            Self::ExtendStaticArray { .. } => "extend-static-array",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Renders a key path in dotted form, quoting segments that are not bare keys.
pub(crate) struct KeyPath<'a>(pub &'a [String]);

impl Display for KeyPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            if !segment.is_empty() && segment.bytes().all(crate::matcher::is_bare_key_byte) {
                f.write_str(segment)?;
            } else {
                f.write_str("\"")?;
                for c in segment.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")?;
            }
        }
        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Syntax => f.write_str("Unexpected token in TOML")?,
            ErrorKind::InvalidCharacter(c) => {
                write!(f, "Invalid character 0x{:x} in TOML", *c as u32)?;
            }
            ErrorKind::InvalidEscapeCodes(code) => {
                write!(f, "Invalid escape codes {code} in TOML")?;
            }
            ErrorKind::InvalidValue(message) => f.write_str(message)?,
            ErrorKind::RecursionLimit => f.write_str("Maximum nesting depth exceeded in TOML")?,
            ErrorKind::DuplicateKey { path, scope } => {
                write!(f, "The key {} is duplicated in {scope}", KeyPath(path))?;
            }
            ErrorKind::DuplicateTable { path } => {
                write!(f, "The name of Table [{}] is duplicated", KeyPath(path))?;
            }
            ErrorKind::TableIsArrayOfTables { path } => {
                write!(
                    f,
                    "The name of Table [{}] is already declared as \"Array of Tables\"",
                    KeyPath(path)
                )?;
            }
            ErrorKind::TableIsNonTable {
                path,
                culprit,
                array,
            } => {
                write!(
                    f,
                    "The key {} is already declared as non-table type when define ",
                    KeyPath(culprit)
                )?;
                if *array {
                    write!(f, "\"Array of Tables\" [[{}]]", KeyPath(path))?;
                } else {
                    write!(f, "Table [{}]", KeyPath(path))?;
                }
            }
            ErrorKind::ArrayOfTablesIsOtherType { path } => {
                write!(
                    f,
                    "The name of \"Array of Tables\" [[{}]] is already declared as other type",
                    KeyPath(path)
                )?;
            }
            ErrorKind::ArrayOfTablesIsKey { path } => {
                write!(
                    f,
                    "The name of \"Array of Tables\" [[{}]] is already declared as key",
                    KeyPath(path)
                )?;
            }
            ErrorKind::KeyNotAllowed {
                path,
                table,
                culprit,
                array,
            } => {
                write!(
                    f,
                    "The key {} in Table [{}] to add to ",
                    KeyPath(path),
                    KeyPath(table)
                )?;
                if *array {
                    write!(f, "[[{}]]", KeyPath(culprit))?;
                } else {
                    write!(f, "[{}]", KeyPath(culprit))?;
                }
                f.write_str(" after explicitly defining it above is not allowed")?;
            }
            ErrorKind::FailedToAccess {
                path,
                culprit,
                scope,
            } => {
                write!(
                    f,
                    "When define key {} in {scope}, that failed to access {} as table",
                    KeyPath(path),
                    KeyPath(culprit)
                )?;
            }
            ErrorKind::ExtendStaticArray { path, culprit } => {
                write!(
                    f,
                    "Cannot extend Table [{}] within static arrays {}",
                    KeyPath(path),
                    KeyPath(culprit)
                )?;
            }
        }
        if let Some(pos) = self.pos {
            write!(f, " at row {}, col {}", pos.line, pos.col)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;
