//! A line-oriented TOML parser and serializer with pluggable scalar
//! conversion.
//!
//! Documents parse into an ordinary owned [`Value`] tree. Tables keep
//! their entries in insertion order, integers outside the `i64` range
//! fall back to [`num_bigint::BigInt`], and date-times are backed by
//! [`chrono`]. The text form of integers, floats, and date-times can be
//! intercepted on both the parsing and the serializing side through
//! [`Converters`], so applications with their own numeric or calendar
//! types never have to round-trip through the defaults.
//!
//! Parsing is strict about lines: a fully empty line ends the document
//! (trailing non-TOML content after one is ignored), while lines of only
//! spaces or tabs are insignificant. [`stringify`] produces text that
//! reads back to an equal tree.
//!
//! # Examples
//!
//! ```
//! let content = r#"title = "example"
//! [owner]
//! name = "Tom"
//! dob = 1979-05-27T07:32:00-08:00
//! [database]
//! server = '192.168.1.1'
//! ports = [8001, 8001, 8002]
//! enabled = true
//! "#;
//!
//! let table = toml_scribe::parse(content)?;
//!
//! assert_eq!(table["title"].as_str(), Some("example"));
//! assert_eq!(table["database"]["ports"][1].as_i64(), Some(8001));
//! let dob = table["owner"]["dob"].as_datetime().unwrap();
//! assert_eq!(dob.to_string(), "1979-05-27T07:32:00-08:00");
//!
//! let text = toml_scribe::stringify(&table)?;
//! assert_eq!(toml_scribe::parse(&text)?, table);
//! # Ok::<(), toml_scribe::Error>(())
//! ```

mod convert;
mod datetime;
mod error;
mod matcher;
mod parser;
mod reader;
mod ser;
mod source;
mod table;
mod value;

pub use convert::{
    ConvertError, Converters, DatetimeConverter, DefaultDatetimeConverter, DefaultFloatConverter,
    DefaultIntegerConverter, FloatConverter, IntegerConverter,
};
pub use datetime::{Datetime, DatetimeKind};
pub use error::{Error, ErrorKind, Pos, Scope};
pub use parser::{ParseOptions, parse, parse_with};
pub use ser::{StringifyOptions, stringify, stringify_with};
pub use value::{Table, Value};

#[cfg(feature = "serde")]
pub mod impl_serde;
