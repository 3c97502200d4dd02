//! Pluggable conversion between lexical scalars and [`Value`]s.
//!
//! The parser validates shape; converters decide what a matched integer,
//! float or date-time becomes. The serializer asks the same converters to
//! render those values back. Replace one via
//! [`Converters`](crate::Converters) to change a representation, e.g. to
//! parse all integers into strings.

use std::fmt::{self, Display};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;

use crate::{Datetime, DatetimeKind, Value};

/// Rejection from a converter. The message is reported verbatim, with the
/// source position appended when the parser is the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    message: String,
}

impl ConvertError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn into_message(self) -> String {
        self.message
    }
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConvertError {}

/// Converts matched integers.
pub trait IntegerConverter: Send + Sync {
    /// Builds a value from a lexically valid integer. `digits` carries no
    /// sign, radix prefix or underscores.
    fn parse(&self, digits: &str, negative: bool, radix: u32) -> Result<Value, ConvertError>;

    /// True when [`format`](Self::format) knows how to render this value.
    fn matches(&self, value: &Value) -> bool;

    /// Renders a matching value in TOML syntax.
    fn format(&self, value: &Value) -> Result<String, ConvertError>;
}

/// Converts matched floats. `inf` and `nan` never reach the converter.
pub trait FloatConverter: Send + Sync {
    /// Builds a value from a lexically valid float. The lexeme keeps its
    /// sign; underscores are stripped before the call.
    fn parse(&self, lexeme: &str) -> Result<Value, ConvertError>;

    /// True when [`format`](Self::format) knows how to render this value.
    fn matches(&self, value: &Value) -> bool;

    /// Renders a matching value in TOML syntax.
    fn format(&self, value: &Value) -> Result<String, ConvertError>;
}

/// Converts matched date-times.
pub trait DatetimeConverter: Send + Sync {
    /// Builds a value from a lexically valid date-time of the given form.
    fn parse(&self, lexeme: &str, kind: DatetimeKind) -> Result<Value, ConvertError>;

    /// True when [`format`](Self::format) knows how to render this value.
    fn matches(&self, value: &Value) -> bool;

    /// Renders a matching value in TOML syntax.
    fn format(&self, value: &Value) -> Result<String, ConvertError>;
}

/// The converter set used by [`parse_with`](crate::parse_with) and
/// [`stringify_with`](crate::stringify_with).
pub struct Converters {
    pub integer: Box<dyn IntegerConverter>,
    pub float: Box<dyn FloatConverter>,
    pub datetime: Box<dyn DatetimeConverter>,
}

impl Default for Converters {
    fn default() -> Self {
        Self {
            integer: Box::new(DefaultIntegerConverter),
            float: Box::new(DefaultFloatConverter),
            datetime: Box::new(DefaultDatetimeConverter),
        }
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Converters { .. }")
    }
}

/// Parses into [`Value::Integer`], falling back to [`Value::BigInt`] when
/// the value does not fit an `i64`. The cutover is radix-consistent since
/// both paths share the same digit string.
pub struct DefaultIntegerConverter;

impl IntegerConverter for DefaultIntegerConverter {
    fn parse(&self, digits: &str, negative: bool, radix: u32) -> Result<Value, ConvertError> {
        let mut signed = String::with_capacity(digits.len() + 1);
        if negative {
            signed.push('-');
        }
        signed.push_str(digits);
        if let Ok(value) = i64::from_str_radix(&signed, radix) {
            return Ok(Value::Integer(value));
        }
        match BigInt::parse_bytes(signed.as_bytes(), radix) {
            Some(value) => Ok(Value::BigInt(value)),
            None => Err(ConvertError::new(format!("Invalid integer {signed} in TOML"))),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        matches!(value, Value::Integer(..) | Value::BigInt(..))
    }

    fn format(&self, value: &Value) -> Result<String, ConvertError> {
        match value {
            Value::Integer(i) => Ok(i.to_string()),
            Value::BigInt(i) => Ok(i.to_string()),
            other => Err(ConvertError::new(format!(
                "expected an integer, found {}",
                other.type_str()
            ))),
        }
    }
}

/// Parses into [`Value::Float`] via `f64`.
pub struct DefaultFloatConverter;

impl FloatConverter for DefaultFloatConverter {
    fn parse(&self, lexeme: &str) -> Result<Value, ConvertError> {
        match lexeme.parse::<f64>() {
            Ok(value) => Ok(Value::Float(value)),
            Err(..) => Err(ConvertError::new(format!("Invalid float {lexeme} in TOML"))),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        matches!(value, Value::Float(..))
    }

    fn format(&self, value: &Value) -> Result<String, ConvertError> {
        let f = match value {
            Value::Float(f) => *f,
            other => {
                return Err(ConvertError::new(format!(
                    "expected a float, found {}",
                    other.type_str()
                )));
            }
        };
        if f.is_nan() {
            return Ok("nan".to_owned());
        }
        if f.is_infinite() {
            return Ok(if f < 0.0 { "-inf" } else { "inf" }.to_owned());
        }
        let mut text = f.to_string();
        // `Display` for f64 never uses exponent notation, so a missing dot
        // means an integral value.
        if !text.contains('.') {
            text.push_str(".0");
        }
        Ok(text)
    }
}

/// Parses into [`Value::Datetime`] backed by chrono, rejecting impossible
/// dates and times. Leap seconds are accepted.
pub struct DefaultDatetimeConverter;

impl DatetimeConverter for DefaultDatetimeConverter {
    fn parse(&self, lexeme: &str, kind: DatetimeKind) -> Result<Value, ConvertError> {
        let parsed = match kind {
            DatetimeKind::OffsetDatetime => parse_offset_datetime(lexeme).map(Datetime::from),
            DatetimeKind::LocalDatetime => parse_local_datetime(lexeme).map(Datetime::from),
            DatetimeKind::LocalDate => parse_date(lexeme).map(Datetime::from),
            DatetimeKind::LocalTime => parse_time(lexeme).map(Datetime::from),
        };
        match parsed {
            Some(dt) => Ok(Value::Datetime(dt)),
            None => Err(ConvertError::new(format!(
                "Invalid datetime {lexeme} in TOML"
            ))),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        matches!(value, Value::Datetime(..))
    }

    fn format(&self, value: &Value) -> Result<String, ConvertError> {
        match value {
            Value::Datetime(dt) => Ok(dt.to_string()),
            other => Err(ConvertError::new(format!(
                "expected a datetime, found {}",
                other.type_str()
            ))),
        }
    }
}

fn parse_offset_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    let (rest, off) = split_offset(s)?;
    let (date, time) = split_datetime(rest)?;
    let naive = NaiveDateTime::new(parse_date(date)?, parse_time(time)?);
    naive.and_local_timezone(parse_offset(off)?).single()
}

fn parse_local_datetime(s: &str) -> Option<NaiveDateTime> {
    let (date, time) = split_datetime(s)?;
    Some(NaiveDateTime::new(parse_date(date)?, parse_time(time)?))
}

// The splitters work on caller-supplied text, so slice positions must be
// checked against char boundaries rather than assumed ASCII.

fn split_datetime(s: &str) -> Option<(&str, &str)> {
    let (date, rest) = s.split_at_checked(10)?;
    match rest.chars().next()? {
        'T' | 't' | ' ' => Some((date, &rest[1..])),
        _ => None,
    }
}

fn split_offset(s: &str) -> Option<(&str, &str)> {
    if let Some(rest) = s.strip_suffix(['Z', 'z']) {
        return Some((rest, "Z"));
    }
    if s.len() >= 6 {
        if let Some((head, tail)) = s.split_at_checked(s.len() - 6) {
            if tail.starts_with(['+', '-']) {
                return Some((head, tail));
            }
        }
    }
    None
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 || s.as_bytes()[4] != b'-' || s.as_bytes()[7] != b'-' {
        return None;
    }
    let year = s[..4].parse().ok()?;
    let month = s[5..7].parse().ok()?;
    let day = s[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    if s.len() < 8 || !s.is_char_boundary(8) || s.as_bytes()[2] != b':' || s.as_bytes()[5] != b':' {
        return None;
    }
    let hour: u32 = s[..2].parse().ok()?;
    let minute: u32 = s[3..5].parse().ok()?;
    let second: u32 = s[6..8].parse().ok()?;
    let mut nano = 0u32;
    if s.len() > 8 {
        let digits = s[8..].strip_prefix('.')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut scale = 100_000_000;
        // Digits past nanosecond precision are dropped.
        for b in digits.bytes().take(9) {
            nano += (b - b'0') as u32 * scale;
            scale /= 10;
        }
    }
    if second == 60 {
        // chrono models a leap second as an overflowing nanosecond field.
        NaiveTime::from_hms_nano_opt(hour, minute, 59, nano + 1_000_000_000)
    } else {
        NaiveTime::from_hms_nano_opt(hour, minute, second, nano)
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s == "Z" {
        return FixedOffset::east_opt(0);
    }
    let bytes = s.as_bytes();
    if s.len() != 6 || !matches!(bytes[0], b'+' | b'-') || bytes[3] != b':' {
        return None;
    }
    let hours: i32 = s[1..3].parse().ok()?;
    let minutes: i32 = s[4..6].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    match bytes[0] {
        b'+' => FixedOffset::east_opt(seconds),
        b'-' => FixedOffset::east_opt(-seconds),
        _ => None,
    }
}

#[cfg(test)]
#[path = "./convert_tests.rs"]
mod tests;
