use std::fmt::{self, Display};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// A TOML date-time value in one of the four forms the format allows.
///
/// Offset date-times keep their offset instead of being normalized to UTC,
/// so `1979-05-27T00:32:00-07:00` renders back with `-07:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datetime(Repr);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repr {
    Offset(DateTime<FixedOffset>),
    Local(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
}

/// Which of the four TOML date-time forms a [`Datetime`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeKind {
    OffsetDatetime,
    LocalDatetime,
    LocalDate,
    LocalTime,
}

impl Datetime {
    pub fn kind(&self) -> DatetimeKind {
        match self.0 {
            Repr::Offset(..) => DatetimeKind::OffsetDatetime,
            Repr::Local(..) => DatetimeKind::LocalDatetime,
            Repr::Date(..) => DatetimeKind::LocalDate,
            Repr::Time(..) => DatetimeKind::LocalTime,
        }
    }

    /// The calendar date, unless this is a local time.
    pub fn date(&self) -> Option<NaiveDate> {
        match self.0 {
            Repr::Offset(dt) => Some(dt.naive_local().date()),
            Repr::Local(dt) => Some(dt.date()),
            Repr::Date(d) => Some(d),
            Repr::Time(..) => None,
        }
    }

    /// The time of day, unless this is a date without one.
    pub fn time(&self) -> Option<NaiveTime> {
        match self.0 {
            Repr::Offset(dt) => Some(dt.naive_local().time()),
            Repr::Local(dt) => Some(dt.time()),
            Repr::Date(..) => None,
            Repr::Time(t) => Some(t),
        }
    }

    /// The UTC offset in minutes, for offset date-times only.
    pub fn offset_minutes(&self) -> Option<i32> {
        match self.0 {
            Repr::Offset(dt) => Some(dt.offset().local_minus_utc() / 60),
            _ => None,
        }
    }

    pub fn offset_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self.0 {
            Repr::Offset(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn local_datetime(&self) -> Option<NaiveDateTime> {
        match self.0 {
            Repr::Local(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn local_date(&self) -> Option<NaiveDate> {
        match self.0 {
            Repr::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn local_time(&self) -> Option<NaiveTime> {
        match self.0 {
            Repr::Time(t) => Some(t),
            _ => None,
        }
    }
}

impl From<DateTime<FixedOffset>> for Datetime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self(Repr::Offset(dt))
    }
}

impl From<NaiveDateTime> for Datetime {
    fn from(dt: NaiveDateTime) -> Self {
        Self(Repr::Local(dt))
    }
}

impl From<NaiveDate> for Datetime {
    fn from(d: NaiveDate) -> Self {
        Self(Repr::Date(d))
    }
}

impl From<NaiveTime> for Datetime {
    fn from(t: NaiveTime) -> Self {
        Self(Repr::Time(t))
    }
}

fn fmt_date(f: &mut fmt::Formatter<'_>, date: NaiveDate) -> fmt::Result {
    write!(f, "{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn fmt_time(f: &mut fmt::Formatter<'_>, time: NaiveTime) -> fmt::Result {
    let mut sec = time.second();
    let mut nano = time.nanosecond();
    // chrono folds a leap second into the nanosecond field.
    if nano >= 1_000_000_000 {
        sec += 1;
        nano -= 1_000_000_000;
    }
    write!(f, "{:02}:{:02}:{:02}", time.hour(), time.minute(), sec)?;
    if nano != 0 {
        let mut width = 9;
        while nano % 10 == 0 {
            nano /= 10;
            width -= 1;
        }
        write!(f, ".{nano:0width$}")?;
    }
    Ok(())
}

fn fmt_offset(f: &mut fmt::Formatter<'_>, seconds: i32) -> fmt::Result {
    if seconds == 0 {
        return f.write_str("Z");
    }
    let minutes = seconds.abs() / 60;
    let sign = if seconds < 0 { '-' } else { '+' };
    write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Renders the value in TOML syntax, e.g. `1979-05-27T07:32:00Z`.
impl Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Offset(dt) => {
                let local = dt.naive_local();
                fmt_date(f, local.date())?;
                f.write_str("T")?;
                fmt_time(f, local.time())?;
                fmt_offset(f, dt.offset().local_minus_utc())
            }
            Repr::Local(dt) => {
                fmt_date(f, dt.date())?;
                f.write_str("T")?;
                fmt_time(f, dt.time())
            }
            Repr::Date(d) => fmt_date(f, d),
            Repr::Time(t) => fmt_time(f, t),
        }
    }
}

#[cfg(test)]
#[path = "./datetime_tests.rs"]
mod tests;
