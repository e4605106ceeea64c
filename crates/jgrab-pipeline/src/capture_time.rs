//! Capture timestamps encoded in JGRAB file names.
//!
//! Loggers name each export `YYYY-MM-DD__HH_MM-<suffix>`, for example
//! `2023-11-04__16_45-JGRAB.txt`. Everything after the last `-` is the suffix;
//! the double underscore may also be a single space.

use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Minute-resolution time at which a capture was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureTime {
    /// Calendar year.
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
}

impl CaptureTime {
    /// Read the capture time from a file name (not a full path).
    pub fn from_file_name(name: &str) -> Result<Self, PipelineError> {
        let fail = |reason: &str| PipelineError::file_name(name, reason);

        let (stamp, _suffix) = name
            .rsplit_once('-')
            .ok_or_else(|| fail("missing '-' before the suffix"))?;
        let stamp = stamp.replace("__", " ");
        let (date, time) = stamp
            .split_once(' ')
            .ok_or_else(|| fail("expected 'YYYY-MM-DD__HH_MM'"))?;

        let mut date_parts = date.splitn(3, '-');
        let year: u16 = next_number(&mut date_parts).ok_or_else(|| fail("bad year"))?;
        let month: u8 = next_number(&mut date_parts).ok_or_else(|| fail("bad month"))?;
        let day: u8 = next_number(&mut date_parts).ok_or_else(|| fail("bad day"))?;

        let mut time_parts = time.splitn(2, '_');
        let hour: u8 = next_number(&mut time_parts).ok_or_else(|| fail("bad hour"))?;
        let minute: u8 = next_number(&mut time_parts).ok_or_else(|| fail("bad minute"))?;

        if !(1..=12).contains(&month) {
            return Err(fail("month out of range"));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(fail("day out of range"));
        }
        if hour > 23 {
            return Err(fail("hour out of range"));
        }
        if minute > 59 {
            return Err(fail("minute out of range"));
        }

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
        })
    }
}

impl fmt::Display for CaptureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:00",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

fn next_number<'a, T: FromStr>(parts: &mut impl Iterator<Item = &'a str>) -> Option<T> {
    let part = parts.next()?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
