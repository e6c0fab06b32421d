//! CF-convention time axis decoding
//!
//! NetCDF time coordinates are stored as offsets (`"days since 1990-01-01"`)
//! interpreted under a `calendar` attribute. Climate model output frequently
//! uses `noleap` or `360_day` calendars, which `chrono` cannot represent, so
//! decoded timestamps are plain [`CalendarDate`] values and only the standard
//! calendar goes through `chrono` arithmetic.

use crate::errors::{Result, SeasonalCycleError};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_DAY: f64 = 86_400.0;

const NOLEAP_MONTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const ALL_LEAP_MONTHS: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAY_360_MONTHS: [u32; 12] = [30; 12];

/// A calendar date in whatever calendar the time axis uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    /// Create a date without validating it against a calendar
    #[must_use]
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Calendar month, 1 = January
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// CF calendars understood by the decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalendarKind {
    /// `standard`, `gregorian` and `proleptic_gregorian`
    #[default]
    Standard,
    /// `noleap` / `365_day`
    NoLeap,
    /// `all_leap` / `366_day`
    AllLeap,
    /// `360_day`
    Day360,
}

impl CalendarKind {
    /// Fixed month lengths, or `None` for the standard calendar
    const fn month_lengths(self) -> Option<&'static [u32; 12]> {
        match self {
            Self::Standard => None,
            Self::NoLeap => Some(&NOLEAP_MONTHS),
            Self::AllLeap => Some(&ALL_LEAP_MONTHS),
            Self::Day360 => Some(&DAY_360_MONTHS),
        }
    }

    fn days_in_month(self, year: i32, month: u32) -> Option<u32> {
        if !(1..=12).contains(&month) {
            return None;
        }
        match self.month_lengths() {
            Some(lengths) => Some(lengths[month as usize - 1]),
            None => {
                let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)?
                };
                u32::try_from(next.signed_duration_since(first).num_days()).ok()
            }
        }
    }
}

impl FromStr for CalendarKind {
    type Err = SeasonalCycleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Self::Standard),
            "noleap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            other => Err(SeasonalCycleError::TimeDecode {
                message: format!("Unsupported calendar '{other}'"),
            }),
        }
    }
}

/// Reference instant of a CF `units` string
#[derive(Debug, Clone, Copy, PartialEq)]
struct ReferenceInstant {
    date: CalendarDate,
    seconds_of_day: f64,
}

/// Parsed `"<unit> since <reference>"` time units under a given calendar
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnits {
    seconds_per_unit: f64,
    reference: ReferenceInstant,
    calendar: CalendarKind,
}

impl TimeUnits {
    /// Parse a CF units string such as `"days since 1850-01-01 00:00:00"`
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalCycleError::TimeDecode`] for unknown units, calendar
    /// based units (`months`, `years`) or an unparsable reference date.
    pub fn parse(units: &str, calendar: CalendarKind) -> Result<Self> {
        let decode_err = |message: String| SeasonalCycleError::TimeDecode { message };

        let lowered = units.trim().to_ascii_lowercase();
        let (unit, reference) = lowered
            .split_once(" since ")
            .ok_or_else(|| decode_err(format!("Expected '<unit> since <date>', got '{units}'")))?;

        let seconds_per_unit = match unit.trim() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
            "days" | "day" | "d" => SECONDS_PER_DAY,
            other => return Err(decode_err(format!("Unsupported time unit '{other}'"))),
        };

        let reference = parse_reference(reference.trim(), calendar)?;

        Ok(Self {
            seconds_per_unit,
            reference,
            calendar,
        })
    }

    /// Calendar this axis is decoded under
    #[must_use]
    pub const fn calendar(&self) -> CalendarKind {
        self.calendar
    }

    /// Decode a single offset into a calendar date
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalCycleError::TimeDecode`] for non-finite offsets or
    /// dates outside the representable range.
    pub fn decode(&self, value: f64) -> Result<CalendarDate> {
        if !value.is_finite() {
            return Err(SeasonalCycleError::TimeDecode {
                message: format!("Non-finite time value {value}"),
            });
        }

        let offset = value * self.seconds_per_unit + self.reference.seconds_of_day;
        #[allow(clippy::cast_possible_truncation)]
        let days = (offset / SECONDS_PER_DAY).floor() as i64;

        let out_of_range = || SeasonalCycleError::TimeDecode {
            message: format!("Time value {value} is outside the representable date range"),
        };

        match self.calendar.month_lengths() {
            None => {
                let ref_date = self.reference.date;
                let start = NaiveDate::from_ymd_opt(ref_date.year, ref_date.month, ref_date.day)
                    .ok_or_else(out_of_range)?;
                let date = Duration::try_days(days)
                    .and_then(|delta| start.checked_add_signed(delta))
                    .ok_or_else(out_of_range)?;
                Ok(CalendarDate::from(date))
            }
            Some(lengths) => {
                let year_len: i64 = lengths.iter().map(|&d| i64::from(d)).sum();
                let ref_date = self.reference.date;
                let ref_doy: i64 = lengths[..ref_date.month as usize - 1]
                    .iter()
                    .map(|&d| i64::from(d))
                    .sum::<i64>()
                    + i64::from(ref_date.day)
                    - 1;

                let total = ref_doy + days;
                let year = i64::from(ref_date.year) + total.div_euclid(year_len);
                let mut doy = total.rem_euclid(year_len);

                let mut month = 1_u32;
                for &len in lengths {
                    if doy < i64::from(len) {
                        break;
                    }
                    doy -= i64::from(len);
                    month += 1;
                }

                let year = i32::try_from(year).map_err(|_| out_of_range())?;
                let day = u32::try_from(doy + 1).map_err(|_| out_of_range())?;
                Ok(CalendarDate::new(year, month, day))
            }
        }
    }

    /// Decode a whole time coordinate
    ///
    /// # Errors
    ///
    /// Fails on the first value that cannot be decoded.
    pub fn decode_all(&self, values: &[f64]) -> Result<Vec<CalendarDate>> {
        values.iter().map(|&v| self.decode(v)).collect()
    }
}

/// Parse `YYYY-MM-DD[( |T)HH:MM[:SS[.f]]][Z| tz]`, padded or not
fn parse_reference(s: &str, calendar: CalendarKind) -> Result<ReferenceInstant> {
    let bad = || SeasonalCycleError::TimeDecode {
        message: format!("Unparsable reference date '{s}'"),
    };

    let mut parts = s.split(|c: char| c == ' ' || c == 'T' || c == 't');
    let date_part = parts.next().ok_or_else(bad)?;
    let time_part = parts.find(|p| !p.is_empty());

    let fields: Vec<&str> = date_part.split('-').collect();
    let [year, month, day] = fields.as_slice() else {
        return Err(bad());
    };
    let year: i32 = year.parse().map_err(|_| bad())?;
    let month: u32 = month.parse().map_err(|_| bad())?;
    let day: u32 = day.parse().map_err(|_| bad())?;

    let max_day = calendar.days_in_month(year, month).ok_or_else(bad)?;
    if day == 0 || day > max_day {
        return Err(bad());
    }

    let seconds_of_day = match time_part {
        Some(t) => {
            let t = t.trim_end_matches(['Z', 'z']);
            let hms: Vec<&str> = t.split(':').collect();
            if hms.is_empty() || hms.len() > 3 {
                return Err(bad());
            }
            let mut seconds = 0.0;
            for (field, scale) in hms.iter().zip([3_600.0, 60.0, 1.0]) {
                let v: f64 = field.parse().map_err(|_| bad())?;
                seconds += v * scale;
            }
            seconds
        }
        None => 0.0,
    };

    Ok(ReferenceInstant {
        date: CalendarDate::new(year, month, day),
        seconds_of_day,
    })
}
