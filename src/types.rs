use crate::calendar::DateError;
use crate::consts::{
    DAYS_IN_WEEK, LONG_MONTH_DAYS, MAX_WEEK, MAX_WEEKDAY, MIN_DAY, MIN_WEEK, MIN_WEEKDAY,
    MONTHS_IN_YEAR, MUHARRAM,
};
use crate::prelude::*;
use crate::{Component, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU8;
use std::str::FromStr;

/// The Hijri calendar a date is expressed in.
///
/// All three share month structure; they differ in how month lengths are
/// decided (observation tables vs. arithmetic) and in the epoch.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    Serialize,
    Deserialize,
)]
pub enum CalendarVariant {
    /// Saudi Umm al-Qura calendar
    #[default]
    #[display(fmt = "islamic-umalqura")]
    #[serde(rename = "islamic-umalqura")]
    Umalqura,
    /// Tabular calendar with the Friday (civil) epoch
    #[display(fmt = "islamic-civil")]
    #[serde(rename = "islamic-civil")]
    Civil,
    /// Tabular calendar with the Thursday (astronomical) epoch
    #[display(fmt = "islamic-tbla")]
    #[serde(rename = "islamic-tbla")]
    Tbla,
}

impl CalendarVariant {
    /// Every supported variant
    pub const ALL: [Self; 3] = [Self::Umalqura, Self::Civil, Self::Tbla];
}

impl FromStr for CalendarVariant {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        match id.strip_prefix("hwc-").unwrap_or(id) {
            "islamic-umalqura" => Ok(Self::Umalqura),
            "islamic-civil" => Ok(Self::Civil),
            "islamic-tbla" => Ok(Self::Tbla),
            _ => Err(DateError::UnknownCalendar(id.to_owned())),
        }
    }
}

/// An HWC week number guaranteed to be in the range `1..=MAX_WEEK` (1..=51)
///
/// Whether week 51 exists depends on the year; see [`crate::total_weeks_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Week(NonZeroU8);

impl Week {
    /// Creates a new Week, validating that it's in `1..=MAX_WEEK`
    ///
    /// # Errors
    /// Returns `ParseError::InvalidComponent(Component::Week)` otherwise.
    pub fn new(value: u8) -> Result<Self, ParseError> {
        if value > MAX_WEEK {
            return Err(ParseError::InvalidComponent(Component::Week));
        }
        NonZeroU8::new(value)
            .map(Self)
            .ok_or(ParseError::InvalidComponent(Component::Week))
    }

    /// Clamps `value` into `1..=last`. `last` is itself capped at `MAX_WEEK`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn clamped(value: i64, last: u8) -> Self {
        let last = if last > MAX_WEEK { MAX_WEEK } else { last };
        let week = if value < MIN_WEEK as i64 {
            MIN_WEEK
        } else if value > last as i64 {
            last
        } else {
            value as u8
        };
        match NonZeroU8::new(week) {
            Some(week) => Self(week),
            None => Self(NonZeroU8::MIN),
        }
    }

    /// Returns the week value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl TryFrom<u8> for Week {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Week> for u8 {
    fn from(week: Week) -> Self {
        week.0.get()
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An HWC weekday guaranteed to be in the range `1..=7`, Saturday being 1
/// and Friday 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weekday(NonZeroU8);

impl Weekday {
    /// Creates a new Weekday, validating that it's in `1..=7`
    ///
    /// # Errors
    /// Returns `ParseError::InvalidComponent(Component::Weekday)` otherwise.
    pub fn new(value: u8) -> Result<Self, ParseError> {
        if value > MAX_WEEKDAY {
            return Err(ParseError::InvalidComponent(Component::Weekday));
        }
        NonZeroU8::new(value)
            .map(Self)
            .ok_or(ParseError::InvalidComponent(Component::Weekday))
    }

    /// Maps an ISO weekday (Monday=1 .. Sunday=7) to its HWC weekday.
    pub const fn from_iso(iso_weekday: u8) -> Self {
        match NonZeroU8::new(hijri_weekday(iso_weekday)) {
            Some(day) => Self(day),
            // hijri_weekday never yields 0
            None => Self(NonZeroU8::MIN),
        }
    }

    /// Clamps `value` into `1..=7`; zero and negatives become Saturday.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn clamped(value: i64) -> Self {
        let day = if value < MIN_WEEKDAY as i64 {
            MIN_WEEKDAY
        } else if value > MAX_WEEKDAY as i64 {
            MAX_WEEKDAY
        } else {
            value as u8
        };
        match NonZeroU8::new(day) {
            Some(day) => Self(day),
            None => Self(NonZeroU8::MIN),
        }
    }

    /// Returns the weekday value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl TryFrom<u8> for Weekday {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day.0.get()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A day in one of the Hijri calendars.
///
/// Values come out of a [`crate::CalendarEngine`], which validates month and
/// day against its month-length rules. Deserialization only checks that the
/// month is `1..=12` and the day `1..=30`; use [`crate::CalendarEngine::date`]
/// to check the day against the month's length in a given calendar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[display(fmt = "{year}-{month:02}-{day:02}")]
#[serde(try_from = "HijriDateFields")]
pub struct HijriDate {
    year: i32,
    month: u8,
    day: u8,
    variant: CalendarVariant,
}

impl HijriDate {
    pub(crate) const fn from_parts(year: i32, month: u8, day: u8, variant: CalendarVariant) -> Self {
        Self {
            year,
            month,
            day,
            variant,
        }
    }

    /// Hijri year; zero and negative years are before the epoch
    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn variant(&self) -> CalendarVariant {
        self.variant
    }

    /// `(year, month, day)` without the variant
    pub const fn to_ymd(&self) -> (i32, u8, u8) {
        (self.year, self.month, self.day)
    }
}

#[derive(Deserialize)]
struct HijriDateFields {
    year: i32,
    month: u8,
    day: u8,
    variant: CalendarVariant,
}

impl TryFrom<HijriDateFields> for HijriDate {
    type Error = DateError;

    fn try_from(fields: HijriDateFields) -> Result<Self, Self::Error> {
        let HijriDateFields {
            year,
            month,
            day,
            variant,
        } = fields;
        if !(MUHARRAM..=MONTHS_IN_YEAR).contains(&month) {
            return Err(DateError::InvalidMonth { month });
        }
        if !(MIN_DAY..=LONG_MONTH_DAYS).contains(&day) {
            return Err(DateError::InvalidDay {
                year,
                month,
                day,
                max_day: LONG_MONTH_DAYS,
            });
        }
        Ok(Self::from_parts(year, month, day, variant))
    }
}

// Helper functions

/// Converts an ISO weekday (Monday=1 .. Sunday=7) to the HWC weekday
/// (Saturday=1 .. Friday=7).
pub const fn hijri_weekday(iso_weekday: u8) -> u8 {
    debug_assert!(iso_weekday >= MIN_WEEKDAY && iso_weekday <= DAYS_IN_WEEK);

    match (iso_weekday % DAYS_IN_WEEK + 2) % DAYS_IN_WEEK {
        0 => DAYS_IN_WEEK,
        day => day,
    }
}

pub(crate) const fn is_valid_week(week: u8) -> bool {
    week >= MIN_WEEK && week <= MAX_WEEK
}

pub(crate) const fn is_valid_weekday(day: u8) -> bool {
    day >= MIN_WEEKDAY && day <= MAX_WEEKDAY
}
