//! HWC coordinate parsing and normalization.
//!
//! Strings are parsed strictly into [`HwcCoordinates`]; every input shape is
//! then clamped against the year's week count by [`normalize`].

use crate::calendar::CalendarEngine;
use crate::consts::{DATE_SEPARATOR, MIN_WEEK, MIN_WEEKDAY, WEEK_MARKER};
use crate::convert::{from_hwc, total_weeks_for};
use crate::prelude::*;
use crate::types::{CalendarVariant, HijriDate, Week, Weekday};
use crate::{Component, HwcDate, ParseError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Year, week and weekday as written in an HWC date string.
///
/// Week and weekday are range checked (`1..=51`, `1..=7`) but not checked
/// against the year's actual week count.
///
/// ```
/// use hijri_week::HwcCoordinates;
///
/// let coordinates: HwcCoordinates = "1445-W23-5".parse().unwrap();
/// assert_eq!(coordinates.to_triple(), (1445, 23, 5));
/// assert_eq!(coordinates.to_compact_string(), "1445W235");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}-W{:02}-{}", "year", "week.get()", "day")]
pub struct HwcCoordinates {
    year: i32,
    week: Week,
    day: Weekday,
}

impl HwcCoordinates {
    /// Creates coordinates from numbers.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidComponent` for a week outside `1..=51` or
    /// a weekday outside `1..=7`.
    pub fn new(year: i32, week: u8, day: u8) -> Result<Self, ParseError> {
        Ok(Self::from_parts(year, Week::new(week)?, Weekday::new(day)?))
    }

    pub(crate) const fn from_parts(year: i32, week: Week, day: Weekday) -> Self {
        Self { year, week, day }
    }

    /// First day of the first week of `year`
    pub const fn year_start(year: i32) -> Self {
        Self::from_parts(year, Week::clamped(1, MIN_WEEK), Weekday::clamped(1))
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn week(&self) -> Week {
        self.week
    }

    pub const fn day(&self) -> Weekday {
        self.day
    }

    pub const fn to_triple(&self) -> (i32, u8, u8) {
        (self.year, self.week.get(), self.day.get())
    }

    /// Compact form `yyyyWwwd`
    pub fn to_compact_string(&self) -> String {
        format!("{}{WEEK_MARKER}{:02}{}", self.year, self.week.get(), self.day)
    }

    /// Attaches a calendar, clamping the week to the year's week count.
    pub fn normalize<E: CalendarEngine + ?Sized>(
        &self,
        engine: &E,
        variant: CalendarVariant,
    ) -> HwcDate {
        clamp(
            engine,
            self.year,
            i64::from(self.week.get()),
            i64::from(self.day.get()),
            variant,
        )
    }

    /// Parses the year part. A leading separator is the sign; when a week
    /// follows, one trailing separator is allowed. Any other separator is
    /// malformed.
    fn parse_year(s: &str, has_week: bool) -> Result<i32, ParseError> {
        let (negative, body) = match s.strip_prefix(DATE_SEPARATOR) {
            Some(body) => (true, body),
            None => (false, s),
        };
        let body = if has_week {
            body.strip_suffix(DATE_SEPARATOR).unwrap_or(body)
        } else if body.contains(DATE_SEPARATOR) {
            // `yyyy-...` without a week marker
            return Err(ParseError::InvalidComponent(Component::Week));
        } else {
            body
        };

        let year: i64 = parse_digits(body, Component::Year)?;
        i32::try_from(if negative { -year } else { year })
            .map_err(|_| ParseError::InvalidComponent(Component::Year))
    }

    /// Parses the part after the week marker: `ww`, `wwd` or `ww-d`. A
    /// single week digit is accepted when nothing follows it.
    fn parse_week_and_day(s: &str) -> Result<(Week, Weekday), ParseError> {
        let (week, day) = match s.split_once(DATE_SEPARATOR) {
            Some((week, day)) => {
                if week.chars().count() != 2 {
                    return Err(ParseError::InvalidComponent(Component::Week));
                }
                if day.is_empty() {
                    return Err(ParseError::InvalidComponent(Component::Weekday));
                }
                (week, day)
            }
            None => {
                if s.chars().count() > 3 {
                    return Err(ParseError::InvalidComponent(Component::Weekday));
                }
                let split = s.char_indices().nth(2).map_or(s.len(), |(index, _)| index);
                s.split_at(split)
            }
        };

        let week = Week::new(parse_digits(week, Component::Week)?)?;
        let day = if day.is_empty() {
            MIN_WEEKDAY
        } else {
            match parse_digits(day, Component::Weekday)? {
                0 => MIN_WEEKDAY,
                day => day,
            }
        };
        Ok((week, Weekday::new(day)?))
    }
}

impl FromStr for HwcCoordinates {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let mut parts = compact.split(|c: char| c.eq_ignore_ascii_case(&WEEK_MARKER));
        let year = parts.next().unwrap_or_default();
        let week_and_day = parts.next();
        if parts.next().is_some() {
            return Err(ParseError::InvalidComponent(Component::Week));
        }

        let Some(week_and_day) = week_and_day else {
            return Ok(Self::year_start(Self::parse_year(year, false)?));
        };
        let year = Self::parse_year(year, true)?;
        let (week, day) = Self::parse_week_and_day(week_and_day)?;
        Ok(Self::from_parts(year, week, day))
    }
}

impl From<HwcDate> for HwcCoordinates {
    fn from(date: HwcDate) -> Self {
        date.coordinates()
    }
}

impl Serialize for HwcCoordinates {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HwcCoordinates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Anything that names an HWC date: a bare year, an HWC string, or a
/// `[year]`, `[year, week]` or `[year, week, day]` array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HwcInput {
    Year(i32),
    Text(String),
    Parts(Vec<i64>),
}

impl From<i32> for HwcInput {
    fn from(year: i32) -> Self {
        Self::Year(year)
    }
}

impl From<&str> for HwcInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for HwcInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<i64>> for HwcInput {
    fn from(parts: Vec<i64>) -> Self {
        Self::Parts(parts)
    }
}

impl From<&[i64]> for HwcInput {
    fn from(parts: &[i64]) -> Self {
        Self::Parts(parts.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for HwcInput {
    fn from(parts: [i64; N]) -> Self {
        Self::Parts(parts.to_vec())
    }
}

impl From<HwcCoordinates> for HwcInput {
    fn from(coordinates: HwcCoordinates) -> Self {
        let (year, week, day) = coordinates.to_triple();
        Self::Parts(vec![i64::from(year), i64::from(week), i64::from(day)])
    }
}

/// Error type for [`normalize`] and [`from_hwc_input`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The input string did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The input has no HWC shape at all.
    #[error("Invalid HWC Date input: expected a year, an HWC string or 1 to 3 numbers, got {0}")]
    TypeMismatch(String),
}

/// Turns any [`HwcInput`] into a canonical HWC date of `variant`.
///
/// Arrays are clamped, never rejected. Strings must parse. Either way the
/// week is finally capped at the year's week count.
///
/// # Errors
/// `InputError::Parse` for a malformed string, `InputError::TypeMismatch`
/// for an empty or over-long array.
pub fn normalize<E: CalendarEngine + ?Sized>(
    engine: &E,
    input: &HwcInput,
    variant: CalendarVariant,
) -> Result<HwcDate, InputError> {
    match input {
        HwcInput::Year(year) => Ok(clamp(engine, *year, 1, 1, variant)),
        HwcInput::Text(text) => {
            let coordinates: HwcCoordinates = text.parse()?;
            Ok(coordinates.normalize(engine, variant))
        }
        HwcInput::Parts(parts) => {
            let (year, week, day) = match parts.as_slice() {
                [year] => (*year, 1, 1),
                [year, week] => (*year, *week, 1),
                [year, week, day] => (*year, *week, *day),
                _ => return Err(InputError::TypeMismatch(format!("{parts:?}"))),
            };
            let year = i32::try_from(year)
                .map_err(|_| ParseError::InvalidComponent(Component::Year))?;
            Ok(clamp(engine, year, week, day, variant))
        }
    }
}

/// Normalizes `input` and converts it to the Hijri date it names.
///
/// # Errors
/// Same as [`normalize`].
pub fn from_hwc_input<E: CalendarEngine + ?Sized>(
    engine: &E,
    input: &HwcInput,
    variant: CalendarVariant,
) -> Result<HijriDate, InputError> {
    let hwc = normalize(engine, input, variant)?;
    Ok(from_hwc(engine, &hwc))
}

fn clamp<E: CalendarEngine + ?Sized>(
    engine: &E,
    year: i32,
    week: i64,
    day: i64,
    variant: CalendarVariant,
) -> HwcDate {
    let last_week = total_weeks_for(engine, year, variant);
    HwcDate::new(
        year,
        Week::clamped(week, last_week),
        Weekday::clamped(day),
        variant,
    )
}

/// Parses a run of ASCII digits, rejecting signs and anything else
/// `str::parse` would tolerate.
fn parse_digits<T: FromStr>(s: &str, component: Component) -> Result<T, ParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidComponent(component));
    }
    s.parse()
        .map_err(|_| ParseError::InvalidComponent(component))
}
