mod calendar;
mod consts;
mod convert;
mod parse;
mod prelude;
mod types;
mod validate;

pub use calendar::{
    CalendarEngine, DateError, HijriEngine, TabularRules, fixed_from_iso, iso_weekday_from_fixed,
};
pub use consts::*;
pub use convert::{from_hwc, to_hwc, total_weeks_for};
pub use parse::{HwcCoordinates, HwcInput, InputError, from_hwc_input, normalize};
pub use types::{CalendarVariant, HijriDate, Week, Weekday, hijri_weekday};
pub use validate::{
    Rule, SequenceEntry, ValidationError, ValidationReport, Violation, YearKind,
    expected_total_weeks, validate_sequence,
};

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// A date in the Hijri Week Calendar: the week-numbering year, the week
/// within it, and the weekday (Saturday=1 .. Friday=7).
///
/// Like ISO week dates, the week-numbering year can differ from the Hijri
/// year of the same day for the few days around 1 Muharram.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[display(fmt = "{}-W{:02}-{}", "year_of_week", "week_of_year.get()", "day_of_week")]
#[serde(rename_all = "camelCase")]
pub struct HwcDate {
    year_of_week: i32,
    week_of_year: Week,
    day_of_week: Weekday,
    variant: CalendarVariant,
}

/// The part of an HWC date string that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Component {
    Year,
    Week,
    Weekday,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid {_0} in HWC Date string")]
    InvalidComponent(Component),
    #[display(fmt = "Empty HWC Date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

impl HwcDate {
    /// Creates an HWC date from already validated parts.
    ///
    /// Whether `week_of_year` exists in `year_of_week` is not checked; use
    /// [`normalize`] to clamp against the year's week count.
    pub const fn new(
        year_of_week: i32,
        week_of_year: Week,
        day_of_week: Weekday,
        variant: CalendarVariant,
    ) -> Self {
        Self {
            year_of_week,
            week_of_year,
            day_of_week,
            variant,
        }
    }

    /// Returns the week-numbering year
    pub const fn year_of_week(&self) -> i32 {
        self.year_of_week
    }

    pub const fn week_of_year(&self) -> Week {
        self.week_of_year
    }

    pub const fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    pub const fn variant(&self) -> CalendarVariant {
        self.variant
    }

    /// Returns `(year_of_week, week_of_year, day_of_week)` as plain numbers
    pub const fn to_triple(&self) -> (i32, u8, u8) {
        (
            self.year_of_week,
            self.week_of_year.get(),
            self.day_of_week.get(),
        )
    }

    /// Drops the calendar variant, keeping the textual coordinates
    pub const fn coordinates(&self) -> HwcCoordinates {
        HwcCoordinates::from_parts(self.year_of_week, self.week_of_year, self.day_of_week)
    }

    /// Compact form `yyyyWwwd`
    pub fn to_compact_string(&self) -> String {
        self.coordinates().to_compact_string()
    }
}
