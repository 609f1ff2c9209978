//! Calendar engines: the capability the HWC layer is built on.
//!
//! The HWC functions only need four things from a calendar: month lengths,
//! a weekday for each date, and the ability to move by whole days. They get
//! them through [`CalendarEngine`]. [`HijriEngine`] is the bundled
//! implementation covering all three [`CalendarVariant`]s.

use crate::consts::{
    CIVIL_EPOCH, DAYS_IN_WEEK, DAYS_PER_CYCLE, DHU_AL_HIJJAH, LEAP_CYCLE, LEAP_PHASE,
    LEAP_YEARS_PER_CYCLE, LONG_MONTH_DAYS, MIN_DAY, MONTHS_IN_YEAR, MUHARRAM, SHORT_MONTH_DAYS,
    TBLA_EPOCH, YEAR_ESTIMATE_OFFSET,
};
#[cfg(feature = "umalqura")]
use crate::consts::{UMALQURA_FIRST_YEAR, UMALQURA_LAST_YEAR};
use crate::types::{CalendarVariant, HijriDate};

/// Error type for Hijri date construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// Month outside `1..=12`.
    #[error("Invalid month: {month} (must be 1-12)")]
    InvalidMonth { month: u8 },

    /// Day outside the month's length.
    #[error("Invalid day {day} for month {year}-{month:02} (max {max_day})")]
    InvalidDay {
        year: i32,
        month: u8,
        day: u8,
        max_day: u8,
    },

    /// Calendar identifier is not one of the supported Hijri calendars.
    #[error("Unknown calendar: {0}")]
    UnknownCalendar(String),
}

/// The calendar capability the HWC layer consumes.
///
/// Implementors supply month lengths and a rata die mapping (day 1 being
/// Monday, 1 January 1 of the proleptic Gregorian calendar). Everything else
/// has a provided implementation derived from those.
///
/// Implementations must be exact and consistent per variant: the HWC layer
/// trusts them and only the sequence validator's year-length check would
/// notice a broken table.
pub trait CalendarEngine {
    /// Days in `month` of `year`, `29` or `30` for a consistent table.
    fn days_in_month(&self, year: i32, month: u8, variant: CalendarVariant) -> u8;

    /// Rata die of `date`.
    fn fixed_from_hijri(&self, date: &HijriDate) -> i64;

    /// Hijri date in `variant` for rata die `fixed`.
    fn hijri_from_fixed(&self, fixed: i64, variant: CalendarVariant) -> HijriDate;

    /// Validates and builds a Hijri date.
    ///
    /// # Errors
    /// Returns `DateError::InvalidMonth` or `DateError::InvalidDay` when the
    /// date does not exist in `variant`.
    fn date(
        &self,
        year: i32,
        month: u8,
        day: u8,
        variant: CalendarVariant,
    ) -> Result<HijriDate, DateError> {
        if !(MUHARRAM..=MONTHS_IN_YEAR).contains(&month) {
            return Err(DateError::InvalidMonth { month });
        }
        let max_day = self.days_in_month(year, month, variant);
        if day < MIN_DAY || day > max_day {
            return Err(DateError::InvalidDay {
                year,
                month,
                day,
                max_day,
            });
        }
        Ok(HijriDate::from_parts(year, month, day, variant))
    }

    /// Last day number of `month`; same as [`Self::days_in_month`].
    fn last_day_of_month(&self, year: i32, month: u8, variant: CalendarVariant) -> u8 {
        self.days_in_month(year, month, variant)
    }

    /// ISO weekday of `date`, Monday=1 .. Sunday=7.
    fn iso_weekday(&self, date: &HijriDate) -> u8 {
        iso_weekday_from_fixed(self.fixed_from_hijri(date))
    }

    /// `date` moved by `days` (negative moves backwards).
    fn add_days(&self, date: &HijriDate, days: i64) -> HijriDate {
        self.hijri_from_fixed(self.fixed_from_hijri(date) + days, date.variant())
    }

    /// Signed days from `from` to `to`.
    fn days_between(&self, from: &HijriDate, to: &HijriDate) -> i64 {
        self.fixed_from_hijri(to) - self.fixed_from_hijri(from)
    }
}

impl<E: CalendarEngine + ?Sized> CalendarEngine for &E {
    fn days_in_month(&self, year: i32, month: u8, variant: CalendarVariant) -> u8 {
        (**self).days_in_month(year, month, variant)
    }

    fn fixed_from_hijri(&self, date: &HijriDate) -> i64 {
        (**self).fixed_from_hijri(date)
    }

    fn hijri_from_fixed(&self, fixed: i64, variant: CalendarVariant) -> HijriDate {
        (**self).hijri_from_fixed(fixed, variant)
    }
}

/// ISO weekday of a rata die; day 1 is a Monday.
pub const fn iso_weekday_from_fixed(fixed: i64) -> u8 {
    ((fixed - 1).rem_euclid(DAYS_IN_WEEK as i64) + 1) as u8
}

/// Arithmetic month-length rules shared by the tabular calendars.
///
/// Odd months have 30 days, even months 29, and month 12 gains a day in the
/// 11 leap years of every 30-year cycle. Variants differ only by epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabularRules {
    epoch: i64,
}

impl TabularRules {
    pub const CIVIL: Self = Self { epoch: CIVIL_EPOCH };
    pub const TBLA: Self = Self { epoch: TBLA_EPOCH };

    /// Rata die of 1 Muharram 1 AH
    pub const fn epoch(self) -> i64 {
        self.epoch
    }

    pub const fn is_leap_year(year: i32) -> bool {
        (LEAP_PHASE + LEAP_YEARS_PER_CYCLE * year as i64).rem_euclid(LEAP_CYCLE)
            < LEAP_YEARS_PER_CYCLE
    }

    pub const fn days_in_month(year: i32, month: u8) -> u8 {
        debug_assert!(month != 0 && month <= MONTHS_IN_YEAR);

        if month % 2 == 1 || (month == DHU_AL_HIJJAH && Self::is_leap_year(year)) {
            LONG_MONTH_DAYS
        } else {
            SHORT_MONTH_DAYS
        }
    }

    pub const fn fixed_from_hijri(self, year: i32, month: u8, day: u8) -> i64 {
        let year = year as i64;
        let month = month as i64;
        self.epoch - 1
            + (year - 1) * 354
            + (3 + LEAP_YEARS_PER_CYCLE * year).div_euclid(LEAP_CYCLE)
            + 29 * (month - 1)
            + month.div_euclid(2)
            + day as i64
    }

    pub const fn hijri_from_fixed(self, fixed: i64) -> (i32, u8, u8) {
        let year = (LEAP_CYCLE * (fixed - self.epoch) + YEAR_ESTIMATE_OFFSET)
            .div_euclid(DAYS_PER_CYCLE) as i32;
        let prior_days = fixed - self.fixed_from_hijri(year, MUHARRAM, MIN_DAY);
        let month = (11 * prior_days + 330).div_euclid(325) as u8;
        let day = (fixed - self.fixed_from_hijri(year, month, MIN_DAY) + 1) as u8;
        (year, month, day)
    }
}

/// The bundled calendar engine.
///
/// Civil and Tbla are purely arithmetic ([`TabularRules`]). Umalqura reads
/// month starts for AH 1300–1600 from ICU's Umm al-Qura calendar when the
/// `umalqura` feature is on, and follows the civil rules outside that range
/// (or everywhere without the feature), as ICU does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HijriEngine;

impl HijriEngine {
    pub const fn new() -> Self {
        Self
    }

    const fn rules(variant: CalendarVariant) -> TabularRules {
        match variant {
            CalendarVariant::Tbla => TabularRules::TBLA,
            CalendarVariant::Civil | CalendarVariant::Umalqura => TabularRules::CIVIL,
        }
    }

    /// Rata die of the first day of `month` when the year is covered by
    /// Umm al-Qura data.
    #[cfg(feature = "umalqura")]
    fn umalqura_month_start(self, year: i32, month: u8) -> Option<i64> {
        use icu_calendar::Date;
        use icu_calendar::islamic::IslamicUmmAlQura;

        if !(UMALQURA_FIRST_YEAR..=UMALQURA_LAST_YEAR).contains(&year) {
            return None;
        }
        let date =
            Date::try_new_ummalqura_date(year, month, MIN_DAY, IslamicUmmAlQura::new()).ok()?;
        let iso = date.to_iso();
        Some(fixed_from_iso(
            iso.year().number,
            u8::try_from(iso.month().ordinal).ok()?,
            u8::try_from(iso.day_of_month().0).ok()?,
        ))
    }

    #[cfg(not(feature = "umalqura"))]
    fn umalqura_month_start(self, _year: i32, _month: u8) -> Option<i64> {
        None
    }

    /// Rata die of the first day of `month` in an Umalqura year.
    fn umalqura_start(self, year: i32, month: u8) -> i64 {
        self.umalqura_month_start(year, month)
            .unwrap_or_else(|| TabularRules::CIVIL.fixed_from_hijri(year, month, MIN_DAY))
    }

    fn umalqura_days_in_month(self, year: i32, month: u8) -> u8 {
        let start = self.umalqura_start(year, month);
        let next = if month == DHU_AL_HIJJAH {
            self.umalqura_start(year + 1, MUHARRAM)
        } else {
            self.umalqura_start(year, month + 1)
        };
        u8::try_from(next - start).unwrap_or(LONG_MONTH_DAYS)
    }

    fn umalqura_from_fixed(self, fixed: i64) -> HijriDate {
        let (mut year, ..) = TabularRules::CIVIL.hijri_from_fixed(fixed);
        while self.umalqura_start(year, MUHARRAM) > fixed {
            year -= 1;
        }
        while self.umalqura_start(year + 1, MUHARRAM) <= fixed {
            year += 1;
        }
        let mut month = DHU_AL_HIJJAH;
        while month > MUHARRAM && self.umalqura_start(year, month) > fixed {
            month -= 1;
        }
        let day = u8::try_from(fixed - self.umalqura_start(year, month) + 1).unwrap_or(MIN_DAY);
        HijriDate::from_parts(year, month, day, CalendarVariant::Umalqura)
    }
}

impl CalendarEngine for HijriEngine {
    fn days_in_month(&self, year: i32, month: u8, variant: CalendarVariant) -> u8 {
        match variant {
            CalendarVariant::Umalqura => self.umalqura_days_in_month(year, month),
            CalendarVariant::Civil | CalendarVariant::Tbla => {
                TabularRules::days_in_month(year, month)
            }
        }
    }

    fn fixed_from_hijri(&self, date: &HijriDate) -> i64 {
        match date.variant() {
            CalendarVariant::Umalqura => {
                self.umalqura_start(date.year(), date.month()) + i64::from(date.day()) - 1
            }
            variant @ (CalendarVariant::Civil | CalendarVariant::Tbla) => {
                Self::rules(variant).fixed_from_hijri(date.year(), date.month(), date.day())
            }
        }
    }

    fn hijri_from_fixed(&self, fixed: i64, variant: CalendarVariant) -> HijriDate {
        match variant {
            CalendarVariant::Umalqura => self.umalqura_from_fixed(fixed),
            CalendarVariant::Civil | CalendarVariant::Tbla => {
                let (year, month, day) = Self::rules(variant).hijri_from_fixed(fixed);
                HijriDate::from_parts(year, month, day, variant)
            }
        }
    }
}

/// Rata die of a proleptic Gregorian date.
pub const fn fixed_from_iso(year: i32, month: u8, day: u8) -> i64 {
    let prior = year as i64 - 1;
    let month = month as i64;
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let february_correction = if month <= 2 {
        0
    } else if leap {
        -1
    } else {
        -2
    };
    365 * prior + prior.div_euclid(4) - prior.div_euclid(100)
        + prior.div_euclid(400)
        + (367 * month - 362).div_euclid(12)
        + february_correction
        + day as i64
}
