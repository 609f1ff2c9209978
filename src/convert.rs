//! Conversion between Hijri dates and HWC dates.
//!
//! A week belongs to the Hijri year containing its Tuesday (HWC weekday 4),
//! the same way an ISO week belongs to the year of its Thursday. Week 1 is
//! therefore the week containing 4 Muharram.

use crate::calendar::CalendarEngine;
use crate::consts::{
    ANCHOR_DAY, ANCHOR_WEEKDAY, DAYS_IN_WEEK, DHU_AL_HIJJAH, MAX_WEEK, MIN_DAY, MUHARRAM,
    PIVOT_OFFSET,
};
use crate::types::{CalendarVariant, HijriDate, Week, Weekday};
use crate::HwcDate;

/// Converts a Hijri date to its HWC date.
///
/// ```
/// use hijri_week::{CalendarEngine, CalendarVariant, HijriEngine, to_hwc};
///
/// let engine = HijriEngine::new();
/// let date = engine.date(1445, 6, 14, CalendarVariant::Tbla).unwrap();
/// assert_eq!(to_hwc(&engine, &date).to_string(), "1445-W24-4");
/// ```
pub fn to_hwc<E: CalendarEngine + ?Sized>(engine: &E, date: &HijriDate) -> HwcDate {
    let day_of_week = Weekday::from_iso(engine.iso_weekday(date));
    let anchor = engine.add_days(
        date,
        i64::from(ANCHOR_WEEKDAY) - i64::from(day_of_week.get()),
    );
    let year_start = HijriDate::from_parts(anchor.year(), MUHARRAM, MIN_DAY, date.variant());
    let days = engine.days_between(&year_start, &anchor);
    let week = Week::clamped(days / i64::from(DAYS_IN_WEEK) + 1, MAX_WEEK);

    HwcDate::new(anchor.year(), week, day_of_week, date.variant())
}

/// Converts an HWC date back to the Hijri date it names.
///
/// The week is not checked against the year's week count: week 51 of a
/// 50-week year lands in week 1 of the following year.
pub fn from_hwc<E: CalendarEngine + ?Sized>(engine: &E, hwc: &HwcDate) -> HijriDate {
    let anchor = HijriDate::from_parts(hwc.year_of_week(), MUHARRAM, ANCHOR_DAY, hwc.variant());
    let anchor_weekday = Weekday::from_iso(engine.iso_weekday(&anchor));
    let offset = (i64::from(hwc.week_of_year().get()) - 1) * i64::from(DAYS_IN_WEEK)
        + i64::from(hwc.day_of_week().get())
        - i64::from(anchor_weekday.get());

    engine.add_days(&anchor, offset)
}

/// Number of HWC weeks (50 or 51) in `year`.
///
/// The week containing the fourth-to-last day of Dhu al-Hijjah is always the
/// year's last week.
pub fn total_weeks_for<E: CalendarEngine + ?Sized>(
    engine: &E,
    year: i32,
    variant: CalendarVariant,
) -> u8 {
    let last_day = engine.last_day_of_month(year, DHU_AL_HIJJAH, variant);
    let pivot = HijriDate::from_parts(year, DHU_AL_HIJJAH, last_day - PIVOT_OFFSET, variant);
    to_hwc(engine, &pivot).week_of_year().get()
}

impl HijriDate {
    /// HWC date of this day, see [`to_hwc`]
    pub fn hwc<E: CalendarEngine + ?Sized>(&self, engine: &E) -> HwcDate {
        to_hwc(engine, self)
    }

    pub fn year_of_week<E: CalendarEngine + ?Sized>(&self, engine: &E) -> i32 {
        to_hwc(engine, self).year_of_week()
    }

    pub fn week_of_year<E: CalendarEngine + ?Sized>(&self, engine: &E) -> Week {
        to_hwc(engine, self).week_of_year()
    }

    pub fn hwc_day_of_week<E: CalendarEngine + ?Sized>(&self, engine: &E) -> Weekday {
        Weekday::from_iso(engine.iso_weekday(self))
    }

    /// Week count of this day's own Hijri year (not of its week-numbering year)
    pub fn weeks_in_year<E: CalendarEngine + ?Sized>(&self, engine: &E) -> u8 {
        total_weeks_for(engine, self.year(), self.variant())
    }
}

impl HwcDate {
    /// Hijri date named by this HWC date, see [`from_hwc`]
    pub fn to_hijri<E: CalendarEngine + ?Sized>(&self, engine: &E) -> HijriDate {
        from_hwc(engine, self)
    }
}
