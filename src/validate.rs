//! Sequence validation for generated HWC tables.
//!
//! A table is an ordered, gap-free run of days, each carrying its Hijri date
//! and HWC coordinates. [`validate_sequence`] walks it once and reports every
//! rule the HWC numbering breaks. Only a Hijri year of impossible length
//! aborts the walk, since every later check would be built on a broken
//! calendar table.

use crate::calendar::CalendarEngine;
use crate::consts::{
    ANCHOR_DAY, COMMON_YEAR_DAYS, DAYS_IN_WEEK, DHU_AL_HIJJAH, LEAP_YEAR_DAYS, LONG_MONTH_DAYS,
    MAX_WEEK, MAX_WEEKDAY, MIN_DAY, MIN_WEEK, MIN_WEEKDAY, MIN_WEEKS_IN_YEAR, MUHARRAM,
    PIVOT_OFFSET, SHORT_MONTH_DAYS,
};
use crate::convert::{to_hwc, total_weeks_for};
use crate::prelude::*;
use crate::types::{CalendarVariant, HijriDate, is_valid_week, is_valid_weekday};
use crate::HwcDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, error, info, warn};

/// One row of an HWC table.
///
/// The HWC fields are plain numbers so that corrupt tables can be
/// represented and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceEntry {
    hijri: HijriDate,
    year_of_week: i32,
    week_of_year: u8,
    day_of_week: u8,
}

impl SequenceEntry {
    pub const fn new(hijri: HijriDate, hwc: &HwcDate) -> Self {
        Self::raw(
            hijri,
            hwc.year_of_week(),
            hwc.week_of_year().get(),
            hwc.day_of_week().get(),
        )
    }

    /// A row with arbitrary, unchecked HWC numbers
    pub const fn raw(hijri: HijriDate, year_of_week: i32, week_of_year: u8, day_of_week: u8) -> Self {
        Self {
            hijri,
            year_of_week,
            week_of_year,
            day_of_week,
        }
    }

    /// Converts `hijri` and records the result
    pub fn convert<E: CalendarEngine + ?Sized>(engine: &E, hijri: HijriDate) -> Self {
        Self::new(hijri, &to_hwc(engine, &hijri))
    }

    pub const fn hijri(&self) -> HijriDate {
        self.hijri
    }

    pub const fn year_of_week(&self) -> i32 {
        self.year_of_week
    }

    pub const fn week_of_year(&self) -> u8 {
        self.week_of_year
    }

    pub const fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    const fn is_month_day(&self, month: u8, day: u8) -> bool {
        self.hijri.month() == month && self.hijri.day() == day
    }
}

/// Whether a Hijri year has 354 or 355 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearKind {
    #[display(fmt = "common")]
    Common,
    #[display(fmt = "leap")]
    Leap,
}

/// A numbering rule broken by one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum Rule {
    #[display(fmt = "week {week} is outside 1-51")]
    WeekOutOfRange { week: u8 },

    #[display(fmt = "weekday {weekday} is outside 1-7")]
    WeekdayOutOfRange { weekday: u8 },

    #[display(
        fmt = "{kind} Hijri year {hijri_year} starts on weekday {start_weekday} and so must have {expected} weeks, but has {total_weeks}"
    )]
    StartWeekdayMismatch {
        hijri_year: i32,
        kind: YearKind,
        start_weekday: u8,
        total_weeks: u8,
        expected: u8,
    },

    #[display(fmt = "pivot day of Hijri year {hijri_year} is in week {week}, but the year has {total_weeks} weeks")]
    PivotWeekMismatch {
        hijri_year: i32,
        week: u8,
        total_weeks: u8,
    },

    #[display(fmt = "year {year} follows year {previous}")]
    YearOutOfSequence { previous: i32, year: i32 },

    #[display(fmt = "new year starts with week {week} instead of week 01")]
    YearStartWeek { week: u8 },

    #[display(fmt = "year {previous_year} ends with week {previous_week} instead of week 50 or 51")]
    YearEndWeek { previous_year: i32, previous_week: u8 },

    #[display(fmt = "new year starts on weekday {weekday} instead of weekday 1")]
    YearStartWeekday { weekday: u8 },

    #[display(fmt = "year {previous_year} ends on weekday {previous_weekday} instead of weekday 7")]
    YearEndWeekday {
        previous_year: i32,
        previous_weekday: u8,
    },

    #[display(fmt = "4 Muharram is not in week 01")]
    AnchorOutsideWeekOne,

    #[display(fmt = "week 51 is followed by week {week} instead of week 01")]
    WeekAfterLastWeek { week: u8 },

    #[display(fmt = "week 01 follows week {previous}")]
    WeekOneOutOfSequence { previous: u8 },

    #[display(fmt = "week {week} follows week {previous}")]
    WeekOutOfSequence { previous: u8, week: u8 },

    #[display(fmt = "week closed after {days} weekdays instead of 7")]
    WeekLength { days: u32 },

    #[display(fmt = "weekday 1 follows weekday {previous}")]
    WeekdayOneOutOfSequence { previous: u8 },

    #[display(fmt = "weekday {weekday} follows weekday {previous}")]
    WeekdayOutOfSequence { previous: u8, weekday: u8 },

    #[display(fmt = "duplicate weekday {weekday}")]
    DuplicateWeekday { weekday: u8 },

    #[display(fmt = "one week carries several week numbers {:?}", weeks)]
    InconsistentWeek { weeks: BTreeSet<u8> },

    #[display(fmt = "entry is in {found} but the sequence is in {expected}")]
    VariantMismatch {
        expected: CalendarVariant,
        found: CalendarVariant,
    },
}

/// A rule broken at a given entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    index: usize,
    hijri: HijriDate,
    year: i32,
    week: u8,
    weekday: u8,
    rule: Rule,
}

impl Violation {
    fn new(index: usize, entry: &SequenceEntry, rule: Rule) -> Self {
        Self {
            index,
            hijri: entry.hijri,
            year: entry.year_of_week,
            week: entry.week_of_year,
            weekday: entry.day_of_week,
            rule,
        }
    }

    /// Position of the offending entry in the sequence
    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn hijri(&self) -> HijriDate {
        self.hijri
    }

    /// HWC coordinates of the offending entry
    pub const fn coordinates(&self) -> (i32, u8, u8) {
        (self.year, self.week, self.weekday)
    }

    pub const fn rule(&self) -> &Rule {
        &self.rule
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-W{:02}-{} ({}): {}",
            self.year, self.week, self.weekday, self.hijri, self.rule
        )
    }
}

/// Outcome of a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    entries_checked: usize,
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub const fn entries_checked(&self) -> usize {
        self.entries_checked
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "all {} entries are valid", self.entries_checked);
        }
        write!(
            f,
            "{} violations in {} entries",
            self.violations.len(),
            self.entries_checked
        )?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

/// Fatal validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A Hijri year in the sequence is neither 354 nor 355 days long. The
    /// calendar table that produced it cannot be trusted.
    #[error(
        "Hijri year {year} is {days} days long in the sequence (must be 354 or 355); the {variant} calendar data is broken"
    )]
    ImpossibleYearLength {
        year: i32,
        days: usize,
        variant: CalendarVariant,
    },
}

/// Week count a Hijri year must have, given its kind and the HWC weekday of
/// its first day.
///
/// A year has as many HWC weeks as it has Tuesdays.
pub const fn expected_total_weeks(kind: YearKind, start_weekday: u8) -> u8 {
    match (kind, start_weekday) {
        (_, 1..=4) | (YearKind::Leap, 7) => MAX_WEEK,
        _ => MIN_WEEKS_IN_YEAR,
    }
}

/// Checks an ordered, gap-free HWC table.
///
/// The variant of the first entry is the sequence's variant. Numbering
/// problems are collected into the report; the scan continues past them.
///
/// # Errors
/// Returns `ValidationError::ImpossibleYearLength` as soon as a Hijri year
/// that is complete in the sequence is not 354 or 355 days long.
#[tracing::instrument(skip_all, fields(entries = entries.len()))]
pub fn validate_sequence<E: CalendarEngine + ?Sized>(
    engine: &E,
    entries: &[SequenceEntry],
) -> Result<ValidationReport, ValidationError> {
    let Some(first) = entries.first() else {
        info!("empty HWC sequence");
        return Ok(ValidationReport::default());
    };

    let mut scan = Scan {
        engine,
        entries,
        variant: first.hijri.variant(),
        violations: Vec::new(),
    };
    let mut state = ScanState::new(first);

    scan.check_range(0, first);
    scan.check_hijri_year(0)?;

    for (index, entry) in entries.iter().enumerate().skip(1) {
        scan.check_variant(index, entry);
        scan.check_range(index, entry);

        if entry.hijri.year() != state.hijri_year {
            scan.check_hijri_year(index)?;
        }
        if entry.year_of_week != state.year {
            scan.check_year_change(&state, index, entry);
        } else if entry.week_of_year != state.week {
            scan.check_week_change(&state, index, entry);
        }
        scan.check_weekday(&mut state, index, entry);

        state.advance(entry);
    }

    let report = ValidationReport {
        entries_checked: entries.len(),
        violations: scan.violations,
    };
    info!(
        variant = %scan.variant,
        violations = report.violations.len(),
        "HWC sequence validated"
    );
    Ok(report)
}

/// What the scan remembers about the previous entry and the current week.
#[derive(Debug)]
struct ScanState {
    year: i32,
    week: u8,
    weekday: u8,
    hijri_year: i32,
    days_in_week: u32,
    weeks_seen: BTreeSet<u8>,
}

impl ScanState {
    fn new(first: &SequenceEntry) -> Self {
        Self {
            year: first.year_of_week,
            week: first.week_of_year,
            weekday: first.day_of_week,
            hijri_year: first.hijri.year(),
            days_in_week: u32::from(first.day_of_week),
            weeks_seen: BTreeSet::from([first.week_of_year]),
        }
    }

    fn advance(&mut self, entry: &SequenceEntry) {
        self.year = entry.year_of_week;
        self.week = entry.week_of_year;
        self.weekday = entry.day_of_week;
        self.hijri_year = entry.hijri.year();
        if entry.day_of_week == MIN_WEEKDAY {
            self.days_in_week = 1;
        }
    }
}

struct Scan<'a, E: ?Sized> {
    engine: &'a E,
    entries: &'a [SequenceEntry],
    variant: CalendarVariant,
    violations: Vec<Violation>,
}

impl<E: CalendarEngine + ?Sized> Scan<'_, E> {
    fn record(&mut self, index: usize, entry: &SequenceEntry, rule: Rule) {
        warn!(
            index,
            hijri = %entry.hijri,
            year = entry.year_of_week,
            week = entry.week_of_year,
            weekday = entry.day_of_week,
            %rule,
            "HWC sequence violation"
        );
        self.violations.push(Violation::new(index, entry, rule));
    }

    fn check_variant(&mut self, index: usize, entry: &SequenceEntry) {
        let found = entry.hijri.variant();
        if found != self.variant {
            self.record(
                index,
                entry,
                Rule::VariantMismatch {
                    expected: self.variant,
                    found,
                },
            );
        }
    }

    fn check_range(&mut self, index: usize, entry: &SequenceEntry) {
        if !is_valid_weekday(entry.day_of_week) {
            let weekday = entry.day_of_week;
            self.record(index, entry, Rule::WeekdayOutOfRange { weekday });
        }
        if !is_valid_week(entry.week_of_year) {
            let week = entry.week_of_year;
            self.record(index, entry, Rule::WeekOutOfRange { week });
        }
    }

    /// Checks the Hijri year starting at `index` against the week-count
    /// table. Skipped when the year is incomplete in the sequence.
    fn check_hijri_year(&mut self, index: usize) -> Result<(), ValidationError> {
        let entry = self.entries[index];
        let year = entry.hijri.year();
        if !entry.is_month_day(MUHARRAM, MIN_DAY) {
            debug!(year, "Hijri year starts before the sequence; skipping year checks");
            return Ok(());
        }

        let mut long_end = None;
        let mut short_end = None;
        for (offset, later) in self.entries[index..].iter().enumerate() {
            if later.hijri.year() != year {
                break;
            }
            if later.is_month_day(DHU_AL_HIJJAH, LONG_MONTH_DAYS) {
                long_end = Some(offset);
            } else if later.is_month_day(DHU_AL_HIJJAH, SHORT_MONTH_DAYS) {
                short_end = Some(offset);
            }
        }
        let Some(last) = long_end.or(short_end) else {
            debug!(year, "Hijri year ends after the sequence; skipping year checks");
            return Ok(());
        };

        let days = last + 1;
        let kind = if days == usize::from(COMMON_YEAR_DAYS) {
            YearKind::Common
        } else if days == usize::from(LEAP_YEAR_DAYS) {
            YearKind::Leap
        } else {
            let err = ValidationError::ImpossibleYearLength {
                year,
                days,
                variant: self.variant,
            };
            error!(error = %err, "HWC sequence validation aborted");
            return Err(err);
        };

        let total_weeks = total_weeks_for(self.engine, year, self.variant);
        if is_valid_weekday(entry.day_of_week) {
            let expected = expected_total_weeks(kind, entry.day_of_week);
            if total_weeks != expected {
                self.record(
                    index,
                    &entry,
                    Rule::StartWeekdayMismatch {
                        hijri_year: year,
                        kind,
                        start_weekday: entry.day_of_week,
                        total_weeks,
                        expected,
                    },
                );
            }
        }

        let pivot_index = index + last - usize::from(PIVOT_OFFSET);
        let pivot = self.entries[pivot_index];
        if pivot.year_of_week == year && pivot.week_of_year != total_weeks {
            self.record(
                pivot_index,
                &pivot,
                Rule::PivotWeekMismatch {
                    hijri_year: year,
                    week: pivot.week_of_year,
                    total_weeks,
                },
            );
        }
        Ok(())
    }

    /// The HWC year changed between the previous entry and `entry`.
    fn check_year_change(&mut self, state: &ScanState, index: usize, entry: &SequenceEntry) {
        if i64::from(entry.year_of_week) - i64::from(state.year) != 1 {
            let rule = Rule::YearOutOfSequence {
                previous: state.year,
                year: entry.year_of_week,
            };
            self.record(index, entry, rule);
        }
        if entry.week_of_year != MIN_WEEK {
            let week = entry.week_of_year;
            self.record(index, entry, Rule::YearStartWeek { week });
        }
        if !(MIN_WEEKS_IN_YEAR..=MAX_WEEK).contains(&state.week) {
            let rule = Rule::YearEndWeek {
                previous_year: state.year,
                previous_week: state.week,
            };
            self.record(index, entry, rule);
        }
        if entry.day_of_week != MIN_WEEKDAY {
            let weekday = entry.day_of_week;
            self.record(index, entry, Rule::YearStartWeekday { weekday });
        }
        if state.weekday != MAX_WEEKDAY {
            let rule = Rule::YearEndWeekday {
                previous_year: state.year,
                previous_weekday: state.weekday,
            };
            self.record(index, entry, rule);
        }

        // A window cut short by the end of the sequence passes.
        let window = &self.entries[index..];
        let anchor_seen = window.len() < usize::from(DAYS_IN_WEEK)
            || window
                .iter()
                .take(usize::from(DAYS_IN_WEEK))
                .any(|later| later.is_month_day(MUHARRAM, ANCHOR_DAY));
        if entry.week_of_year == MIN_WEEK && !anchor_seen {
            self.record(index, entry, Rule::AnchorOutsideWeekOne);
        }
    }

    /// The week changed within an HWC year.
    fn check_week_change(&mut self, state: &ScanState, index: usize, entry: &SequenceEntry) {
        let week = entry.week_of_year;
        if state.week == MAX_WEEK && week != MIN_WEEK {
            self.record(index, entry, Rule::WeekAfterLastWeek { week });
        }
        if week == MIN_WEEK {
            if !(MIN_WEEKS_IN_YEAR..=MAX_WEEK).contains(&state.week) {
                let previous = state.week;
                self.record(index, entry, Rule::WeekOneOutOfSequence { previous });
            }
        } else if i16::from(week) - i16::from(state.week) != 1 {
            let previous = state.week;
            self.record(index, entry, Rule::WeekOutOfSequence { previous, week });
        }
    }

    fn check_weekday(&mut self, state: &mut ScanState, index: usize, entry: &SequenceEntry) {
        let weekday = entry.day_of_week;
        if weekday == state.weekday {
            self.record(index, entry, Rule::DuplicateWeekday { weekday });
            return;
        }

        if weekday == MIN_WEEKDAY {
            state.weeks_seen.clear();
            if state.days_in_week != u32::from(DAYS_IN_WEEK) {
                let days = state.days_in_week;
                self.record(index, entry, Rule::WeekLength { days });
            }
            if state.weekday != MAX_WEEKDAY {
                let previous = state.weekday;
                self.record(index, entry, Rule::WeekdayOneOutOfSequence { previous });
            }
        } else if i16::from(weekday) - i16::from(state.weekday) != 1 {
            let previous = state.weekday;
            self.record(index, entry, Rule::WeekdayOutOfSequence { previous, weekday });
        }

        state.days_in_week += 1;
        state.weeks_seen.insert(entry.week_of_year);
        if state.weeks_seen.len() > 1 {
            let weeks = state.weeks_seen.clone();
            self.record(index, entry, Rule::InconsistentWeek { weeks });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HijriEngine;
    use crate::consts::MONTHS_IN_YEAR;
    use std::ops::RangeInclusive;

    fn engine() -> HijriEngine {
        HijriEngine::new()
    }

    /// Every day of `years`, converted
    fn sequence(
        engine: &HijriEngine,
        variant: CalendarVariant,
        years: RangeInclusive<i32>,
    ) -> Vec<SequenceEntry> {
        let mut entries = Vec::new();
        for year in years {
            for month in MUHARRAM..=MONTHS_IN_YEAR {
                for day in MIN_DAY..=engine.last_day_of_month(year, month, variant) {
                    let date = engine.date(year, month, day, variant).unwrap();
                    entries.push(SequenceEntry::convert(engine, date));
                }
            }
        }
        entries
    }

    fn position(entries: &[SequenceEntry], year: i32, month: u8, day: u8) -> usize {
        entries
            .iter()
            .position(|entry| entry.hijri().to_ymd() == (year, month, day))
            .unwrap()
    }

    fn has_rule(report: &ValidationReport, matches: impl Fn(&Rule) -> bool) -> bool {
        report.violations().iter().any(|v| matches(v.rule()))
    }

    fn hwc_position(entries: &[SequenceEntry], year: i32, week: u8, weekday: u8) -> usize {
        entries
            .iter()
            .position(|entry| {
                (entry.year_of_week(), entry.week_of_year(), entry.day_of_week())
                    == (year, week, weekday)
            })
            .unwrap()
    }

    fn relabel(entry: SequenceEntry, year: i32, week: u8, weekday: u8) -> SequenceEntry {
        SequenceEntry::raw(entry.hijri(), year, week, weekday)
    }

    #[track_caller]
    fn assert_violation(report: &ValidationReport, index: usize, rule: &Rule) {
        assert!(
            report
                .violations()
                .iter()
                .any(|v| v.index() == index && v.rule() == rule),
            "expected `{rule}` at entry {index}, got: {report}"
        );
    }

    #[test]
    fn test_generated_sequences_are_valid() {
        let engine = engine();
        let cases = [
            (CalendarVariant::Civil, -3..=3),
            (CalendarVariant::Tbla, 1440..=1450),
            (CalendarVariant::Umalqura, 1440..=1447),
        ];
        for (variant, years) in cases {
            let entries = sequence(&engine, variant, years);
            let report = validate_sequence(&engine, &entries).unwrap();
            assert!(report.is_valid(), "{variant}: {report}");
            assert_eq!(report.entries_checked(), entries.len());
        }
    }

    #[cfg(feature = "umalqura")]
    #[test]
    fn test_umm_al_qura_data_seam_is_valid() {
        let engine = engine();
        let entries = sequence(&engine, CalendarVariant::Umalqura, 1300..=1302);
        let report = validate_sequence(&engine, &entries).unwrap();
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_sequence_starting_mid_year() {
        let engine = engine();
        let entries = sequence(&engine, CalendarVariant::Civil, 1444..=1446);
        let start = position(&entries, 1444, 6, 14);
        let end = position(&entries, 1446, 3, 9);
        let report = validate_sequence(&engine, &entries[start..=end]).unwrap();
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_empty_sequence() {
        let report = validate_sequence(&engine(), &[]).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.entries_checked(), 0);
        assert_eq!(report.to_string(), "all 0 entries are valid");
    }

    #[test]
    fn test_duplicate_weekday() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1445..=1445);
        let index = entries
            .iter()
            .position(|entry| entry.week_of_year() == 10 && entry.day_of_week() == 3)
            .unwrap();
        let next = entries[index + 1];
        entries[index + 1] = SequenceEntry::raw(next.hijri(), next.year_of_week(), 10, 3);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert!(!report.is_valid());
        let duplicate = report
            .violations()
            .iter()
            .find(|v| v.rule() == &Rule::DuplicateWeekday { weekday: 3 })
            .unwrap();
        assert_eq!(duplicate.index(), index + 1);
        assert_eq!(duplicate.coordinates(), (1445, 10, 3));
        assert!(duplicate.to_string().contains("duplicate weekday"));
    }

    #[test]
    fn test_impossible_year_length_is_fatal() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1445..=1447);
        entries.remove(position(&entries, 1446, 5, 10));

        let err = validate_sequence(&engine, &entries).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ImpossibleYearLength {
                year: 1446,
                days: 353,
                variant: CalendarVariant::Civil,
            }
        );
        assert!(err.to_string().contains("353 days"));
    }

    #[test]
    fn test_missing_day_is_reported() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1445..=1445);
        // a leap year one day short still has a possible length
        entries.remove(position(&entries, 1445, 8, 10));

        let report = validate_sequence(&engine, &entries).unwrap();
        assert!(has_rule(&report, |rule| matches!(
            rule,
            Rule::WeekdayOutOfSequence { .. } | Rule::WeekdayOneOutOfSequence { .. }
        )));
    }

    #[test]
    fn test_wrong_week_number() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Tbla, 1445..=1445);
        let index = entries
            .iter()
            .position(|entry| entry.week_of_year() == 10 && entry.day_of_week() == 1)
            .unwrap();
        let entry = entries[index];
        entries[index] = SequenceEntry::raw(entry.hijri(), entry.year_of_week(), 12, 1);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert!(has_rule(&report, |rule| rule
            == &Rule::WeekOutOfSequence {
                previous: 9,
                week: 12
            }));
        assert!(has_rule(&report, |rule| matches!(
            rule,
            Rule::InconsistentWeek { .. }
        )));
    }

    #[test]
    fn test_first_entry_week_counts_for_its_week() {
        let engine = engine();
        let entries = sequence(&engine, CalendarVariant::Civil, 1445..=1445);
        let mut entries = entries[hwc_position(&entries, 1445, 10, 3)..].to_vec();
        entries[0] = relabel(entries[0], 1445, 11, 3);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_violation(&report, 1, &Rule::WeekOutOfSequence { previous: 11, week: 10 });
        assert_violation(
            &report,
            1,
            &Rule::InconsistentWeek {
                weeks: BTreeSet::from([10, 11]),
            },
        );
    }

    #[test]
    fn test_week_one_without_anchor_day() {
        let engine = engine();
        // civil 1444 has 51 weeks, its last week ends on 3 Muharram 1445
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        let last_week = hwc_position(&entries, 1444, 51, 1);
        for entry in &mut entries[last_week..] {
            *entry = if entry.year_of_week() == 1444 {
                relabel(*entry, 1445, 1, entry.day_of_week())
            } else {
                relabel(*entry, 1445, entry.week_of_year() + 1, entry.day_of_week())
            };
        }

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_violation(&report, last_week, &Rule::AnchorOutsideWeekOne);
    }

    #[test]
    fn test_year_starting_with_wrong_week() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        let index = hwc_position(&entries, 1445, 1, 1);
        entries[index] = relabel(entries[index], 1445, 2, 1);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_violation(&report, index, &Rule::YearStartWeek { week: 2 });
        assert_violation(&report, index + 1, &Rule::WeekOneOutOfSequence { previous: 2 });
    }

    #[test]
    fn test_year_ending_with_wrong_week() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        for entry in &mut entries {
            if (entry.year_of_week(), entry.week_of_year()) == (1444, 51) {
                *entry = relabel(*entry, 1444, 49, entry.day_of_week());
            }
        }

        let report = validate_sequence(&engine, &entries).unwrap();
        let index = hwc_position(&entries, 1445, 1, 1);
        assert_violation(
            &report,
            index,
            &Rule::YearEndWeek {
                previous_year: 1444,
                previous_week: 49,
            },
        );
    }

    #[test]
    fn test_year_starting_on_wrong_weekday() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        let index = hwc_position(&entries, 1445, 1, 1);
        entries[index] = relabel(entries[index], 1445, 1, 2);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_violation(&report, index, &Rule::YearStartWeekday { weekday: 2 });
    }

    #[test]
    fn test_year_ending_on_wrong_weekday() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        let last = hwc_position(&entries, 1444, 51, 7);
        entries[last] = relabel(entries[last], 1444, 51, 6);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_violation(
            &report,
            last + 1,
            &Rule::YearEndWeekday {
                previous_year: 1444,
                previous_weekday: 6,
            },
        );
    }

    #[test]
    fn test_short_week() {
        let engine = engine();
        let entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        // no Hijri year is complete in the slice
        let start = position(&entries, 1444, 6, 1);
        let end = position(&entries, 1445, 6, 1);
        let mut entries = entries[start..=end].to_vec();
        let index = hwc_position(&entries, 1444, 30, 4);
        entries.remove(index);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_violation(&report, index, &Rule::WeekdayOutOfSequence { previous: 3, weekday: 5 });
        assert_violation(&report, index + 3, &Rule::WeekLength { days: 6 });
    }

    #[test]
    fn test_start_weekday_mismatch() {
        let engine = engine();
        // civil 1445 is a leap year starting on weekday 5, so it has 50 weeks
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        let index = position(&entries, 1445, 1, 1);
        let entry = entries[index];
        entries[index] = relabel(entry, entry.year_of_week(), entry.week_of_year(), 1);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_violation(
            &report,
            index,
            &Rule::StartWeekdayMismatch {
                hijri_year: 1445,
                kind: YearKind::Leap,
                start_weekday: 1,
                total_weeks: 50,
                expected: 51,
            },
        );
    }

    #[test]
    fn test_pivot_week_mismatch() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        let index = position(&entries, 1445, 12, 27);
        let entry = entries[index];
        entries[index] = relabel(entry, entry.year_of_week(), 49, entry.day_of_week());

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_violation(
            &report,
            index,
            &Rule::PivotWeekMismatch {
                hijri_year: 1445,
                week: 49,
                total_weeks: 50,
            },
        );
    }

    #[test]
    fn test_out_of_range_numbers() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1445..=1445);
        let entry = entries[100];
        entries[100] = SequenceEntry::raw(entry.hijri(), entry.year_of_week(), 60, 9);

        let report = validate_sequence(&engine, &entries).unwrap();
        assert!(has_rule(&report, |rule| rule == &Rule::WeekOutOfRange { week: 60 }));
        assert!(has_rule(&report, |rule| rule == &Rule::WeekdayOutOfRange { weekday: 9 }));
    }

    #[test]
    fn test_broken_year_boundary() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1444..=1445);
        let index = entries
            .iter()
            .position(|entry| entry.year_of_week() == 1445)
            .unwrap();
        for entry in &mut entries[index..] {
            *entry = SequenceEntry::raw(
                entry.hijri(),
                entry.year_of_week() + 1,
                entry.week_of_year(),
                entry.day_of_week(),
            );
        }

        let report = validate_sequence(&engine, &entries).unwrap();
        assert!(has_rule(&report, |rule| rule
            == &Rule::YearOutOfSequence {
                previous: 1444,
                year: 1446
            }));
    }

    #[test]
    fn test_week_after_last_week() {
        let engine = engine();
        // 1444 has 51 weeks
        let mut entries = sequence(&engine, CalendarVariant::Umalqura, 1444..=1445);
        let start = entries
            .iter()
            .position(|entry| entry.year_of_week() == 1444 && entry.week_of_year() == 51)
            .unwrap();
        let entry = entries[start + 7];
        entries[start + 7] = SequenceEntry::raw(entry.hijri(), 1444, 52, entry.day_of_week());

        let report = validate_sequence(&engine, &entries).unwrap();
        assert!(has_rule(&report, |rule| rule == &Rule::WeekAfterLastWeek { week: 52 }));
    }

    #[test]
    fn test_mixed_variants() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1445..=1445);
        let entry = entries[50];
        let (year, month, day) = entry.hijri().to_ymd();
        let other = engine.date(year, month, day, CalendarVariant::Tbla).unwrap();
        entries[50] = SequenceEntry::raw(
            other,
            entry.year_of_week(),
            entry.week_of_year(),
            entry.day_of_week(),
        );

        let report = validate_sequence(&engine, &entries).unwrap();
        assert_eq!(report.violations().len(), 1, "{report}");
        assert_eq!(
            report.violations()[0].rule(),
            &Rule::VariantMismatch {
                expected: CalendarVariant::Civil,
                found: CalendarVariant::Tbla,
            }
        );
    }

    #[test]
    fn test_expected_total_weeks() {
        struct TestCase {
            kind: YearKind,
            start_weekday: u8,
            expected: u8,
        }

        let mut cases = Vec::new();
        for start_weekday in 1..=7 {
            cases.push(TestCase {
                kind: YearKind::Leap,
                start_weekday,
                expected: if matches!(start_weekday, 5 | 6) { 50 } else { 51 },
            });
            cases.push(TestCase {
                kind: YearKind::Common,
                start_weekday,
                expected: if start_weekday <= 4 { 51 } else { 50 },
            });
        }

        for case in &cases {
            assert_eq!(
                expected_total_weeks(case.kind, case.start_weekday),
                case.expected,
                "{} year starting on weekday {}",
                case.kind,
                case.start_weekday
            );
        }
    }

    #[test]
    fn test_parallel_validation() {
        let engine = engine();
        let tables: Vec<Vec<SequenceEntry>> = CalendarVariant::ALL
            .iter()
            .map(|&variant| sequence(&engine, variant, 1444..=1446))
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = tables
                .iter()
                .map(|entries| scope.spawn(move || validate_sequence(&engine, entries)))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap().unwrap().is_valid());
            }
        });
    }

    #[test]
    fn test_report_serde() {
        let engine = engine();
        let mut entries = sequence(&engine, CalendarVariant::Civil, 1445..=1445);
        let entry = entries[20];
        entries[20] = SequenceEntry::raw(entry.hijri(), entry.year_of_week(), 60, entry.day_of_week());
        let report = validate_sequence(&engine, &entries).unwrap();

        let json = serde_json::to_string(&report).unwrap();
        let parsed: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);

        let json = serde_json::to_string(&entries[0]).unwrap();
        let parsed: SequenceEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entries[0]);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<ValidationError>();
    }
}
