/// Highest week number an HWC year can have
pub const MAX_WEEK: u8 = 51;

/// Lowest total week count an HWC year can have
pub const MIN_WEEKS_IN_YEAR: u8 = 50;

/// First week of an HWC year
pub const MIN_WEEK: u8 = 1;

/// Days in an HWC week (Saturday=1 .. Friday=7)
pub const DAYS_IN_WEEK: u8 = 7;

/// First HWC weekday (Saturday)
pub const MIN_WEEKDAY: u8 = 1;

/// Last HWC weekday (Friday)
pub const MAX_WEEKDAY: u8 = 7;

/// HWC weekday of the week-anchor date (Tuesday)
pub const ANCHOR_WEEKDAY: u8 = 4;

/// Day of Muharram that always falls in week 1
pub const ANCHOR_DAY: u8 = 4;

/// Days between the pivot day and the last day of the year
pub const PIVOT_OFFSET: u8 = 3;

/// Month number for Muharram
pub const MUHARRAM: u8 = 1;
/// Month number for Dhu al-Hijjah
pub const DHU_AL_HIJJAH: u8 = 12;

/// Months in a Hijri year
pub const MONTHS_IN_YEAR: u8 = 12;

/// First day of month
pub const MIN_DAY: u8 = 1;

/// Days in a long (30 day) month
pub const LONG_MONTH_DAYS: u8 = 30;
/// Days in a short (29 day) month
pub const SHORT_MONTH_DAYS: u8 = 29;

/// Days in a common Hijri year
pub const COMMON_YEAR_DAYS: u16 = 354;
/// Days in a leap Hijri year
pub const LEAP_YEAR_DAYS: u16 = 355;

/// Length of the tabular leap cycle in years
pub(crate) const LEAP_CYCLE: i64 = 30;
/// Leap years per tabular cycle
pub(crate) const LEAP_YEARS_PER_CYCLE: i64 = 11;
/// Phase of the tabular leap rule: year `y` is leap when `(14 + 11y) mod 30 < 11`
pub(crate) const LEAP_PHASE: i64 = 14;
/// Days in a full 30-year tabular cycle
pub(crate) const DAYS_PER_CYCLE: i64 = 10631;
/// Offset in `(30 * days + offset) / 10631` that yields the tabular year of a day
pub(crate) const YEAR_ESTIMATE_OFFSET: i64 = 10646;

/// Rata die of 1 Muharram 1 AH for the civil calendar (Friday epoch)
pub(crate) const CIVIL_EPOCH: i64 = 227_015;
/// Rata die of 1 Muharram 1 AH for the tbla calendar (Thursday epoch)
pub(crate) const TBLA_EPOCH: i64 = 227_014;

/// First year served from Umm al-Qura data
pub const UMALQURA_FIRST_YEAR: i32 = 1300;
/// Last year served from Umm al-Qura data
pub const UMALQURA_LAST_YEAR: i32 = 1600;

/// Date component separator (`yyyy-Www-d`)
pub const DATE_SEPARATOR: char = '-';
/// Week marker (`W` in `yyyy-Www-d` and `yyyyWwwd`)
pub const WEEK_MARKER: char = 'W';
