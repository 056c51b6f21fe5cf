//! Period calculus
//!
//! Pure functions that map an instant to the rotation period containing it
//! and count period boundaries between two instants. All boundaries are
//! computed on the UTC calendar; callers shift "now" if they want a local
//! calendar (see [`crate::engine::SystemClock`]).
//!
//! Numbering rules:
//! - Daily: ordinal day of year.
//! - Weekly, Monday start: ISO-8601 week number.
//! - Weekly, any other start: running week count since the week containing
//!   2024-01-01 (week 1), never reset by the year.
//! - BiWeekly: `ceil(week / 2)` of the weekly number.
//! - Monthly: month of year.
//! - Custom: window index since 2024-01-01, negative before the epoch.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::rotation::{Frequency, RotationConfig};

/// Fixed anchor for running week counters and custom windows
pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2024, 1, 1) {
    Some(date) => date,
    None => panic!("2024-01-01 is a valid date"),
};

/// Kind of window a period covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Day,
    Week,
    Month,
    Custom,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Day => "day",
            PeriodKind::Week => "week",
            PeriodKind::Month => "month",
            PeriodKind::Custom => "custom",
        }
    }
}

impl RotationConfig {
    /// Kind of period this config produces
    pub fn kind(&self) -> PeriodKind {
        match self.frequency() {
            Frequency::Daily => PeriodKind::Day,
            Frequency::Weekly { .. } | Frequency::BiWeekly { .. } => PeriodKind::Week,
            Frequency::Monthly { .. } => PeriodKind::Month,
            Frequency::Custom { .. } => PeriodKind::Custom,
        }
    }
}

/// A rotation period
///
/// `end` is the last millisecond inside the period; the next period starts
/// at `end + 1ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub period_number: i64,
    #[serde(rename = "startInstant")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endInstant")]
    pub end: DateTime<Utc>,
    pub year: i32,
    pub kind: PeriodKind,
}

impl PeriodInfo {
    /// First instant after the period
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        self.end + Duration::milliseconds(1)
    }

    /// Returns true if `instant` falls inside the period
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end_exclusive()
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// `instant` moved by `days`, pinned to chrono's range instead of overflowing
fn shift_days(instant: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

fn window(start: NaiveDate, days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(start);
    let end = shift_days(start, days) - Duration::milliseconds(1);
    (start, end)
}

/// Most recent `week_start` on or before `date`
fn week_start_date(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_sunday() + 7 - week_start.num_days_from_sunday()) % 7;
    date.checked_sub_signed(Duration::days(i64::from(offset)))
        .unwrap_or(date)
}

/// Running week number for non-ISO week starts; the epoch week is week 1
fn week_counter(date: NaiveDate, week_start: Weekday) -> i64 {
    let epoch_week = week_start_date(EPOCH, week_start);
    let days = (week_start_date(date, week_start) - epoch_week).num_days();
    days.div_euclid(7) + 1
}

/// Week number and the year it is reported against
fn week_number(date: NaiveDate, week_start: Weekday) -> (i64, i32) {
    if week_start == Weekday::Mon {
        let iso = date.iso_week();
        (i64::from(iso.week()), iso.year())
    } else {
        (week_counter(date, week_start), date.year())
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Returns the period containing `instant`
pub fn period_for(instant: DateTime<Utc>, config: &RotationConfig) -> PeriodInfo {
    let date = instant.date_naive();

    match config.frequency() {
        Frequency::Daily => {
            let (start, end) = window(date, 1);
            PeriodInfo {
                period_number: i64::from(date.ordinal()),
                start,
                end,
                year: date.year(),
                kind: PeriodKind::Day,
            }
        }
        Frequency::Weekly { week_start } => {
            let (start, end) = window(week_start_date(date, week_start), 7);
            let (number, year) = week_number(date, week_start);
            PeriodInfo {
                period_number: number,
                start,
                end,
                year,
                kind: PeriodKind::Week,
            }
        }
        Frequency::BiWeekly { week_start } => {
            // Spans the week containing `instant` and the one after it
            let (start, end) = window(week_start_date(date, week_start), 14);
            let (week, year) = week_number(date, week_start);
            PeriodInfo {
                period_number: (week + 1).div_euclid(2),
                start,
                end,
                year,
                kind: PeriodKind::Week,
            }
        }
        Frequency::Monthly { .. } => {
            let first = first_of_month(date);
            let next = first
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX);
            let (start, end) = window(first, (next - first).num_days());
            PeriodInfo {
                period_number: i64::from(date.month()),
                start,
                end,
                year: date.year(),
                kind: PeriodKind::Month,
            }
        }
        Frequency::Custom { interval } => {
            let interval = i64::from(interval.get());
            let index = (date - EPOCH).num_days().div_euclid(interval);
            let first = EPOCH
                .checked_add_signed(Duration::days(index * interval))
                .unwrap_or(if index < 0 { NaiveDate::MIN } else { date });
            let (start, end) = window(first, interval);
            PeriodInfo {
                period_number: index,
                start,
                end,
                year: first.year(),
                kind: PeriodKind::Custom,
            }
        }
    }
}

/// Whole calendar days from `start` to `end`
fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end.date_naive() - start.date_naive()).num_days()
}

/// Week boundaries crossed from `start` to `end`
///
/// With a Monday start this walks ISO (year, week) pairs and assumes 52
/// weeks in every year crossed, so a transition out of a 53-week year counts
/// one week short. Other start days use the running counter, which is exact.
fn weeks_between(start: DateTime<Utc>, end: DateTime<Utc>, week_start: Weekday) -> i64 {
    let (start, end) = (start.date_naive(), end.date_naive());

    if week_start != Weekday::Mon {
        return week_counter(end, week_start) - week_counter(start, week_start);
    }

    let (sw, sy) = week_number(start, week_start);
    let (ew, ey) = week_number(end, week_start);
    let (sy, ey) = (i64::from(sy), i64::from(ey));

    match ey.cmp(&sy) {
        std::cmp::Ordering::Equal => ew - sw,
        std::cmp::Ordering::Greater => (52 - sw) + ew + 52 * (ey - sy - 1),
        std::cmp::Ordering::Less => -((52 - ew) + sw + 52 * (sy - ey - 1)),
    }
}

/// Signed number of period boundaries crossed going from `start` to `end`
pub fn periods_between(start: DateTime<Utc>, end: DateTime<Utc>, config: &RotationConfig) -> i64 {
    match config.frequency() {
        Frequency::Daily => days_between(start, end),
        Frequency::Weekly { week_start } => weeks_between(start, end, week_start),
        Frequency::BiWeekly { week_start } => weeks_between(start, end, week_start).div_euclid(2),
        Frequency::Monthly { .. } => {
            let years = i64::from(end.year() - start.year());
            let months = i64::from(end.month()) - i64::from(start.month());
            years * 12 + months
        }
        // Truncates toward zero so the count is antisymmetric
        Frequency::Custom { interval } => days_between(start, end) / i64::from(interval.get()),
    }
}

/// Returns true if `current` lies in a later period than `last`
pub fn is_new_period(last: DateTime<Utc>, current: DateTime<Utc>, config: &RotationConfig) -> bool {
    periods_between(last, current, config) > 0
}

/// Moves `instant` forward by `periods` whole periods
///
/// Monthly steps are calendar months from `instant`, clamped to the end of
/// shorter months (Jan 31 + 1 month = Feb 28/29).
pub fn advance_by(instant: DateTime<Utc>, periods: u32, config: &RotationConfig) -> DateTime<Utc> {
    let periods = i64::from(periods);
    match config.frequency() {
        Frequency::Daily => shift_days(instant, periods),
        Frequency::Weekly { .. } => shift_days(instant, 7 * periods),
        Frequency::BiWeekly { .. } => shift_days(instant, 14 * periods),
        Frequency::Monthly { .. } => u32::try_from(periods)
            .ok()
            .and_then(|p| instant.checked_add_months(Months::new(p)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        Frequency::Custom { interval } => {
            shift_days(instant, periods * i64::from(interval.get()))
        }
    }
}
