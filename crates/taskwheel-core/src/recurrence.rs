//! Recurrence-rule engine.
//!
//! A rule is a short whitespace-separated text such as `d 7`, `y`, `w 1,5`
//! or `m -1,15 1,6`. Parsing produces a typed [`RecurrenceRule`]; the same
//! parser backs both the creation-time validator and the next-date
//! computation, so the two cannot drift apart.
//!
//! The engine works on whole calendar dates only ([`chrono::NaiveDate`]).
//! There is no time-of-day and no timezone; the wire format is the 8-digit
//! `YYYYMMDD` form, whose lexicographic order agrees with chronological
//! order because it is zero-padded and fixed-width.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use thiserror::Error;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Upper bound for the daily rule interval.
pub const MAX_INTERVAL_DAYS: i64 = 400;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("empty repeat rule")]
    EmptyRule,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid repeat format")]
    InvalidFormat,

    #[error("invalid day: {0}")]
    InvalidDay(String),

    #[error("invalid month: {0}")]
    InvalidMonth(String),

    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),

    #[error("daily interval out of range: {0}")]
    MaxDaysExceeded(i64),

    #[error("unsupported repeat rule: {0}")]
    UnsupportedRule(String),
}

/// A day selector within a monthly rule.
///
/// `Last` and `SecondLast` (`-1` and `-2` in rule text) follow the month
/// length instead of naming a fixed day number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MonthDay {
    Day(u32),
    SecondLast,
    Last,
}

/// A parsed, internally consistent recurrence rule.
///
/// Values are only ever produced by parsing; malformed text never yields a
/// rule. Day and weekday collections are sets, so duplicates in the input
/// are absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// `d <n>`: every `n` calendar days counted from the anchor.
    Daily { interval: u32 },
    /// `y`: the same month and day every year.
    Yearly,
    /// `w <d,..>`: ISO weekdays, 1 = Monday .. 7 = Sunday.
    Weekly { weekdays: BTreeSet<u32> },
    /// `m <d,..> [<mon,..>]`: days of the month, optionally restricted to a
    /// set of months. An empty month set means every month.
    Monthly {
        days: BTreeSet<MonthDay>,
        months: BTreeSet<u32>,
    },
}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let kind = tokens.next().ok_or(RecurrenceError::EmptyRule)?;
        let args: Vec<&str> = tokens.collect();

        match kind {
            "d" => {
                if args.len() != 1 {
                    return Err(RecurrenceError::InvalidFormat);
                }
                let interval: i64 = args[0]
                    .parse()
                    .map_err(|_| RecurrenceError::InvalidFormat)?;
                if !(1..=MAX_INTERVAL_DAYS).contains(&interval) {
                    return Err(RecurrenceError::MaxDaysExceeded(interval));
                }
                Ok(Self::Daily {
                    interval: interval as u32,
                })
            }
            "y" => {
                if !args.is_empty() {
                    return Err(RecurrenceError::InvalidFormat);
                }
                Ok(Self::Yearly)
            }
            "w" => {
                if args.len() != 1 {
                    return Err(RecurrenceError::InvalidFormat);
                }
                let mut weekdays = BTreeSet::new();
                for token in args[0].split(',') {
                    let weekday: i64 = token
                        .parse()
                        .map_err(|_| RecurrenceError::InvalidWeekday(token.to_string()))?;
                    if !(1..=7).contains(&weekday) {
                        return Err(RecurrenceError::InvalidWeekday(token.to_string()));
                    }
                    weekdays.insert(weekday as u32);
                }
                Ok(Self::Weekly { weekdays })
            }
            "m" => {
                if args.is_empty() || args.len() > 2 {
                    return Err(RecurrenceError::InvalidFormat);
                }
                let mut days = BTreeSet::new();
                for token in args[0].split(',') {
                    let day = match token {
                        "-1" => MonthDay::Last,
                        "-2" => MonthDay::SecondLast,
                        _ => {
                            let day: i64 = token
                                .parse()
                                .map_err(|_| RecurrenceError::InvalidDay(token.to_string()))?;
                            if !(1..=31).contains(&day) {
                                return Err(RecurrenceError::InvalidDay(token.to_string()));
                            }
                            MonthDay::Day(day as u32)
                        }
                    };
                    days.insert(day);
                }
                let mut months = BTreeSet::new();
                if let Some(list) = args.get(1) {
                    for token in list.split(',') {
                        let month: i64 = token
                            .parse()
                            .map_err(|_| RecurrenceError::InvalidMonth(token.to_string()))?;
                        if !(1..=12).contains(&month) {
                            return Err(RecurrenceError::InvalidMonth(token.to_string()));
                        }
                        months.insert(month as u32);
                    }
                }
                Ok(Self::Monthly { days, months })
            }
            other => Err(RecurrenceError::UnsupportedRule(other.to_string())),
        }
    }
}

impl RecurrenceRule {
    /// Advances from `anchor` to the first date that satisfies this rule and
    /// falls strictly after `after`.
    ///
    /// Every variant steps before testing, so the anchor itself is never
    /// returned. Candidates that satisfy the rule but are not yet past
    /// `after` are skipped; this fast-forwards anchors that lie far in the
    /// past. The candidate date strictly increases on every step, so the
    /// loops terminate for any finite `after`.
    ///
    /// Weekly and monthly variants walk one day at a time and test a
    /// predicate; there is no closed-form shortcut around the `-1`/`-2`
    /// markers and month filters.
    pub fn next_occurrence(&self, anchor: NaiveDate, after: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily { interval } => {
                let step = Days::new(u64::from(*interval));
                let mut date = anchor + step;
                while date <= after {
                    date = date + step;
                }
                date
            }
            Self::Yearly => {
                // chrono clamps to the end of the target month, so a
                // Feb 29 anchor lands on Feb 28 in non-leap years.
                let mut date = anchor + Months::new(12);
                while date <= after {
                    date = date + Months::new(12);
                }
                date
            }
            Self::Weekly { weekdays } => {
                let mut date = anchor;
                loop {
                    date = date + Days::new(1);
                    if date > after && weekdays.contains(&date.weekday().number_from_monday()) {
                        return date;
                    }
                }
            }
            Self::Monthly { days, months } => {
                let mut date = anchor;
                loop {
                    date = date + Days::new(1);
                    if date <= after {
                        continue;
                    }
                    if !months.is_empty() && !months.contains(&date.month()) {
                        continue;
                    }
                    if month_day_matches(days, date) {
                        return date;
                    }
                }
            }
        }
    }
}

/// Day predicate for monthly rules, markers first.
fn month_day_matches(days: &BTreeSet<MonthDay>, date: NaiveDate) -> bool {
    if days.contains(&MonthDay::Last) && is_last_day_of_month(date) {
        return true;
    }
    if days.contains(&MonthDay::SecondLast) && is_second_last_day_of_month(date) {
        return true;
    }
    days.contains(&MonthDay::Day(date.day()))
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    (date + Days::new(1)).month() != date.month()
}

fn is_second_last_day_of_month(date: NaiveDate) -> bool {
    (date + Days::new(2)).month() != date.month()
}

/// Computes the next occurrence of a repeat rule as `YYYYMMDD` text.
///
/// `now` is the reference instant: the result is the first occurrence of
/// `repeat`, counted from the `date` anchor, that falls strictly after it.
/// Stateless and side-effect-free; the rule text is re-parsed on every call.
pub fn next_date(now: NaiveDate, date: &str, repeat: &str) -> Result<String, RecurrenceError> {
    if repeat.is_empty() {
        return Err(RecurrenceError::EmptyRule);
    }
    let anchor = parse_date(date)?;
    let rule: RecurrenceRule = repeat.parse()?;
    Ok(format_date(rule.next_occurrence(anchor, now)))
}

/// Structural validation for rule text.
///
/// Accepts and rejects exactly what [`RecurrenceRule::from_str`] does.
pub fn validate_rule(repeat: &str) -> Result<(), RecurrenceError> {
    repeat.parse::<RecurrenceRule>().map(|_| ())
}

/// Parses an 8-digit `YYYYMMDD` calendar date.
///
/// The length check pins the accepted inputs to the fixed-width form;
/// shorter spellings that chrono would otherwise tolerate are rejected.
pub fn parse_date(text: &str) -> Result<NaiveDate, RecurrenceError> {
    if text.len() != 8 {
        return Err(RecurrenceError::InvalidDate(text.to_string()));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| RecurrenceError::InvalidDate(text.to_string()))
}

/// Formats a calendar date in the 8-digit `YYYYMMDD` form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
