//! Calendar periods and date ranges
//!
//! Shared by the trend model (bucketing records into periods), the query
//! interpreter (resolving phrases like "last month") and the insight engine
//! (current vs previous month windows).
//!
//! Nothing in here reads the system clock: every relative phrase is resolved
//! against a `now` date supplied by the caller.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, Duration, Months, NaiveDate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size of the buckets a time series is split into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Monthly,
    Weekly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }

    /// First day of the bucket containing `date` (weeks start on Monday)
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Monthly => month_start(date),
            Self::Weekly => week_start(date),
        }
    }

    /// First day of the bucket following the one starting at `start`
    pub fn next_bucket(&self, start: NaiveDate) -> NaiveDate {
        match self {
            Self::Monthly => add_months(month_start(start), 1),
            Self::Weekly => week_start(start)
                .checked_add_signed(Duration::days(7))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Full date range of the bucket containing `date`
    pub fn bucket_range(&self, date: NaiveDate) -> DateRange {
        let start = self.bucket_start(date);
        let end = self.next_bucket(start).pred_opt().unwrap_or(start);
        DateRange { start, end }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "weekly" | "week" => Ok(Self::Weekly),
            _ => Err(format!(
                "Unknown granularity: {} (valid: monthly, weekly)",
                s
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range; bounds given in the wrong order are swapped
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The whole calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        Granularity::Monthly.bucket_range(date)
    }

    /// The whole calendar month before the one containing `date`
    pub fn previous_month(date: NaiveDate) -> Self {
        Self::month_of(sub_months(month_start(date), 1))
    }

    /// The whole calendar year containing `date`
    pub fn year_of(date: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
        let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

fn sub_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

/// Parse a caller-supplied reference date ("now") in `YYYY-MM-DD` form
pub fn parse_reference_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|e| {
        Error::InvalidInput(format!(
            "Invalid reference date '{}' (use YYYY-MM-DD): {}",
            text, e
        ))
    })
}

/// Parse `YYYY-MM-DD` or `YYYY/MM/DD`, returning None for impossible dates
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&text.replace('/', "-"), "%Y-%m-%d").ok()
}

const DATE: &str = r"(\d{4}[-/]\d{1,2}[-/]\d{1,2})";
const MONTH: &str = r"(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec)";

struct DatePatterns {
    between: Regex,
    from_to: Regex,
    since: Regex,
    last_n: Regex,
    fixed: Regex,
    in_month: Regex,
    month_year: Regex,
    single: Regex,
}

fn patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DatePatterns {
        between: Regex::new(&format!(r"\bbetween\s+{DATE}\s+and\s+{DATE}")).expect("valid regex"),
        from_to: Regex::new(&format!(r"\bfrom\s+{DATE}\s+(?:to|until|through|till)\s+{DATE}"))
            .expect("valid regex"),
        since: Regex::new(&format!(r"\bsince\s+{DATE}")).expect("valid regex"),
        last_n: Regex::new(r"\b(?:last|past|previous)\s+(\d{1,4})\s+(day|week|month|year)s?\b")
            .expect("valid regex"),
        fixed: Regex::new(
            r"\b(today|yesterday|this week|last week|this month|last month|this year|last year)\b",
        )
        .expect("valid regex"),
        in_month: Regex::new(&format!(r"\b(?:in|during)\s+{MONTH}\b(?:\s+(\d{{4}})\b)?"))
            .expect("valid regex"),
        month_year: Regex::new(&format!(r"\b{MONTH}\s+(\d{{4}})\b")).expect("valid regex"),
        single: Regex::new(&format!(r"(?:^|[^\d]){DATE}(?:$|[^\d])")).expect("valid regex"),
    })
}

/// Resolve the first recognized date expression in `text` against `now`
///
/// Rules are tried in a fixed order (explicit ranges, "since", "last N
/// units", fixed relative phrases, month names, a single explicit date) and
/// the first one that matches wins. Returns None when nothing is recognized;
/// callers treat that as "all time".
pub fn parse_date_range(text: &str, now: NaiveDate) -> Option<DateRange> {
    let text = text.to_lowercase();
    let p = patterns();

    if let Some(range) = p.between.captures(&text).and_then(|c| explicit_range(&c)) {
        return Some(range);
    }
    if let Some(range) = p.from_to.captures(&text).and_then(|c| explicit_range(&c)) {
        return Some(range);
    }
    if let Some(start) = p.since.captures(&text).and_then(|c| parse_iso_date(&c[1])) {
        return Some(DateRange::new(start, now));
    }
    if let Some(range) = p.last_n.captures(&text).and_then(|c| last_n_units(&c, now)) {
        return Some(range);
    }
    if let Some(c) = p.fixed.captures(&text) {
        return Some(fixed_phrase(&c[1], now));
    }
    if let Some(range) = p.in_month.captures(&text).and_then(|c| named_month(&c, now)) {
        return Some(range);
    }
    if let Some(range) = p.month_year.captures(&text).and_then(|c| named_month(&c, now)) {
        return Some(range);
    }
    if let Some(date) = p.single.captures(&text).and_then(|c| parse_iso_date(&c[1])) {
        return Some(DateRange::single_day(date));
    }

    None
}

fn explicit_range(c: &Captures<'_>) -> Option<DateRange> {
    let start = parse_iso_date(&c[1])?;
    let end = parse_iso_date(&c[2])?;
    Some(DateRange::new(start, end))
}

/// The `n` units ending on `now`, both ends included ("last 7 days" is 7 days)
fn last_n_units(c: &Captures<'_>, now: NaiveDate) -> Option<DateRange> {
    let n: u32 = c[1].parse().ok()?;
    if n == 0 {
        return None;
    }
    let before = match &c[2] {
        "day" => sub_days(now, n as i64),
        "week" => sub_days(now, 7 * n as i64),
        "month" => sub_months(now, n),
        "year" => sub_months(now, 12 * n),
        _ => return None,
    };
    let start = before.succ_opt().unwrap_or(before);
    Some(DateRange::new(start, now))
}

fn fixed_phrase(phrase: &str, now: NaiveDate) -> DateRange {
    match phrase {
        "today" => DateRange::single_day(now),
        "yesterday" => DateRange::single_day(sub_days(now, 1)),
        "this week" => DateRange::new(week_start(now), now),
        "last week" => Granularity::Weekly.bucket_range(sub_days(week_start(now), 1)),
        "this month" => DateRange::new(month_start(now), now),
        "last month" => DateRange::previous_month(now),
        "this year" => DateRange::new(DateRange::year_of(now).start, now),
        "last year" => DateRange::year_of(sub_months(now, 12)),
        _ => DateRange::single_day(now),
    }
}

fn named_month(c: &Captures<'_>, now: NaiveDate) -> Option<DateRange> {
    let month = month_number(&c[1])?;
    let year = match c.get(2) {
        Some(y) => y.as_str().parse().ok()?,
        // Without a year, the most recent such month that is not in the future
        None if month > now.month() => now.year() - 1,
        None => now.year(),
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(DateRange::month_of(first))
}

fn month_number(name: &str) -> Option<u32> {
    let month = match &name[..3] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
