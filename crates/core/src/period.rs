use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    /// Bounds given in the wrong order are swapped.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            DateRange { start, end }
        } else {
            DateRange { start: end, end: start }
        }
    }

    /// Smallest range covering every date, or `None` for an empty iterator.
    pub fn spanning<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Option<Self> {
        dates.into_iter().fold(None, |acc, d| match acc {
            None => Some(DateRange::new(d, d)),
            Some(r) => Some(DateRange::new(r.start.min(d), r.end.max(d))),
        })
    }

    /// The `days` long window ending on `end`, clamped at the earliest
    /// representable date.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.max(1) - 1);
        let start = end.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        DateRange::new(start, end)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered, bounds included.
    pub fn days(self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The window of equal length that ends the day before this one starts,
    /// clamped at the earliest representable date. `None` when this range
    /// already starts there.
    pub fn preceding(self) -> Option<Self> {
        let back = (self.days() - 1).unsigned_abs();
        let end = self.start.pred_opt()?;
        let start = end.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Some(DateRange::new(start, end))
    }
}

/// A calendar month, used as the cohort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_ordinal(ordinal: i64) -> Self {
        YearMonth {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn plus(self, months: u32) -> Self {
        YearMonth::from_ordinal(self.ordinal() + i64::from(months))
    }

    pub fn succ(self) -> Self {
        self.plus(1)
    }

    /// Whole months from `earlier` to `self`; negative when `earlier` is later.
    pub fn months_since(self, earlier: YearMonth) -> i64 {
        self.ordinal() - earlier.ordinal()
    }

    /// `None` past the representable calendar.
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month: '{s}'"))?;
        let year = y.parse::<i32>().map_err(|_| format!("Invalid year in '{s}'"))?;
        let month = m.parse::<u32>().map_err(|_| format!("Invalid month in '{s}'"))?;
        YearMonth::new(year, month).ok_or_else(|| format!("Month out of range in '{s}'"))
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Bucket width of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    /// ISO weeks, starting Monday.
    Week,
    Month,
}

impl Granularity {
    pub const DAILY_SPAN_DAYS: i64 = 62;
    pub const WEEKLY_SPAN_DAYS: i64 = 366;

    /// Picks the coarsest bucket that still gives a readable series for the span.
    pub fn for_span(range: DateRange) -> Self {
        match range.days() {
            d if d <= Self::DAILY_SPAN_DAYS => Granularity::Day,
            d if d <= Self::WEEKLY_SPAN_DAYS => Granularity::Week,
            _ => Granularity::Month,
        }
    }

    /// Buckets that would start before the earliest representable date start
    /// there instead.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
            }
            Granularity::Month => YearMonth::of(date).first_day().unwrap_or(date),
        }
    }

    /// Start of the bucket after the one starting at `start`, or `None` past
    /// the end of the calendar.
    pub fn next_bucket(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Day => start.succ_opt(),
            Granularity::Week => start
                .checked_add_days(Days::new(7))
                .map(|d| self.bucket_start(d)),
            Granularity::Month => YearMonth::of(start).succ().first_day(),
        }
    }

    /// Start dates of every bucket touching `range`, ascending.
    pub fn buckets(self, range: DateRange) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let mut cursor = Some(self.bucket_start(range.start));
        while let Some(start) = cursor.filter(|d| *d <= range.end) {
            out.push(start);
            cursor = self.next_bucket(start);
        }
        out
    }
}
