use chrono::{
    DateTime,
    Days,
    NaiveDate,
    NaiveTime,
    Utc,
};
use eyre::{
    bail,
    Result,
};
use lens_apps_stats_config::Config;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

/// Optional time window scoping which activity is counted. Both bounds are independent.
///
/// Bounds are calendar days at midnight UTC and both are included: `end` names the last day
/// counted, so a range starting and ending on the same day covers that whole day.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Calendar days are taken at midnight UTC.
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.map(start_of_day),
            end: end.map(start_of_day),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::from_dates(config.from, config.to)
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if end < start)
    }

    /// The request window. Its upper bound is the midnight after the last day.
    pub fn window(&self) -> StatsWindow {
        StatsWindow {
            from_timestamp: self.start.map(|start| start.timestamp()),
            to_timestamp: self.end.map(|end| end_of_day(end).timestamp()),
        }
    }
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(day: DateTime<Utc>) -> DateTime<Utc> {
    let date = day.date_naive();
    start_of_day(date.checked_add_days(Days::new(1)).unwrap_or(date))
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start.format("%Y-%m-%d"))?;
        }
        if self.start.is_some() && self.end.is_some() {
            write!(f, " ")?;
        }
        if let Some(end) = self.end {
            write!(f, "- {}", end.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}

/// Unix-seconds bounds sent with a stats request. Absent bounds are left out of the request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_timestamp: Option<i64>,
}

/// Date range editor: edits are staged and only reach the dashboard through
/// [`RangeFilter::commit`] or [`RangeFilter::reset`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    staged: DateRange,
    committed: DateRange,
}

impl RangeFilter {
    pub fn new(initial: DateRange) -> Self {
        Self {
            staged: initial,
            committed: initial,
        }
    }

    pub fn staged(&self) -> DateRange {
        self.staged
    }

    pub fn committed(&self) -> DateRange {
        self.committed
    }

    pub fn has_pending_edits(&self) -> bool {
        self.staged != self.committed
    }

    pub fn set_start(&mut self, start: DateTime<Utc>) {
        self.staged.start = Some(start);
    }

    pub fn set_end(&mut self, end: DateTime<Utc>) {
        self.staged.end = Some(end);
    }

    /// Lower bound for the end date picker.
    pub fn earliest_end(&self) -> Option<DateTime<Utc>> {
        self.staged.start
    }

    pub fn accepts_end(&self, end: DateTime<Utc>) -> bool {
        self.earliest_end().map_or(true, |start| end >= start)
    }

    /// Publishes the staged range. Inverted ranges are rejected and nothing is published.
    pub fn commit(&mut self) -> Result<DateRange> {
        if self.staged.is_inverted() {
            bail!("Date range {} ends before it starts", self.staged);
        }
        self.committed = self.staged;
        Ok(self.committed)
    }

    /// Clears both bounds and publishes the empty range right away.
    pub fn reset(&mut self) -> DateRange {
        self.staged = DateRange::default();
        self.committed = DateRange::default();
        self.committed
    }
}
