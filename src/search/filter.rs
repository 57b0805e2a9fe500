use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::SearchError;
use crate::utils::trim_trailing_slash;

/// Inclusive timestamp bounds of a search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp
fn parse_bound(value: &str) -> Result<(NaiveDate, Option<DateTime<Utc>>), SearchError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok((date, None));
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(instant) => {
            let instant = instant.with_timezone(&Utc);
            Ok((instant.date_naive(), Some(instant)))
        }
        Err(_) => Err(SearchError::InvalidDate { value: value.to_string() }),
    }
}

impl DateRange {
    /// Build a range from optional bounds.
    ///
    /// A date-only start means the beginning of that day (UTC). The end bound
    /// always extends to the last millisecond of its day.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, SearchError> {
        let start = match start {
            Some(raw) => Some(match parse_bound(raw)? {
                (_, Some(instant)) => instant,
                (date, None) => date.and_time(NaiveTime::MIN).and_utc(),
            }),
            None => None,
        };

        let end = match end {
            Some(raw) => {
                let (date, _) = parse_bound(raw)?;
                let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
                    .ok_or_else(|| SearchError::InvalidDate { value: raw.to_string() })?;
                Some(date.and_time(end_of_day).and_utc())
            }
            None => None,
        };

        Ok(Self { start, end })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a timestamp falls inside the range.
    /// Without a timestamp an entry only passes an unbounded range.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(ts) = timestamp else {
            return false;
        };
        self.start.is_none_or(|start| ts >= start) && self.end.is_none_or(|end| ts <= end)
    }
}

/// Exact project path match, ignoring a trailing `/` on either side
pub fn project_matches(filter: Option<&str>, project_path: &str) -> bool {
    match filter {
        Some(wanted) => trim_trailing_slash(wanted) == trim_trailing_slash(project_path),
        None => true,
    }
}
