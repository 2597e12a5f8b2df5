//! Local time resolution and current-hour row selection

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use tracing::debug;

use crate::models::{ForecastSeries, HourlyRecord, Location};
use crate::{DashboardError, Result};

/// Current wall-clock time at the location
pub fn local_now(location: &Location) -> Result<DateTime<FixedOffset>> {
    local_now_at(location, Utc::now())
}

/// Wall-clock time at the location for the given UTC instant
pub fn local_now_at(location: &Location, now_utc: DateTime<Utc>) -> Result<DateTime<FixedOffset>> {
    let seconds = location.utc_offset_seconds.ok_or_else(|| {
        DashboardError::time_resolution(format!("no UTC offset known for {}", location.name))
    })?;
    let offset = FixedOffset::east_opt(seconds).ok_or_else(|| {
        DashboardError::time_resolution(format!(
            "UTC offset {seconds}s for {} is out of range",
            location.name
        ))
    })?;

    Ok(now_utc.with_timezone(&offset))
}

fn hour_key(time: &DateTime<FixedOffset>) -> (NaiveDate, u32) {
    (time.date_naive(), time.hour())
}

/// Pick the record whose local date and hour match `local_now`.
///
/// Records are shifted into the series' own offset before comparing.
/// Zero or several matches are both errors.
pub fn select_current<'a>(
    series: &'a ForecastSeries,
    local_now: &DateTime<FixedOffset>,
) -> Result<&'a HourlyRecord> {
    let offset = series.fixed_offset()?;
    let target = hour_key(local_now);

    let mut matches = series
        .records()
        .iter()
        .filter(|record| hour_key(&record.timestamp.with_timezone(&offset)) == target);

    match (matches.next(), matches.next()) {
        (Some(record), None) => {
            debug!("Selected forecast row at {}", record.timestamp);
            Ok(record)
        }
        (first, _) => {
            let (start, end) = series.time_range();
            let reason = if first.is_some() {
                "several rows match"
            } else {
                "no row matches"
            };
            Err(DashboardError::no_match(format!(
                "{reason} local time {} in series covering {} to {}",
                local_now.format("%Y-%m-%d %H:%M %:z"),
                start.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
                end.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
            )))
        }
    }
}
