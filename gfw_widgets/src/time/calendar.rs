//! ISO-8601 week calendar used to size every weekly series.
//!
//! A dataset year is labelled by its calendar year but indexed by ISO week.
//! The last days of December may belong to week 1 of the next ISO year, in
//! which case the year ends one week earlier. The current year ends at the
//! week of the reporting anchor (today minus the reporting lag), never later.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::clock::Clock;
use crate::error::{PipelineError, PipelineResult};

/// Default reporting lag between "now" and the latest week with data.
pub const DEFAULT_LAG_DAYS: i64 = 14;

/// Resolves the last valid ISO week of each year relative to an anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCalendar {
    current_year: i32,
    anchor: NaiveDate,
}

impl WeekCalendar {
    /// Calendar for `today`, with the latest reportable week `lag_days` back.
    pub fn new(today: NaiveDate, lag_days: i64) -> Self {
        Self {
            current_year: today.year(),
            anchor: today - Duration::days(lag_days),
        }
    }

    /// Calendar for the clock's current date.
    pub fn from_clock<C: Clock>(clock: &C, lag_days: i64) -> Self {
        Self::new(clock.today(), lag_days)
    }

    /// Calendar anchored on the dataset's own `latest` date, without lag.
    pub fn from_latest(latest: NaiveDate) -> Self {
        Self::new(latest, 0)
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// The date whose ISO week closes the current year.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Number of ISO weeks attributed to `year`, ignoring the current-year cut.
    ///
    /// This is the ISO week of December 31, or of December 24 when December
    /// 31 already belongs to week 1 of the following ISO year.
    pub fn weeks_in_year(&self, year: i32) -> PipelineResult<u32> {
        let dec_31 = date(year, 12, 31)?;
        let week = dec_31.iso_week().week();
        if week == 1 {
            Ok((dec_31 - Duration::weeks(1)).iso_week().week())
        } else {
            Ok(week)
        }
    }

    /// Last week of `year` that may carry data.
    ///
    /// Returns 0 for years after the current one, and for the current year
    /// while its anchor still falls in the previous ISO year.
    pub fn last_valid_week(&self, year: i32) -> PipelineResult<u32> {
        if year > self.current_year {
            return Ok(0);
        }
        if year < self.current_year {
            return self.weeks_in_year(year);
        }

        let iso = self.anchor.iso_week();
        if iso.year() < year {
            Ok(0)
        } else if iso.year() > year {
            // anchor sits in the last days of December, already in week 1
            self.weeks_in_year(year)
        } else {
            Ok(iso.week())
        }
    }

    /// Monday of ISO week `week` of `year`.
    pub fn week_start(&self, year: i32, week: u32) -> PipelineResult<NaiveDate> {
        week_start(year, week)
    }
}

/// Monday of ISO week `week` of `year`.
pub fn week_start(year: i32, week: u32) -> PipelineResult<NaiveDate> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(|| {
        PipelineError::InvalidCalendar(format!("week {} does not exist in ISO year {}", week, year))
    })
}

fn date(year: i32, month: u32, day: u32) -> PipelineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        PipelineError::InvalidCalendar(format!("{}-{:02}-{:02} is out of range", year, month, day))
    })
}
