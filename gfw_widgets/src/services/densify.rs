//! Zero-fill densification of sparse weekly observations.

use std::collections::BTreeMap;

use crate::error::PipelineResult;
use crate::models::{DensifiedPoint, RawObservation};
use crate::time::WeekCalendar;

/// How far each year's series extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensifyMode {
    /// Every year stops at its last valid week.
    Truncated,
    /// Every year runs to its full ISO length; unreported weeks of the current
    /// year carry a `None` count.
    FullYear,
}

/// Sum observations per (year, week), across categories.
fn sum_by_week(observations: &[RawObservation]) -> BTreeMap<(i32, u32), f64> {
    let mut by_week: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for obs in observations {
        *by_week.entry((obs.year, obs.week)).or_insert(0.0) += obs.count;
    }
    by_week
}

/// Densify up to each year's last valid week.
pub fn densify(
    observations: &[RawObservation],
    start_year: i32,
    calendar: &WeekCalendar,
) -> PipelineResult<Vec<DensifiedPoint>> {
    densify_with(observations, start_year, calendar, DensifyMode::Truncated)
}

/// Densify every year to its full length, nulling unreported weeks.
pub fn densify_full_years(
    observations: &[RawObservation],
    start_year: i32,
    calendar: &WeekCalendar,
) -> PipelineResult<Vec<DensifiedPoint>> {
    densify_with(observations, start_year, calendar, DensifyMode::FullYear)
}

/// Produce one point per (year, week) for every year in
/// `[start_year, current_year]`, ordered by year then week.
///
/// Missing weeks are filled with a zero count. Observations outside the
/// resulting grid are ignored.
pub fn densify_with(
    observations: &[RawObservation],
    start_year: i32,
    calendar: &WeekCalendar,
    mode: DensifyMode,
) -> PipelineResult<Vec<DensifiedPoint>> {
    let current_year = calendar.current_year();
    if start_year > current_year {
        return Ok(Vec::new());
    }

    let by_week = sum_by_week(observations);
    let mut lengths: BTreeMap<i32, u32> = BTreeMap::new();
    let mut points = Vec::new();

    for year in start_year..=current_year {
        let last_valid = calendar.last_valid_week(year)?;
        let length = match mode {
            DensifyMode::Truncated => last_valid,
            DensifyMode::FullYear => calendar.weeks_in_year(year)?,
        };
        lengths.insert(year, length);

        for week in 1..=length {
            let count = if year == current_year && week > last_valid {
                None
            } else {
                Some(by_week.get(&(year, week)).copied().unwrap_or(0.0))
            };
            points.push(DensifiedPoint {
                year,
                week,
                count,
                date: calendar.week_start(year, week)?,
            });
        }
    }

    let ignored = by_week
        .keys()
        .filter(|(year, week)| lengths.get(year).map_or(true, |len| week > len))
        .count();
    if ignored > 0 {
        log::debug!(
            "Densify: ignored {} (year, week) groups outside {}..={}",
            ignored,
            start_year,
            current_year
        );
    }

    Ok(points)
}

/// First year to display.
///
/// The smallest year with a positive count, moved back one year when that is
/// the current year so there is always a comparison baseline. When no year
/// has a positive count the smallest year present is used. `None` when there
/// are no observations.
pub fn derive_start_year(observations: &[RawObservation], current_year: i32) -> Option<i32> {
    let first_with_data = observations
        .iter()
        .filter(|o| o.count > 0.0)
        .map(|o| o.year)
        .min();
    let first_year = first_with_data.or_else(|| observations.iter().map(|o| o.year).min())?;

    if first_year >= current_year {
        Some(current_year - 1)
    } else {
        Some(first_year)
    }
}
