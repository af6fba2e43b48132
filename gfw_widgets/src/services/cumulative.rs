//! Running totals with comparison-year overlays.

use std::collections::HashMap;

use super::statistics::{compute_stats, latest_year};
use crate::models::{CompareYear, CumulativePoint, DensifiedPoint, StatsPoint};

/// Cumulative view of a full-year densified series.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeSeries {
    /// Running totals of every year.
    pub totals: Vec<DensifiedPoint>,
    /// Latest year with baselines and comparison overlays.
    pub points: Vec<CumulativePoint>,
    pub latest_year: i32,
    pub first_year: i32,
}

/// Replace each count by the running sum within its year.
///
/// Null counts stay null and do not interrupt the sum.
pub fn running_totals(points: &[DensifiedPoint]) -> Vec<DensifiedPoint> {
    let mut totals = Vec::with_capacity(points.len());
    let mut current_year = None;
    let mut acc = 0.0;

    for p in points {
        if current_year != Some(p.year) {
            current_year = Some(p.year);
            acc = 0.0;
        }
        let count = p.count.map(|c| {
            acc += c;
            acc
        });
        totals.push(DensifiedPoint { count, ..p.clone() });
    }

    totals
}

/// Years to overlay for a comparison selection.
///
/// `All` selects every available year, a specific year selects itself when
/// available. No selection yields `None`.
pub fn resolve_compare_years(selection: Option<CompareYear>, available: &[i32]) -> Option<Vec<i32>> {
    match selection? {
        CompareYear::All => Some(available.to_vec()),
        CompareYear::Year(year) => Some(available.iter().copied().filter(|y| *y == year).collect()),
    }
}

/// Attach, for every compared year `y`, the running total found at
/// `(y - (latest_year - point.year), point.week)`.
///
/// This aligns "week N of this year" with "week N of y" whatever the
/// point's own calendar year.
pub fn attach_compare_years(
    stats: Vec<StatsPoint>,
    totals: &[DensifiedPoint],
    latest_year: i32,
    compare_years: Option<&[i32]>,
) -> Vec<CumulativePoint> {
    let lookup: HashMap<(i32, u32), Option<f64>> =
        totals.iter().map(|p| ((p.year, p.week), p.count)).collect();

    stats
        .into_iter()
        .map(|s| {
            let compare = match compare_years {
                Some(years) => {
                    let year_difference = latest_year - s.year();
                    years
                        .iter()
                        .map(|&y| {
                            let value = lookup.get(&(y - year_difference, s.week())).copied().flatten();
                            (y, value)
                        })
                        .collect()
                }
                None => Default::default(),
            };
            CumulativePoint { stats: s, compare }
        })
        .collect()
}

/// Build the cumulative view from a full-year densified series.
///
/// Returns `None` when the series is empty.
pub fn compute_cumulative(
    points: &[DensifiedPoint],
    compare_years: Option<&[i32]>,
) -> Option<CumulativeSeries> {
    let latest = latest_year(points)?;
    let first = points.iter().map(|p| p.year).min()?;

    let totals = running_totals(points);
    let stats = compute_stats(&totals, latest);
    if stats.is_empty() {
        return None;
    }
    let cumulative = attach_compare_years(stats, &totals, latest, compare_years);

    log::debug!(
        "Cumulative: {} points for {} ({} compare years)",
        cumulative.len(),
        latest,
        compare_years.map_or(0, |y| y.len())
    );

    Some(CumulativeSeries {
        totals,
        points: cumulative,
        latest_year: latest,
        first_year: first,
    })
}

/// Point with the largest count.
///
/// On running totals this is the peak yearly total and its year. Ties keep
/// the first point.
pub fn max_week(points: &[DensifiedPoint]) -> Option<&DensifiedPoint> {
    points
        .iter()
        .filter(|p| p.count.is_some())
        .fold(None, |best: Option<&DensifiedPoint>, p| match best {
            Some(b) if b.count >= p.count => Some(b),
            _ => Some(p),
        })
}

/// Index of the last point carrying a count.
pub fn last_reported_index(points: &[CumulativePoint]) -> Option<usize> {
    points.iter().rposition(|p| p.count().is_some())
}
