//! Cross-year weekly baselines.
//!
//! Every week of the target year is compared with the same ISO week of the
//! other years in the series. The mean is leave-one-out (the target year
//! never contributes to its own baseline), while the band width is the
//! population standard deviation of the target year's own weekly values.
//!
//! The `two_*` bands are anchored on the previous week's mean (the first
//! week uses its own).

use std::collections::BTreeMap;

use crate::models::{DensifiedPoint, StatsPoint};

/// Arithmetic mean, `None` for an empty sample.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation, 0 for an empty sample.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    let Some(m) = mean(values) else {
        return 0.0;
    };
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Latest year present in a series.
pub fn latest_year<'a, I>(points: I) -> Option<i32>
where
    I: IntoIterator<Item = &'a DensifiedPoint>,
{
    points.into_iter().map(|p| p.year).max()
}

/// Leave-one-out mean per week: the average non-null count of every year
/// other than `target_year`.
pub fn weekly_means_excluding(points: &[DensifiedPoint], target_year: i32) -> BTreeMap<u32, f64> {
    let mut samples: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for p in points.iter().filter(|p| p.year != target_year) {
        if let Some(count) = p.count {
            samples.entry(p.week).or_default().push(count);
        }
    }
    samples
        .into_iter()
        .filter_map(|(week, values)| mean(&values).map(|m| (week, m)))
        .collect()
}

/// Compute the baseline of every week of `target_year`.
///
/// Weeks with no sample from another year get a mean of 0. Returns an empty
/// vector when the target year is absent.
pub fn compute_stats(points: &[DensifiedPoint], target_year: i32) -> Vec<StatsPoint> {
    let target: Vec<&DensifiedPoint> = points.iter().filter(|p| p.year == target_year).collect();
    if target.is_empty() {
        return Vec::new();
    }

    let week_means = weekly_means_excluding(points, target_year);
    let means: Vec<f64> = target
        .iter()
        .map(|p| week_means.get(&p.week).copied().unwrap_or(0.0))
        .collect();

    let own_counts: Vec<f64> = target.iter().filter_map(|p| p.count).collect();
    let std_dev = population_std_dev(&own_counts);

    target
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let m = means[i];
            let previous = if i > 0 { means[i - 1] } else { m };
            StatsPoint {
                point: p.clone(),
                mean: m,
                std_dev,
                plus_std_dev: [m, m + std_dev],
                minus_std_dev: [m - std_dev, m],
                two_plus_std_dev: [previous, previous + std_dev],
                two_minus_std_dev: [previous - std_dev, previous],
            }
        })
        .collect()
}

/// Baseline of the latest year in the series.
pub fn compute_latest_stats(points: &[DensifiedPoint]) -> Option<Vec<StatsPoint>> {
    let year = latest_year(points)?;
    let stats = compute_stats(points, year);
    if stats.is_empty() {
        None
    } else {
        Some(stats)
    }
}
