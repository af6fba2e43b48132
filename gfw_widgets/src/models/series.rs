//! Weekly series points produced by the densifier, the statistics engine
//! and the cumulative aggregator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A `[low, high]` band around a weekly mean.
pub type Band = [f64; 2];

/// One point per (year, ISO week).
///
/// `count` is `None` only for weeks of the current year that have not been
/// reported yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensifiedPoint {
    pub year: i32,
    pub week: u32,
    pub count: Option<f64>,
    /// Monday of the ISO week.
    pub date: NaiveDate,
}

/// A densified point of the target year with its cross-year baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPoint {
    #[serde(flatten)]
    pub point: DensifiedPoint,
    pub mean: f64,
    pub std_dev: f64,
    pub plus_std_dev: Band,
    pub minus_std_dev: Band,
    pub two_plus_std_dev: Band,
    pub two_minus_std_dev: Band,
}

impl StatsPoint {
    pub fn year(&self) -> i32 {
        self.point.year
    }

    pub fn week(&self) -> u32 {
        self.point.week
    }

    pub fn count(&self) -> Option<f64> {
        self.point.count
    }

    pub fn date(&self) -> NaiveDate {
        self.point.date
    }

    /// Five-way status of this point's count against its bands.
    pub fn status(&self) -> StatusBand {
        StatusBand::classify(self)
    }
}

/// A stats point over running totals, with comparison-year overlays.
///
/// `compare` holds, per compared year, that year's running total at the
/// same week offset; it is flattened so each year becomes its own key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativePoint {
    #[serde(flatten)]
    pub stats: StatsPoint,
    #[serde(flatten)]
    pub compare: BTreeMap<i32, Option<f64>>,
}

impl CumulativePoint {
    pub fn year(&self) -> i32 {
        self.stats.year()
    }

    pub fn week(&self) -> u32 {
        self.stats.week()
    }

    pub fn count(&self) -> Option<f64> {
        self.stats.count()
    }

    pub fn date(&self) -> NaiveDate {
        self.stats.date()
    }

    pub fn compare_value(&self, year: i32) -> Option<f64> {
        self.compare.get(&year).copied().flatten()
    }
}

/// Status of a weekly value relative to its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusBand {
    #[serde(rename = "unusually low")]
    UnusuallyLow,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "unusually high")]
    UnusuallyHigh,
}

impl StatusBand {
    pub fn label(&self) -> &'static str {
        match self {
            StatusBand::UnusuallyLow => "unusually low",
            StatusBand::Low => "low",
            StatusBand::Normal => "normal",
            StatusBand::High => "high",
            StatusBand::UnusuallyHigh => "unusually high",
        }
    }

    /// Position in a five-color ramp ordered from "unusually high" to
    /// "unusually low".
    pub fn ramp_position(&self) -> usize {
        match self {
            StatusBand::UnusuallyHigh => 0,
            StatusBand::High => 1,
            StatusBand::Normal => 2,
            StatusBand::Low => 3,
            StatusBand::UnusuallyLow => 4,
        }
    }

    /// Classifies a stats point against its own bands.
    ///
    /// Evaluated in order: above `two_plus_std_dev` is unusually high, inside
    /// it is high, inside `(minus_std_dev[0], plus_std_dev[1]]` is normal,
    /// inside `[two_minus_std_dev[0], two_minus_std_dev[1])` is low, and
    /// anything else (including a null count) is unusually low.
    pub fn classify(point: &StatsPoint) -> StatusBand {
        let Some(c) = point.count() else {
            return StatusBand::UnusuallyLow;
        };
        let two_plus = point.two_plus_std_dev;
        let two_minus = point.two_minus_std_dev;

        if c > two_plus[1] {
            StatusBand::UnusuallyHigh
        } else if c <= two_plus[1] && c > two_plus[0] {
            StatusBand::High
        } else if c <= point.plus_std_dev[1] && c > point.minus_std_dev[0] {
            StatusBand::Normal
        } else if c >= two_minus[0] && c < two_minus[1] {
            StatusBand::Low
        } else {
            StatusBand::UnusuallyLow
        }
    }

    /// Classifies a running total by how many standard deviations it sits
    /// from the mean, as the cumulative widgets do.
    pub fn from_deviation(value: f64, mean: f64, std_dev: f64) -> StatusBand {
        if value > mean + 2.0 * std_dev {
            StatusBand::UnusuallyHigh
        } else if value > mean + std_dev {
            StatusBand::High
        } else if value > mean - std_dev {
            StatusBand::Normal
        } else if value > mean - 2.0 * std_dev {
            StatusBand::Low
        } else {
            StatusBand::UnusuallyLow
        }
    }
}

impl fmt::Display for StatusBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
