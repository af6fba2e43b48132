//! Declarative chart descriptors for the weekly and cumulative widgets.
//!
//! Everything here is a pure mapping from derived series to serializable
//! values; formatting closures are replaced by strftime strings and
//! [`UnitFormat`] tags that the host applies.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::cumulative::{last_reported_index, CumulativeSeries};
use super::format::format_thousands;
use super::palette::sample_ramp;
use crate::models::{ColorPalette, CumulativePoint, StatsPoint, WidgetSettings};

/// Fewer brushed points than this switches the axis to day ticks.
const DAY_TICKS_BELOW: usize = 12;
const BRUSH_MINIMUM_GAP: usize = 4;
const NULL_VALUE: &str = "No data available";
const TOOLTIP_DATE_FORMAT: &str = "%b %d %Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XAxis {
    pub tick_count: u32,
    pub interval: u32,
    pub scale: String,
    /// strftime pattern for tick labels.
    pub tick_format: String,
}

impl XAxis {
    /// Month ticks over a long range.
    pub fn months() -> Self {
        Self {
            tick_count: 12,
            interval: 4,
            scale: "point".to_string(),
            tick_format: "%b".to_string(),
        }
    }

    /// Day ticks over a short range.
    pub fn days() -> Self {
        Self {
            tick_count: 5,
            interval: 0,
            scale: "point".to_string(),
            tick_format: "%b-%d".to_string(),
        }
    }

    /// Axis for a brush window, day ticks when both ends are set and the
    /// window spans fewer than 12 points.
    pub fn for_window(start_index: Option<usize>, end_index: Option<usize>) -> Self {
        match (start_index, end_index) {
            (Some(start), Some(end)) if end.saturating_sub(start) < DAY_TICKS_BELOW => Self::days(),
            _ => Self::months(),
        }
    }
}

/// Formatting applied to a tooltip value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitFormat {
    /// Integers with thousands separators; non-integers are not shown.
    Thousands,
}

impl UnitFormat {
    pub fn apply(&self, value: f64) -> Option<String> {
        match self {
            UnitFormat::Thousands if value.is_finite() && value.fract() == 0.0 => {
                Some(format_thousands(value))
            }
            UnitFormat::Thousands => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipField {
    /// Data key, `count` or a compared year.
    pub key: String,
    pub label_key: String,
    pub label_format: String,
    pub unit: String,
    pub color: String,
    pub null_value: String,
    pub unit_format: UnitFormat,
    /// Compared year whose calendar relabels the date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_year: Option<i32>,
}

impl TooltipField {
    /// Label for a point's date. Compare-year fields move the date to the
    /// matching day of the compared year.
    pub fn label(&self, date: NaiveDate, latest_year: i32) -> String {
        let shown = match self.compare_year {
            Some(year) => {
                let target = year - (latest_year - date.year());
                date.with_year(target)
                    .or_else(|| date.pred_opt().and_then(|d| d.with_year(target)))
                    .unwrap_or(date)
            }
            None => date,
        };
        shown.format(&self.label_format).to_string()
    }

    /// Formatted value with its unit, or the null placeholder.
    pub fn value(&self, value: Option<f64>) -> String {
        match value.and_then(|v| self.unit_format.apply(v)) {
            Some(v) => format!("{}{}", v, self.unit),
            None => self.null_value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub current: LegendEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare: Option<LegendEntry>,
    pub average: LegendEntry,
    pub unusual: LegendEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLine {
    pub x: NaiveDate,
    pub label: String,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushConfig {
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    pub data_key: String,
    pub minimum_gap: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub x_axis: XAxis,
    pub tooltip: Vec<TooltipField>,
    pub legend: Legend,
    /// Stroke color per compared year.
    pub compare_lines: BTreeMap<i32, String>,
    pub reference_line: Option<ReferenceLine>,
    pub brush: Option<BrushConfig>,
    pub latest: Option<NaiveDate>,
}

fn latest_data_line(x: NaiveDate) -> ReferenceLine {
    ReferenceLine {
        x,
        label: "Latest data".to_string(),
        stroke: "#CCC".to_string(),
    }
}

fn count_field(unit: String, palette: &ColorPalette) -> TooltipField {
    TooltipField {
        key: "count".to_string(),
        label_key: "date".to_string(),
        label_format: TOOLTIP_DATE_FORMAT.to_string(),
        unit,
        color: palette.main.clone(),
        null_value: NULL_VALUE.to_string(),
        unit_format: UnitFormat::Thousands,
        compare_year: None,
    }
}

fn range_entries() -> (LegendEntry, LegendEntry) {
    (
        LegendEntry {
            label: "Normal Range".to_string(),
            color: "rgba(85,85,85, 0.15)".to_string(),
        },
        LegendEntry {
            label: "Above/Below Normal Range".to_string(),
            color: "rgba(85,85,85, 0.25)".to_string(),
        },
    )
}

/// Compared years shown as separate lines: the latest year is dropped and
/// the rest sorted newest first.
fn displayed_compare_years(compare_years: &[i32], latest_year: i32) -> Vec<i32> {
    let mut years: Vec<i32> = compare_years.iter().copied().filter(|&y| y != latest_year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// Stroke per displayed year. A single compared year uses the dedicated
/// compare color, several are sampled along the compare ramp.
pub fn compare_line_colors(
    compare_years: &[i32],
    latest_year: i32,
    palette: &ColorPalette,
) -> BTreeMap<i32, String> {
    let years = displayed_compare_years(compare_years, latest_year);
    if compare_years.len() == 1 {
        return years.into_iter().map(|y| (y, palette.compare_year.clone())).collect();
    }
    let ramp = sample_ramp(&palette.compare_year_ramp, compare_years.len());
    years
        .into_iter()
        .enumerate()
        .map(|(i, y)| {
            let color = ramp.get(i).cloned().unwrap_or_else(|| palette.compare_year.clone());
            (y, color)
        })
        .collect()
}

/// Label for the compared range, `2018-2020` or a single year.
fn compare_label(compare_years: &[i32], latest_year: i32) -> Option<String> {
    let mut years = displayed_compare_years(compare_years, latest_year);
    years.reverse();
    match years.as_slice() {
        [] => None,
        [only] => Some(only.to_string()),
        [first, .., last] => Some(format!("{}-{}", first, last)),
    }
}

/// Chart configuration for the weekly widget.
pub fn build_weekly_config(
    data: &[StatsPoint],
    latest: Option<NaiveDate>,
    palette: &ColorPalette,
) -> Option<ChartConfig> {
    let last = data.last()?;
    let (average, unusual) = range_entries();
    let reference_line = data
        .iter()
        .rev()
        .find(|p| p.count().is_some())
        .map(|p| latest_data_line(p.date()));

    Some(ChartConfig {
        x_axis: XAxis::months(),
        tooltip: vec![count_field(" alerts".to_string(), palette)],
        legend: Legend {
            current: LegendEntry {
                label: last.year().to_string(),
                color: palette.main.clone(),
            },
            compare: None,
            average,
            unusual,
        },
        compare_lines: BTreeMap::new(),
        reference_line,
        brush: None,
        latest: latest.or(Some(last.date())),
    })
}

/// Chart configuration for the cumulative widgets.
///
/// `brushed` is the visible slice; the brush itself and the latest-data
/// reference line are resolved against the whole series.
pub fn build_cumulative_config(
    series: &CumulativeSeries,
    brushed: &[CumulativePoint],
    compare_years: Option<&[i32]>,
    settings: &WidgetSettings,
    latest: Option<NaiveDate>,
    palette: &ColorPalette,
    dataset: &str,
) -> Option<ChartConfig> {
    if series.points.is_empty() {
        return None;
    }
    let (start_index, end_index) = (settings.start_index, settings.end_index);
    let dataset_label = dataset.to_uppercase();
    let latest_year = series.latest_year;
    let compare_years = compare_years.unwrap_or(&[]);

    let mut tooltip = vec![count_field(format!(" {} alert", dataset_label), palette)];
    let compare_lines = compare_line_colors(compare_years, latest_year, palette);
    for year in displayed_compare_years(compare_years, latest_year) {
        tooltip.push(TooltipField {
            key: year.to_string(),
            unit: format!(" {} alerts", dataset_label),
            color: compare_lines
                .get(&year)
                .cloned()
                .unwrap_or_else(|| palette.compare_year.clone()),
            compare_year: Some(year),
            ..count_field(String::new(), palette)
        });
    }

    let current_year = brushed.last().map_or(latest_year, |p| p.date().year());
    let (average, unusual) = range_entries();
    let legend = Legend {
        current: LegendEntry {
            label: current_year.to_string(),
            color: palette.main.clone(),
        },
        compare: compare_label(compare_years, latest_year).map(|label| LegendEntry {
            label,
            color: palette.compare_year.clone(),
        }),
        average,
        unusual,
    };

    let reference_line =
        last_reported_index(&series.points).map(|i| latest_data_line(series.points[i].date()));

    Some(ChartConfig {
        x_axis: XAxis::for_window(start_index, end_index),
        tooltip,
        legend,
        compare_lines,
        reference_line,
        brush: Some(BrushConfig {
            start_index,
            end_index,
            data_key: "date".to_string(),
            minimum_gap: BRUSH_MINIMUM_GAP,
        }),
        latest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DensifiedPoint;
    use crate::services::cumulative::compute_cumulative;
    use crate::time::week_start;

    fn series(compare: Option<&[i32]>) -> CumulativeSeries {
        let mut points = Vec::new();
        for year in 2018..=2021 {
            for week in 1..=20 {
                let count = if year == 2021 && week > 15 { None } else { Some(3.0) };
                points.push(DensifiedPoint {
                    year,
                    week,
                    count,
                    date: week_start(year, week).unwrap(),
                });
            }
        }
        compute_cumulative(&points, compare).unwrap()
    }

    #[test]
    fn test_x_axis_switches_to_days_for_short_windows() {
        assert_eq!(XAxis::for_window(Some(0), Some(8)), XAxis::days());
        assert_eq!(XAxis::for_window(Some(0), Some(12)), XAxis::months());
        assert_eq!(XAxis::for_window(None, Some(3)), XAxis::months());
    }

    #[test]
    fn test_unit_format() {
        assert_eq!(UnitFormat::Thousands.apply(12345.0), Some("12,345".to_string()));
        assert_eq!(UnitFormat::Thousands.apply(1.5), None);
    }

    #[test]
    fn test_tooltip_compare_label_moves_year() {
        let palette = ColorPalette::default();
        let field = TooltipField {
            compare_year: Some(2019),
            ..count_field(" alerts".to_string(), &palette)
        };
        let date = NaiveDate::from_ymd_opt(2021, 3, 8).unwrap();
        assert_eq!(field.label(date, 2021), "Mar 08 2019");
        assert_eq!(field.value(Some(1200.0)), "1,200 alerts");
        assert_eq!(field.value(None), "No data available");
    }

    #[test]
    fn test_cumulative_config() {
        let compare = [2018, 2019, 2020, 2021];
        let series = series(Some(&compare));
        let palette = ColorPalette::default();
        let config = build_cumulative_config(
            &series,
            &series.points,
            Some(&compare),
            &WidgetSettings {
                start_index: Some(0),
                end_index: Some(19),
                ..Default::default()
            },
            NaiveDate::from_ymd_opt(2021, 4, 20),
            &palette,
            "viirs",
        )
        .unwrap();

        let keys: Vec<&str> = config.tooltip.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["count", "2020", "2019", "2018"]);
        assert_eq!(config.tooltip[0].unit, " VIIRS alert");
        assert_eq!(config.compare_lines.len(), 3);
        assert_eq!(config.legend.compare.as_ref().unwrap().label, "2018-2020");
        assert_eq!(config.legend.current.label, "2021");

        let reference = config.reference_line.unwrap();
        assert_eq!(reference.x, week_start(2021, 15).unwrap());
        assert_eq!(reference.label, "Latest data");

        let brush = config.brush.unwrap();
        assert_eq!(brush.minimum_gap, 4);
        assert_eq!(brush.data_key, "date");
        assert_eq!(config.x_axis, XAxis::months());
    }

    #[test]
    fn test_single_compare_year_uses_compare_color() {
        let series = series(Some(&[2019]));
        let palette = ColorPalette::default();
        let config = build_cumulative_config(
            &series,
            &series.points,
            Some(&[2019]),
            &WidgetSettings::default(),
            None,
            &palette,
            "modis",
        )
        .unwrap();
        assert_eq!(config.compare_lines[&2019], palette.compare_year);
        assert_eq!(config.legend.compare.unwrap().label, "2019");
    }

    #[test]
    fn test_weekly_config() {
        let series = series(None);
        let stats: Vec<StatsPoint> = series.points.iter().map(|p| p.stats.clone()).collect();
        let config = build_weekly_config(&stats, None, &ColorPalette::default()).unwrap();
        assert_eq!(config.tooltip.len(), 1);
        assert!(config.brush.is_none());
        assert_eq!(config.latest, Some(week_start(2021, 20).unwrap()));
        // weeks 16..=20 of 2021 carry no count
        let reference = config.reference_line.unwrap();
        assert_eq!(reference.x, week_start(2021, 15).unwrap());
        assert_eq!(reference.label, "Latest data");
        assert!(build_weekly_config(&[], None, &ColorPalette::default()).is_none());
    }
}
