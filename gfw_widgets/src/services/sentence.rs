//! Widget sentences as `{template, params}` data.
//!
//! Nothing here interpolates: the host substitutes `{name}` placeholders,
//! localizes, and renders highlighted values.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::cumulative::{last_reported_index, max_week, CumulativeSeries};
use super::format::format_count;
use super::palette::{ramp_color, sample_ramp};
use crate::models::{
    ColorPalette, CumulativeTemplates, Sentence, SentenceParam, StatsPoint, StatusBand,
    WeeklyTemplates, WidgetSettings,
};

/// First year covered by the VIIRS fire product; every other dataset goes
/// back to 2001.
pub const VIIRS_START_YEAR: i32 = 2012;
pub const DEFAULT_START_YEAR: i32 = 2001;

/// Sentence date, e.g. `15th of January 2021`.
pub fn sentence_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{} of {}", day, suffix, date.format("%B %Y"))
}

/// Start year of a dataset's alert history.
pub fn dataset_start_year(dataset: &str) -> i32 {
    if dataset.eq_ignore_ascii_case("viirs") {
        VIIRS_START_YEAR
    } else {
        DEFAULT_START_YEAR
    }
}

/// Append a threshold clause, replacing the template's final period.
fn with_threshold_clause(template: &str, clause: &str) -> String {
    let base = template.strip_suffix('.').unwrap_or(template);
    format!("{}{}", base, clause)
}

fn format_threshold(threshold: f64) -> String {
    if threshold.fract() == 0.0 {
        format!("{}%", threshold as i64)
    } else {
        format!("{}%", threshold)
    }
}

/// Sentence for the weekly alerts widget.
///
/// Describes the last point of `data`, or `interaction` when the host
/// supplies one. `None` when there is nothing to describe.
pub fn weekly_sentence(
    data: &[StatsPoint],
    interaction: Option<&StatsPoint>,
    settings: &WidgetSettings,
    palette: &ColorPalette,
    templates: &WeeklyTemplates,
) -> Option<Sentence> {
    let point = interaction.or_else(|| data.last())?;

    let status = point.status();
    let status_colors = sample_ramp(&palette.ramp, 5);
    let status_color = ramp_color(&status_colors, status.ramp_position(), &palette.main);

    let mut template = match settings.indicator {
        Some(_) => templates.with_indicator.clone(),
        None => templates.default.clone(),
    };

    let mut params = BTreeMap::new();
    if let Some(indicator) = &settings.indicator {
        params.insert("indicator".to_string(), SentenceParam::plain(&indicator.label));
    }
    params.insert("date".to_string(), SentenceParam::plain(sentence_date(point.date())));
    params.insert(
        "count".to_string(),
        SentenceParam::highlighted(format_count(point.count()), &palette.main),
    );
    params.insert(
        "status".to_string(),
        SentenceParam::highlighted(status.label(), status_color),
    );

    if let (Some(threshold), Some(clause)) = (settings.threshold, &templates.threshold) {
        if threshold > 0.0 {
            template = with_threshold_clause(&template, clause);
            params.insert("threshold".to_string(), SentenceParam::plain(format_threshold(threshold)));
        }
    }

    Some(Sentence { template, params })
}

/// Where and what the cumulative sentence talks about.
#[derive(Debug, Clone, Copy)]
pub struct SentenceContext<'a> {
    pub settings: &'a WidgetSettings,
    pub palette: &'a ColorPalette,
    pub location: Option<&'a str>,
    pub dataset: &'a str,
}

/// Sentence for the cumulative alerts widgets.
///
/// The reported total is the last non-null running total between the brush
/// start and the latest reported week; it is classified against that
/// week's mean and standard deviation.
pub fn cumulative_sentence(
    series: &CumulativeSeries,
    ctx: &SentenceContext<'_>,
    templates: &CumulativeTemplates,
) -> Option<Sentence> {
    let points = &series.points;
    if points.is_empty() {
        return None;
    }
    let last_idx = last_reported_index(points);
    let start_idx = ctx.settings.start_index.unwrap_or(0);

    let selected = last_idx.filter(|&last| start_idx <= last).map(|last| &points[last]);
    let total = selected.and_then(|p| p.count()).unwrap_or(0.0);
    let (mean, std_dev) = selected.map_or((0.0, 0.0), |p| (p.stats.mean, p.stats.std_dev));

    let status = StatusBand::from_deviation(total, mean, std_dev);
    let status_color = ramp_color(&ctx.palette.ramp, status.ramp_position() * 2, &ctx.palette.main);

    let template = match (ctx.settings.high_confidence, ctx.settings.indicator.is_some()) {
        (true, true) => &templates.high_confidence_with_indicator,
        (true, false) => &templates.high_confidence,
        (false, true) => &templates.all_alerts_with_indicator,
        (false, false) => &templates.all_alerts,
    };
    let mut template = template.clone();

    let peak = max_week(&series.totals);
    let mut params = BTreeMap::new();
    if let Some(location) = ctx.location {
        params.insert("location".to_string(), SentenceParam::plain(location));
    }
    if let Some(indicator) = &ctx.settings.indicator {
        params.insert("indicator".to_string(), SentenceParam::plain(&indicator.label));
    }
    if let Some(last) = last_idx {
        params.insert("date".to_string(), SentenceParam::plain(sentence_date(points[last].date())));
    }
    params.insert("latestYear".to_string(), SentenceParam::plain(series.latest_year.to_string()));
    params.insert(
        "dataset_start_year".to_string(),
        SentenceParam::plain(dataset_start_year(ctx.dataset).to_string()),
    );
    if let Some(peak) = peak {
        params.insert("maxYear".to_string(), SentenceParam::plain(peak.year.to_string()));
    }
    params.insert(
        "maxTotal".to_string(),
        SentenceParam::highlighted(format_count(peak.and_then(|p| p.count)), &ctx.palette.main),
    );
    params.insert("dataset".to_string(), SentenceParam::plain(ctx.dataset.to_uppercase()));
    params.insert(
        "count".to_string(),
        SentenceParam::highlighted(format_count(Some(total)), &ctx.palette.main),
    );
    params.insert(
        "status".to_string(),
        SentenceParam::highlighted(status.label(), status_color),
    );

    if let (Some(threshold), Some(clause)) = (ctx.settings.threshold, &templates.threshold) {
        if threshold > 0.0 {
            template = with_threshold_clause(&template, clause);
            params.insert("threshold".to_string(), SentenceParam::plain(format_threshold(threshold)));
        }
    }

    log::debug!(
        "Cumulative sentence: total {} is {} for {}",
        total,
        status,
        series.latest_year
    );

    Some(Sentence { template, params })
}
