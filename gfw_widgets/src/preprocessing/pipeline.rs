use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::memo::Memo;
use crate::config::{PipelineConfig, TemplateSettings};
use crate::error::PipelineResult;
use crate::models::{
    ColorPalette, CumulativePoint, CumulativeTemplates, DensifiedPoint, RawObservation, Sentence,
    StatsPoint, WeeklyTemplates, WidgetSettings,
};
use crate::parsing::{parse_payload_str, AlertsPayload};
use crate::services::chart_config::{build_cumulative_config, build_weekly_config, ChartConfig};
use crate::services::cumulative::{compute_cumulative, resolve_compare_years, CumulativeSeries};
use crate::services::densify::{densify_with, derive_start_year, DensifyMode};
use crate::services::sentence::{cumulative_sentence, weekly_sentence, SentenceContext};
use crate::services::statistics::compute_latest_stats;
use crate::time::{Clock, SystemClock, WeekCalendar};
use crate::transformations::{brush, trailing};

/// Immutable input of one widget evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetSnapshot {
    /// `None` when the analytics response has not arrived.
    pub observations: Option<Arc<Vec<RawObservation>>>,
    pub latest: Option<NaiveDate>,
    pub available_years: Option<Vec<i32>>,
    pub settings: WidgetSettings,
    pub palette: ColorPalette,
    pub templates: TemplateSettings,
    pub location: Option<String>,
    /// Point hovered in the chart, described instead of the latest week.
    pub interaction: Option<StatsPoint>,
}

impl WidgetSnapshot {
    pub fn new(observations: Vec<RawObservation>) -> Self {
        Self {
            observations: Some(Arc::new(observations)),
            ..Default::default()
        }
    }

    pub fn from_payload(payload: AlertsPayload) -> Self {
        Self {
            observations: payload.observations.map(Arc::new),
            latest: payload.latest,
            available_years: payload.available_years,
            ..Default::default()
        }
    }

    /// Take palette and templates from the pipeline configuration.
    pub fn with_config(mut self, config: &PipelineConfig) -> Self {
        self.palette = config.palette.clone();
        self.templates = config.templates.clone();
        self
    }

    pub fn with_settings(mut self, settings: WidgetSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_latest(mut self, latest: NaiveDate) -> Self {
        self.latest = Some(latest);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_interaction(mut self, interaction: Option<StatsPoint>) -> Self {
        self.interaction = interaction;
        self
    }
}

/// Everything the weekly widget renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyOutput {
    pub data: Vec<StatsPoint>,
    pub sentence: Sentence,
    pub config: ChartConfig,
}

/// Everything the cumulative widgets render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeOutput {
    /// Full latest-year series, for the brush overview.
    pub original_data: Vec<CumulativePoint>,
    /// Brushed slice.
    pub data: Vec<CumulativePoint>,
    pub sentence: Sentence,
    pub config: ChartConfig,
}

type DensifyKey = (Arc<Vec<RawObservation>>, i32, WeekCalendar);
type WeeklySentenceKey = (
    Arc<Vec<StatsPoint>>,
    Option<StatsPoint>,
    WidgetSettings,
    ColorPalette,
    WeeklyTemplates,
);
type CumulativeSentenceKey = (
    Arc<CumulativeSeries>,
    WidgetSettings,
    ColorPalette,
    CumulativeTemplates,
    Option<String>,
    String,
);
type CumulativeConfigKey = (
    Arc<CumulativeSeries>,
    Arc<Vec<CumulativePoint>>,
    Option<Vec<i32>>,
    WidgetSettings,
    Option<NaiveDate>,
    ColorPalette,
    String,
);

/// Memoized derived-state graph of the weekly and cumulative widgets.
///
/// Each node keeps its last dependencies and value and recomputes only when
/// the dependencies change. A node whose inputs are missing returns `None`
/// and so does every node downstream of it.
pub struct WidgetPipeline<C: Clock = SystemClock> {
    clock: C,
    config: PipelineConfig,
    densified: Memo<DensifyKey, Vec<DensifiedPoint>>,
    densified_full: Memo<DensifyKey, Vec<DensifiedPoint>>,
    weekly_stats: Memo<Arc<Vec<DensifiedPoint>>, Vec<StatsPoint>>,
    weekly_data: Memo<(Arc<Vec<StatsPoint>>, Option<usize>), Vec<StatsPoint>>,
    weekly_sentence: Memo<WeeklySentenceKey, Sentence>,
    weekly_config: Memo<(Arc<Vec<StatsPoint>>, Option<NaiveDate>, ColorPalette), ChartConfig>,
    weekly_output: Memo<(Arc<Vec<StatsPoint>>, Arc<Sentence>, Arc<ChartConfig>), WeeklyOutput>,
    cumulative: Memo<(Arc<Vec<DensifiedPoint>>, Option<Vec<i32>>), CumulativeSeries>,
    cumulative_brushed: Memo<(Arc<CumulativeSeries>, Option<usize>, Option<usize>), Vec<CumulativePoint>>,
    cumulative_sentence: Memo<CumulativeSentenceKey, Sentence>,
    cumulative_config: Memo<CumulativeConfigKey, ChartConfig>,
    cumulative_output: Memo<
        (Arc<CumulativeSeries>, Arc<Vec<CumulativePoint>>, Arc<Sentence>, Arc<ChartConfig>),
        CumulativeOutput,
    >,
}

impl WidgetPipeline<SystemClock> {
    /// Create a pipeline with the default configuration and the system clock
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with a custom configuration
    pub fn with_config(config: PipelineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for WidgetPipeline<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> WidgetPipeline<C> {
    pub fn with_clock(config: PipelineConfig, clock: C) -> Self {
        Self {
            clock,
            config,
            densified: Memo::new("densified"),
            densified_full: Memo::new("densified_full"),
            weekly_stats: Memo::new("weekly_stats"),
            weekly_data: Memo::new("weekly_data"),
            weekly_sentence: Memo::new("weekly_sentence"),
            weekly_config: Memo::new("weekly_config"),
            weekly_output: Memo::new("weekly_output"),
            cumulative: Memo::new("cumulative"),
            cumulative_brushed: Memo::new("cumulative_brushed"),
            cumulative_sentence: Memo::new("cumulative_sentence"),
            cumulative_config: Memo::new("cumulative_config"),
            cumulative_output: Memo::new("cumulative_output"),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Calendar for the clock's date and the configured reporting lag.
    pub fn calendar(&self) -> WeekCalendar {
        WeekCalendar::from_clock(&self.clock, self.config.calendar.lag_days)
    }

    /// Calendar of the cumulative widgets: the dataset's `latest` date when
    /// known, otherwise the clock calendar.
    pub fn cumulative_calendar(&self, snapshot: &WidgetSnapshot) -> WeekCalendar {
        snapshot
            .latest
            .map_or_else(|| self.calendar(), WeekCalendar::from_latest)
    }

    /// Parse an analytics response with the configured field mapping into
    /// a snapshot carrying the configured palette and templates.
    pub fn snapshot_from_json(&self, json_str: &str) -> PipelineResult<WidgetSnapshot> {
        let mapping = self.config.dataset.field_mapping()?;
        let payload = parse_payload_str(json_str, &mapping)?;
        if payload.report.has_dropped_rows() {
            log::info!(
                "Accepted {} of {} rows",
                payload.report.accepted,
                payload.report.total_rows
            );
        }
        Ok(WidgetSnapshot::from_payload(payload).with_config(&self.config))
    }

    /// Number of recomputations per node.
    pub fn recomputations(&self) -> BTreeMap<&'static str, usize> {
        [
            (self.densified.name(), self.densified.recomputations()),
            (self.densified_full.name(), self.densified_full.recomputations()),
            (self.weekly_stats.name(), self.weekly_stats.recomputations()),
            (self.weekly_data.name(), self.weekly_data.recomputations()),
            (self.weekly_sentence.name(), self.weekly_sentence.recomputations()),
            (self.weekly_config.name(), self.weekly_config.recomputations()),
            (self.weekly_output.name(), self.weekly_output.recomputations()),
            (self.cumulative.name(), self.cumulative.recomputations()),
            (self.cumulative_brushed.name(), self.cumulative_brushed.recomputations()),
            (self.cumulative_sentence.name(), self.cumulative_sentence.recomputations()),
            (self.cumulative_config.name(), self.cumulative_config.recomputations()),
            (self.cumulative_output.name(), self.cumulative_output.recomputations()),
        ]
        .into_iter()
        .collect()
    }

    fn densify_key(
        &self,
        snapshot: &WidgetSnapshot,
        calendar: WeekCalendar,
    ) -> Option<DensifyKey> {
        let observations = snapshot.observations.clone()?;
        if observations.is_empty() {
            return None;
        }
        let current_year = self.calendar().current_year();
        let start_year = self
            .config
            .dataset
            .start_year
            .or_else(|| derive_start_year(&observations, current_year))?;
        Some((observations, start_year, calendar))
    }

    fn dataset_name(&self, snapshot: &WidgetSnapshot) -> String {
        snapshot
            .settings
            .dataset
            .clone()
            .unwrap_or_else(|| self.config.dataset.name.clone())
    }

    /// Zero-filled series truncated at each year's last valid week.
    pub fn densified(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<Vec<DensifiedPoint>>> {
        let key = self.densify_key(snapshot, self.calendar())?;
        self.densified
            .get_or_compute(key, |(obs, start, calendar)| {
                run_densify(obs, *start, calendar, DensifyMode::Truncated)
            })
    }

    /// Zero-filled series over full years, with a null tail after the
    /// dataset's latest week.
    pub fn densified_full_years(
        &mut self,
        snapshot: &WidgetSnapshot,
    ) -> Option<Arc<Vec<DensifiedPoint>>> {
        let key = self.densify_key(snapshot, self.cumulative_calendar(snapshot))?;
        self.densified_full
            .get_or_compute(key, |(obs, start, calendar)| {
                run_densify(obs, *start, calendar, DensifyMode::FullYear)
            })
    }

    /// Baselines of the latest year.
    pub fn weekly_stats(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<Vec<StatsPoint>>> {
        let densified = self.densified(snapshot)?;
        self.weekly_stats
            .get_or_compute(densified, |points| compute_latest_stats(points))
    }

    /// Baselines restricted to the trailing `weeks` setting.
    pub fn weekly_data(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<Vec<StatsPoint>>> {
        let stats = self.weekly_stats(snapshot)?;
        self.weekly_data
            .get_or_compute((stats, snapshot.settings.weeks), |(stats, weeks)| {
                non_empty(trailing(stats.as_slice(), *weeks))
            })
    }

    pub fn weekly_sentence(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<Sentence>> {
        let data = self.weekly_data(snapshot)?;
        let settings = WidgetSettings {
            indicator: snapshot.settings.indicator.clone(),
            threshold: snapshot.settings.threshold,
            ..Default::default()
        };
        let key = (
            data,
            snapshot.interaction.clone(),
            settings,
            snapshot.palette.clone(),
            snapshot.templates.weekly.clone(),
        );
        self.weekly_sentence
            .get_or_compute(key, |(data, interaction, settings, palette, templates)| {
                weekly_sentence(data, interaction.as_ref(), settings, palette, templates)
            })
    }

    pub fn weekly_config(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<ChartConfig>> {
        let data = self.weekly_data(snapshot)?;
        let key = (data, snapshot.latest, snapshot.palette.clone());
        self.weekly_config
            .get_or_compute(key, |(data, latest, palette)| {
                build_weekly_config(data, *latest, palette)
            })
    }

    pub fn weekly_output(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<WeeklyOutput>> {
        let data = self.weekly_data(snapshot)?;
        let sentence = self.weekly_sentence(snapshot)?;
        let config = self.weekly_config(snapshot)?;
        self.weekly_output
            .get_or_compute((data, sentence, config), |(data, sentence, config)| {
                Some(WeeklyOutput {
                    data: data.to_vec(),
                    sentence: Sentence::clone(sentence),
                    config: ChartConfig::clone(config),
                })
            })
    }

    /// Compared years for the current selection.
    ///
    /// Available years come from the response when it lists them, else from
    /// the years present in the data.
    pub fn compare_years(&mut self, snapshot: &WidgetSnapshot) -> Option<Vec<i32>> {
        let selection = snapshot.settings.compare_year?;
        let available = match &snapshot.available_years {
            Some(years) => years.clone(),
            None => {
                let densified = self.densified_full_years(snapshot)?;
                let years: BTreeSet<i32> = densified.iter().map(|p| p.year).collect();
                years.into_iter().collect()
            }
        };
        resolve_compare_years(Some(selection), &available)
    }

    /// Running totals of the latest year with comparison overlays.
    pub fn cumulative(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<CumulativeSeries>> {
        let densified = self.densified_full_years(snapshot)?;
        let compare_years = self.compare_years(snapshot);
        self.cumulative
            .get_or_compute((densified, compare_years), |(points, years)| {
                compute_cumulative(points, years.as_deref())
            })
    }

    pub fn cumulative_brushed(
        &mut self,
        snapshot: &WidgetSnapshot,
    ) -> Option<Arc<Vec<CumulativePoint>>> {
        let series = self.cumulative(snapshot)?;
        let key = (series, snapshot.settings.start_index, snapshot.settings.end_index);
        self.cumulative_brushed
            .get_or_compute(key, |(series, start, end)| {
                non_empty(brush(&series.points, *start, *end))
            })
    }

    pub fn cumulative_sentence(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<Sentence>> {
        let series = self.cumulative(snapshot)?;
        let settings = WidgetSettings {
            start_index: snapshot.settings.start_index,
            indicator: snapshot.settings.indicator.clone(),
            threshold: snapshot.settings.threshold,
            high_confidence: snapshot.settings.high_confidence,
            ..Default::default()
        };
        let key = (
            series,
            settings,
            snapshot.palette.clone(),
            snapshot.templates.cumulative.clone(),
            snapshot.location.clone(),
            self.dataset_name(snapshot),
        );
        self.cumulative_sentence.get_or_compute(
            key,
            |(series, settings, palette, templates, location, dataset)| {
                let ctx = SentenceContext {
                    settings,
                    palette,
                    location: location.as_deref(),
                    dataset,
                };
                cumulative_sentence(series, &ctx, templates)
            },
        )
    }

    pub fn cumulative_config(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<ChartConfig>> {
        let series = self.cumulative(snapshot)?;
        let brushed = self.cumulative_brushed(snapshot)?;
        let compare_years = self.compare_years(snapshot);
        let settings = WidgetSettings {
            start_index: snapshot.settings.start_index,
            end_index: snapshot.settings.end_index,
            ..Default::default()
        };
        let key = (
            series,
            brushed,
            compare_years,
            settings,
            snapshot.latest,
            snapshot.palette.clone(),
            self.dataset_name(snapshot),
        );
        self.cumulative_config.get_or_compute(
            key,
            |(series, brushed, years, settings, latest, palette, dataset)| {
                build_cumulative_config(
                    series,
                    brushed,
                    years.as_deref(),
                    settings,
                    *latest,
                    palette,
                    dataset,
                )
            },
        )
    }

    pub fn cumulative_output(&mut self, snapshot: &WidgetSnapshot) -> Option<Arc<CumulativeOutput>> {
        let series = self.cumulative(snapshot)?;
        let brushed = self.cumulative_brushed(snapshot)?;
        let sentence = self.cumulative_sentence(snapshot)?;
        let config = self.cumulative_config(snapshot)?;
        self.cumulative_output.get_or_compute(
            (series, brushed, sentence, config),
            |(series, brushed, sentence, config)| {
                Some(CumulativeOutput {
                    original_data: series.points.clone(),
                    data: brushed.to_vec(),
                    sentence: Sentence::clone(sentence),
                    config: ChartConfig::clone(config),
                })
            },
        )
    }
}

fn run_densify(
    observations: &[RawObservation],
    start_year: i32,
    calendar: &WeekCalendar,
    mode: DensifyMode,
) -> Option<Vec<DensifiedPoint>> {
    match densify_with(observations, start_year, calendar, mode) {
        Ok(points) => non_empty(points),
        Err(e) => {
            log::error!("Densification from {} failed: {}", start_year, e);
            None
        }
    }
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
