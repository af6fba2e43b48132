//! Widget-level inputs (settings, palette, templates) and the sentence
//! output shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Comparison-year selection: every available year, or one specific year.
///
/// Accepts `"all"`, a year number, or a numeric string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CompareYearRepr", into = "CompareYearRepr")]
pub enum CompareYear {
    All,
    Year(i32),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CompareYearRepr {
    Year(i32),
    Keyword(String),
}

impl TryFrom<CompareYearRepr> for CompareYear {
    type Error = String;

    fn try_from(repr: CompareYearRepr) -> Result<Self, Self::Error> {
        match repr {
            CompareYearRepr::Year(y) => Ok(CompareYear::Year(y)),
            CompareYearRepr::Keyword(s) if s.eq_ignore_ascii_case("all") => Ok(CompareYear::All),
            CompareYearRepr::Keyword(s) => s
                .trim()
                .parse::<i32>()
                .map(CompareYear::Year)
                .map_err(|_| format!("Invalid compare year: {}", s)),
        }
    }
}

impl From<CompareYear> for CompareYearRepr {
    fn from(value: CompareYear) -> Self {
        match value {
            CompareYear::All => CompareYearRepr::Keyword("all".to_string()),
            CompareYear::Year(y) => CompareYearRepr::Year(y),
        }
    }
}

/// Land-cover / forest-type filter applied to the location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub value: String,
    pub label: String,
}

/// User-controlled widget settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetSettings {
    pub compare_year: Option<CompareYear>,
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    /// Dataset name, e.g. `viirs` or `modis`.
    pub dataset: Option<String>,
    /// Trailing number of weeks shown by the weekly widget.
    pub weeks: Option<usize>,
    pub indicator: Option<Indicator>,
    /// Confidence or canopy-density threshold.
    pub threshold: Option<f64>,
    pub high_confidence: bool,
}

/// Named colors used by the charts and the sentence highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorPalette {
    pub main: String,
    #[serde(alias = "compare_year")]
    pub compare_year: String,
    pub ramp: Vec<String>,
    #[serde(alias = "compare_year_ramp")]
    pub compare_year_ramp: Vec<String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            main: "#fe6598".to_string(),
            compare_year: "#49b5e3".to_string(),
            ramp: [
                "#bd0026", "#d21c24", "#e3401f", "#ef6b2a", "#f79437", "#fbb54d", "#fdd06b",
                "#fee58d", "#fff5b5",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            compare_year_ramp: ["#0c2c84", "#225ea8", "#1d91c0", "#41b6c4", "#7fcdbb"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// Sentence templates of the weekly alerts widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyTemplates {
    pub default: String,
    #[serde(alias = "with_indicator")]
    pub with_indicator: String,
    /// Clause appended when a positive threshold is active.
    pub threshold: Option<String>,
}

impl Default for WeeklyTemplates {
    fn default() -> Self {
        Self {
            default: "There were {count} deforestation alerts reported in the week of the {date}. This was {status} compared to the same week in previous years.".to_string(),
            with_indicator: "There were {count} deforestation alerts reported in {indicator} in the week of the {date}. This was {status} compared to the same week in previous years.".to_string(),
            threshold: Some(" with a confidence above {threshold}.".to_string()),
        }
    }
}

/// Sentence templates of the cumulative alerts widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CumulativeTemplates {
    #[serde(alias = "all_alerts")]
    pub all_alerts: String,
    #[serde(alias = "all_alerts_with_indicator")]
    pub all_alerts_with_indicator: String,
    #[serde(alias = "high_confidence")]
    pub high_confidence: String,
    #[serde(alias = "high_confidence_with_indicator")]
    pub high_confidence_with_indicator: String,
    pub threshold: Option<String>,
}

impl Default for CumulativeTemplates {
    fn default() -> Self {
        Self {
            all_alerts: "In {location}, the peak fire season typically begins in {maxYear}. There were {count} {dataset} fire alerts reported between {dataset_start_year} and {date}, which is {status} compared to the same period in previous years going back to {dataset_start_year}.".to_string(),
            all_alerts_with_indicator: "In {location} in {indicator}, there were {count} {dataset} fire alerts reported up to {date}, which is {status} compared to the same period in previous years going back to {dataset_start_year}.".to_string(),
            high_confidence: "In {location}, there were {count} high confidence {dataset} fire alerts reported up to {date}, which is {status} compared to the same period in previous years going back to {dataset_start_year}.".to_string(),
            high_confidence_with_indicator: "In {location} in {indicator}, there were {count} high confidence {dataset} fire alerts reported up to {date}, which is {status} compared to the same period in previous years going back to {dataset_start_year}.".to_string(),
            threshold: None,
        }
    }
}

/// One sentence placeholder value, optionally highlighted with a color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SentenceParam {
    Highlighted { value: String, color: String },
    Plain(String),
}

impl SentenceParam {
    pub fn plain(value: impl Into<String>) -> Self {
        SentenceParam::Plain(value.into())
    }

    pub fn highlighted(value: impl Into<String>, color: impl Into<String>) -> Self {
        SentenceParam::Highlighted {
            value: value.into(),
            color: color.into(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SentenceParam::Highlighted { value, .. } => value,
            SentenceParam::Plain(value) => value,
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            SentenceParam::Highlighted { color, .. } => Some(color),
            SentenceParam::Plain(_) => None,
        }
    }
}

/// A template with named placeholders and the values to interpolate.
///
/// Interpolation and localization are left to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub template: String,
    pub params: BTreeMap<String, SentenceParam>,
}

impl Sentence {
    pub fn param(&self, name: &str) -> Option<&SentenceParam> {
        self.params.get(name)
    }
}
