use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

use super::field_mapping::FieldMapping;
use crate::error::{PipelineError, PipelineResult};
use crate::models::RawObservation;

/// Custom deserializer that accepts either a plain date or a full timestamp
/// for the `latest` field, keeping only the calendar date.
fn deserialize_latest<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid latest date '{}': {}", raw, e)))
}

/// Raw JSON structure as returned by the analytics collaborator
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(default)]
    alerts: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "deserialize_latest")]
    latest: Option<NaiveDate>,
    #[serde(default)]
    available_years: Option<Vec<i32>>,
}

/// Counts of accepted and dropped rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    pub total_rows: usize,
    pub accepted: usize,
    pub dropped: usize,
    pub warnings: Vec<String>,
}

impl ParseReport {
    pub fn has_dropped_rows(&self) -> bool {
        self.dropped > 0
    }
}

/// A parsed analytics response.
///
/// `observations` is `None` when the response carried no alerts array at
/// all, which the pipeline treats as missing input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertsPayload {
    pub observations: Option<Vec<RawObservation>>,
    pub latest: Option<NaiveDate>,
    pub available_years: Option<Vec<i32>>,
    pub report: ParseReport,
}

/// Map raw rows onto observations, dropping malformed ones.
pub fn parse_observations(rows: &[Value], mapping: &FieldMapping) -> (Vec<RawObservation>, ParseReport) {
    let mut report = ParseReport {
        total_rows: rows.len(),
        ..ParseReport::default()
    };
    let mut observations = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        match mapping.extract(row) {
            Ok(obs) => observations.push(obs),
            Err(reason) => {
                log::warn!("Dropping malformed alert row at index {}: {}", idx, reason);
                report.warnings.push(format!("row {}: {}", idx, reason));
                report.dropped += 1;
            }
        }
    }
    report.accepted = observations.len();

    (observations, report)
}

/// Parse an analytics payload from a string
pub fn parse_payload_str(json_str: &str, mapping: &FieldMapping) -> PipelineResult<AlertsPayload> {
    let raw: RawPayload = serde_json::from_str(json_str).map_err(|e| {
        let preview = if json_str.len() > 200 {
            format!("{}...", json_str.get(..200).unwrap_or_default())
        } else {
            json_str.to_string()
        };
        PipelineError::ParseError(format!("Invalid alerts payload: {}. First 200 chars: {}", e, preview))
    })?;

    let (observations, report) = match raw.alerts {
        Some(rows) => {
            let (observations, report) = parse_observations(&rows, mapping);
            (Some(observations), report)
        }
        None => (None, ParseReport::default()),
    };

    Ok(AlertsPayload {
        observations,
        latest: raw.latest,
        available_years: raw.available_years,
        report,
    })
}

/// Parse an analytics payload file
pub fn parse_payload(path: &Path, mapping: &FieldMapping) -> PipelineResult<AlertsPayload> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::ParseError(format!("Failed to read payload file {}: {}", path.display(), e))
    })?;
    parse_payload_str(&content, mapping)
}
