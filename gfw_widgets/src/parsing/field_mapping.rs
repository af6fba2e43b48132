//! Maps analytics rows onto [`RawObservation`] fields.
//!
//! Each dataset names its columns differently (`alert__count`,
//! `burn_area__ha`, ...). A [`FieldMapping`] lets one engine read all of
//! them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::RawObservation;

/// Column names of one analytics dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub count_field: String,
    pub week_field: String,
    pub year_field: String,
    #[serde(default)]
    pub category_field: Option<String>,
}

impl FieldMapping {
    pub fn new(count_field: &str, week_field: &str, year_field: &str) -> Self {
        Self {
            count_field: count_field.to_string(),
            week_field: week_field.to_string(),
            year_field: year_field.to_string(),
            category_field: None,
        }
    }

    pub fn with_category(mut self, category_field: &str) -> Self {
        self.category_field = Some(category_field.to_string());
        self
    }

    /// Integrated deforestation alerts.
    pub fn glad() -> Self {
        Self::new("alert__count", "alert__week", "alert__year")
    }

    /// VIIRS / MODIS fire alerts, one row per confidence level.
    pub fn fires() -> Self {
        Self::glad().with_category("confidence__cat")
    }

    /// MODIS burned area, in hectares.
    pub fn burned_area() -> Self {
        Self::new("burn_area__ha", "alert__week", "alert__year")
    }

    /// Looks up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "glad" | "glad_alerts" => Some(Self::glad()),
            "fires" | "viirs" | "modis" => Some(Self::fires()),
            "burned_area" | "burned-area" => Some(Self::burned_area()),
            _ => None,
        }
    }

    /// Reads one row. Rows lacking a count, week or year, or carrying a week
    /// outside 1..=53, are malformed.
    pub fn extract(&self, row: &Value) -> Result<RawObservation, MalformedRecord> {
        let count = numeric(row, &self.count_field)
            .ok_or_else(|| MalformedRecord::MissingField(self.count_field.clone()))?;
        let week = integer(row, &self.week_field)
            .ok_or_else(|| MalformedRecord::MissingField(self.week_field.clone()))?;
        let year = integer(row, &self.year_field)
            .ok_or_else(|| MalformedRecord::MissingField(self.year_field.clone()))?;

        if !(1..=53).contains(&week) {
            return Err(MalformedRecord::WeekOutOfRange(week));
        }
        let year = i32::try_from(year).map_err(|_| MalformedRecord::YearOutOfRange(year))?;

        let category = self
            .category_field
            .as_ref()
            .and_then(|field| row.get(field))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            });

        Ok(RawObservation {
            year,
            week: week as u32,
            count,
            category,
        })
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::glad()
    }
}

/// Why a row could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRecord {
    #[error("missing or non-numeric '{0}'")]
    MissingField(String),

    #[error("week {0} outside 1..=53")]
    WeekOutOfRange(i64),

    #[error("year {0} out of range")]
    YearOutOfRange(i64),
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn numeric(row: &Value, field: &str) -> Option<f64> {
    match row.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn integer(row: &Value, field: &str) -> Option<i64> {
    let value = numeric(row, field)?;
    if value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_numbers_and_numeric_strings() {
        let mapping = FieldMapping::glad();
        let row = json!({"alert__count": 12, "alert__week": "7", "alert__year": "2020"});
        let obs = mapping.extract(&row).unwrap();
        assert_eq!(obs, RawObservation::new(2020, 7, 12.0));
    }

    #[test]
    fn test_extract_category() {
        let mapping = FieldMapping::fires();
        let row = json!({
            "alert__count": 3,
            "alert__week": 10,
            "alert__year": 2021,
            "confidence__cat": "h"
        });
        let obs = mapping.extract(&row).unwrap();
        assert_eq!(obs.category.as_deref(), Some("h"));
    }

    #[test]
    fn test_extract_rejects_missing_and_out_of_range() {
        let mapping = FieldMapping::burned_area();
        let missing = json!({"alert__week": 3, "alert__year": 2020});
        let bad_week = json!({"burn_area__ha": 1.5, "alert__week": 54, "alert__year": 2020});
        let fractional_week = json!({"burn_area__ha": 1.5, "alert__week": 2.5, "alert__year": 2020});

        assert_eq!(
            mapping.extract(&missing),
            Err(MalformedRecord::MissingField("burn_area__ha".to_string()))
        );
        assert_eq!(mapping.extract(&bad_week), Err(MalformedRecord::WeekOutOfRange(54)));
        assert!(mapping.extract(&fractional_week).is_err());
    }

    #[test]
    fn test_malformed_record_messages() {
        let err: Box<dyn std::error::Error> = Box::new(MalformedRecord::WeekOutOfRange(54));
        assert_eq!(err.to_string(), "week 54 outside 1..=53");
        assert_eq!(
            MalformedRecord::MissingField("alert__count".to_string()).to_string(),
            "missing or non-numeric 'alert__count'"
        );
        assert_eq!(
            MalformedRecord::YearOutOfRange(1 << 40).to_string(),
            "year 1099511627776 out of range"
        );
    }

    #[test]
    fn test_presets() {
        assert_eq!(FieldMapping::preset("VIIRS"), Some(FieldMapping::fires()));
        assert_eq!(FieldMapping::preset("burned_area"), Some(FieldMapping::burned_area()));
        assert_eq!(FieldMapping::preset("unknown"), None);
    }
}
