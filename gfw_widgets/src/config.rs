//! Pipeline configuration file support.
//!
//! This module reads the widget pipeline configuration from a TOML file.
//! Every section and field has a default, so an empty file is valid:
//!
//! ```toml
//! [calendar]
//! lag_days = 14
//!
//! [dataset]
//! name = "viirs"
//! mapping = "fires"
//!
//! [palette]
//! main = "#fe6598"
//!
//! [templates.weekly]
//! default = "There were {count} alerts in the week of the {date}."
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::models::{ColorPalette, CumulativeTemplates, WeeklyTemplates};
use crate::parsing::FieldMapping;
use crate::time::DEFAULT_LAG_DAYS;

const CONFIG_FILE_NAME: &str = "gfw-widgets.toml";

/// Pipeline configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub calendar: CalendarSettings,
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub palette: ColorPalette,
    #[serde(default)]
    pub templates: TemplateSettings,
}

/// Reporting-lag settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSettings {
    /// Days between a week's end and its data being reported.
    #[serde(default = "default_lag_days")]
    pub lag_days: i64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            lag_days: default_lag_days(),
        }
    }
}

/// Either a preset name (`glad`, `fires`, `burned_area`) or explicit
/// column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingSetting {
    Preset(String),
    Custom(FieldMapping),
}

impl Default for MappingSetting {
    fn default() -> Self {
        MappingSetting::Preset(default_dataset_name())
    }
}

/// Dataset settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSettings {
    #[serde(default = "default_dataset_name")]
    pub name: String,
    #[serde(default)]
    pub mapping: MappingSetting,
    /// First year to densify; derived from the data when absent.
    #[serde(default)]
    pub start_year: Option<i32>,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            name: default_dataset_name(),
            mapping: MappingSetting::default(),
            start_year: None,
        }
    }
}

impl DatasetSettings {
    /// Resolve the configured field mapping.
    pub fn field_mapping(&self) -> PipelineResult<FieldMapping> {
        match &self.mapping {
            MappingSetting::Custom(mapping) => Ok(mapping.clone()),
            MappingSetting::Preset(name) => FieldMapping::preset(name).ok_or_else(|| {
                PipelineError::ConfigurationError(format!("Unknown field mapping preset: {}", name))
            }),
        }
    }
}

/// Sentence templates per widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSettings {
    #[serde(default)]
    pub weekly: WeeklyTemplates,
    #[serde(default)]
    pub cumulative: CumulativeTemplates,
}

fn default_lag_days() -> i64 {
    DEFAULT_LAG_DAYS
}

fn default_dataset_name() -> String {
    "glad".to_string()
}

impl PipelineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> PipelineResult<Self> {
        let config: PipelineConfig = toml::from_str(content).map_err(|e| {
            PipelineError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(PipelineConfig)` if successful
    /// * `Err(PipelineError::ConfigurationError)` if the file cannot be read,
    ///   parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the configuration from the default location.
    ///
    /// Searches for `gfw-widgets.toml` in:
    /// 1. Current directory
    /// 2. `gfw_widgets/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> PipelineResult<Self> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("gfw_widgets").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading pipeline config from {}", path.display());
                return Self::from_file(&path);
            }
        }

        Err(PipelineError::ConfigurationError(format!(
            "No {} found in standard locations",
            CONFIG_FILE_NAME
        )))
    }

    fn validate(&self) -> PipelineResult<()> {
        if self.calendar.lag_days < 0 {
            return Err(PipelineError::ConfigurationError(format!(
                "calendar.lag_days must not be negative, got {}",
                self.calendar.lag_days
            )));
        }
        self.dataset.field_mapping()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.calendar.lag_days, 14);
        assert_eq!(config.dataset.field_mapping().unwrap(), FieldMapping::glad());
    }

    #[test]
    fn test_parse_sections() {
        let toml_str = r##"
            [calendar]
            lag_days = 7

            [dataset]
            name = "viirs"
            mapping = "fires"
            start_year = 2012

            [palette]
            main = "#000000"
            compare_year_ramp = ["#111111", "#222222"]

            [templates.weekly]
            with_indicator = "{count} in {indicator}"
        "##;

        let config = PipelineConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.calendar.lag_days, 7);
        assert_eq!(config.dataset.name, "viirs");
        assert_eq!(config.dataset.start_year, Some(2012));
        assert_eq!(config.dataset.field_mapping().unwrap(), FieldMapping::fires());
        assert_eq!(config.palette.main, "#000000");
        assert_eq!(config.palette.compare_year, ColorPalette::default().compare_year);
        assert_eq!(config.palette.compare_year_ramp.len(), 2);
        assert_eq!(config.templates.weekly.with_indicator, "{count} in {indicator}");
        assert_eq!(config.templates.weekly.default, WeeklyTemplates::default().default);
    }

    #[test]
    fn test_custom_mapping_table() {
        let toml_str = r#"
            [dataset.mapping]
            countField = "area__ha"
            weekField = "week"
            yearField = "year"
        "#;
        let config = PipelineConfig::from_toml_str(toml_str).unwrap();
        let mapping = config.dataset.field_mapping().unwrap();
        assert_eq!(mapping.count_field, "area__ha");
        assert_eq!(mapping.category_field, None);
    }

    #[test]
    fn test_invalid_config() {
        let unknown = PipelineConfig::from_toml_str("[dataset]\nmapping = \"nope\"");
        assert!(matches!(unknown, Err(PipelineError::ConfigurationError(_))));

        let negative = PipelineConfig::from_toml_str("[calendar]\nlag_days = -1");
        assert!(matches!(negative, Err(PipelineError::ConfigurationError(_))));

        let broken = PipelineConfig::from_toml_str("[calendar\nlag_days = 1");
        assert!(matches!(broken, Err(PipelineError::ConfigurationError(_))));
    }
}
