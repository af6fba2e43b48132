use serde::{Deserialize, Serialize};

/// One weekly record as returned by the analytics service, after field
/// mapping. Several records may share a (year, week) when they differ by
/// category (e.g. alert confidence); densification sums them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub year: i32,
    pub week: u32,
    pub count: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RawObservation {
    pub fn new(year: i32, week: u32, count: f64) -> Self {
        Self {
            year,
            week,
            count,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
