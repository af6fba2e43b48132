//! GFW Widgets - weekly alert time-series pipeline for forest-monitoring
//! dashboard widgets.
//!
//! Sparse weekly alert counts go in; dense zero-filled series, cross-year
//! baselines, cumulative views, sentence parameters and chart descriptors
//! come out.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use gfw_widgets::config::PipelineConfig;
//! use gfw_widgets::models::RawObservation;
//! use gfw_widgets::preprocessing::{WidgetPipeline, WidgetSnapshot};
//! use gfw_widgets::time::FixedClock;
//!
//! let today = NaiveDate::from_ymd_opt(2021, 6, 20).unwrap();
//! let mut pipeline = WidgetPipeline::with_clock(PipelineConfig::default(), FixedClock::new(today));
//!
//! let observations = (2019..=2021)
//!     .flat_map(|year| (1..=20).map(move |week| RawObservation::new(year, week, 12.0)))
//!     .collect();
//! let snapshot = WidgetSnapshot::new(observations);
//!
//! let output = pipeline.weekly_output(&snapshot).unwrap();
//! assert_eq!(output.sentence.param("count").unwrap().value(), "0");
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod parsing;
pub mod preprocessing;
pub mod services;
pub mod time;
pub mod transformations;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
