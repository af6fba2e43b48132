//! Service layer for widget derivations.
//!
//! Each service is a pure function over densified weekly series: zero
//! filling, cross-year baselines, running totals, sentence parameters and
//! chart descriptors. The derived-state graph in
//! [`crate::preprocessing`] wires them together and memoizes the results.

pub mod chart_config;
pub mod cumulative;
pub mod densify;
pub mod format;
pub mod palette;
pub mod sentence;
pub mod statistics;

#[cfg(test)]
mod statistics_tests;

pub use chart_config::{build_cumulative_config, build_weekly_config, ChartConfig, TooltipField, UnitFormat};
pub use cumulative::{compute_cumulative, max_week, resolve_compare_years, running_totals, CumulativeSeries};
pub use densify::{densify, densify_full_years, densify_with, derive_start_year, DensifyMode};
pub use sentence::{cumulative_sentence, weekly_sentence, SentenceContext};
pub use statistics::{compute_latest_stats, compute_stats};
