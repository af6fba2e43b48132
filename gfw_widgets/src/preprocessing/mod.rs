//! Derived-state graph of the widgets.
//!
//! A [`WidgetSnapshot`] holds the raw inputs; [`WidgetPipeline`] derives the
//! densified series, baselines, cumulative view, sentences and chart
//! configurations from it, memoizing every node.

pub mod memo;
pub mod pipeline;

pub use memo::Memo;
pub use pipeline::{CumulativeOutput, WeeklyOutput, WidgetPipeline, WidgetSnapshot};
