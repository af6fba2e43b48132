//! Data model shared by every stage of the pipeline.

pub mod observation;
pub mod series;
pub mod widget;

pub use observation::*;
pub use series::*;
pub use widget::*;
