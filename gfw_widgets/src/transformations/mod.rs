//! Windowing transforms applied to derived series.
//!
//! # Modules
//!
//! - [`window`]: Brush (inclusive index range) and trailing-weeks windows
//!
//! # Example
//!
//! ```
//! use gfw_widgets::transformations::{brush, trailing};
//!
//! let weeks: Vec<u32> = (1..=52).collect();
//! assert_eq!(brush(&weeks, Some(0), Some(3)), vec![1, 2, 3, 4]);
//! assert_eq!(trailing(&weeks, Some(2)), vec![51, 52]);
//! ```

pub mod window;

pub use window::{brush, resolve_window, trailing, BrushWindow};
