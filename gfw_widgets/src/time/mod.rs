//! Time handling: the injectable clock and the ISO week calendar.

pub mod calendar;
pub mod clock;

pub use calendar::{week_start, WeekCalendar, DEFAULT_LAG_DAYS};
pub use clock::{Clock, FixedClock, SystemClock};
