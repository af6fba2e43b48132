use chrono::{NaiveDate, Utc};

/// Source of "today" for every calendar computation.
///
/// The pipeline never reads the system time directly; hosts pass a clock so
/// that week resolution and densification are deterministic under test.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system time, in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock frozen at a fixed date.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use gfw_widgets::time::{Clock, FixedClock};
///
/// let clock = FixedClock::new(NaiveDate::from_ymd_opt(2021, 1, 15).unwrap());
/// assert_eq!(clock.today().to_string(), "2021-01-15");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveDate);

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
