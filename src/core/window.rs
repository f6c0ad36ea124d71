use chrono::{Days, Local, NaiveDate};

use crate::prelude::*;

/// Half-open calendar-date range `[start, end)`.
///
/// Time-of-day is not part of the provider's filter, its granularity parameter
/// controls sub-day bucketing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
#[display("[{start}, {end})")]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        ensure!(start < end, "the window start `{start}` must precede the end `{end}`");
        Ok(Self { start, end })
    }

    /// Today, midnight to midnight.
    pub fn today() -> Result<Self> {
        Self::last_days(1)
    }

    /// The last `days` days, up to and including today.
    pub fn last_days(days: u64) -> Result<Self> {
        let end = Local::now()
            .date_naive()
            .checked_add_days(Days::new(1))
            .context("the window end overflows the calendar")?;
        let start = end
            .checked_sub_days(Days::new(days))
            .context("the window start underflows the calendar")?;
        Self::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_ends_tomorrow() -> Result {
        let window = Window::today()?;
        assert_eq!(window.end - window.start, chrono::TimeDelta::days(1));
        assert_eq!(window.start, Local::now().date_naive());
        Ok(())
    }

    #[test]
    fn last_days_spans_the_requested_length() -> Result {
        let window = Window::last_days(7)?;
        assert_eq!(window.end - window.start, chrono::TimeDelta::days(7));
        Ok(())
    }

    #[test]
    fn inverted_window_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(Window::new(date, date).is_err());
    }
}
