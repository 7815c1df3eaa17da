use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Returns the Monday of the week containing `now`.
///
/// Weeks run Monday to Sunday, so a Sunday belongs to the week that started six
/// days earlier. The date is the week start at local midnight.
pub fn current_week_start(now: &NaiveDateTime) -> NaiveDate {
    let today = now.date();
    today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

/// Remembers the week in which completion flags were last cleared.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WeekTracker {
    last_reset_date: Option<NaiveDate>,
}

impl WeekTracker {
    pub fn new(last_reset_date: Option<NaiveDate>) -> WeekTracker {
        WeekTracker { last_reset_date }
    }

    pub fn last_reset_date(&self) -> Option<NaiveDate> {
        self.last_reset_date
    }

    /// True on first run, or once `now` falls in a week other than the last reset's.
    pub fn is_reset_due(&self, now: &NaiveDateTime) -> bool {
        self.last_reset_date != Some(current_week_start(now))
    }

    pub fn mark_reset(&mut self, now: &NaiveDateTime) -> NaiveDate {
        let week_start = current_week_start(now);
        self.last_reset_date = Some(week_start);
        week_start
    }
}
