use chrono::NaiveDateTime;

use crate::models::{ClockTime, Day, Task};

/// A data problem found while resolving, reported instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleWarning {
    /// The block does not start before it ends and was skipped.
    InvertedSpan {
        id: String,
        name: String,
        start: ClockTime,
        end: ClockTime,
    },
}

impl std::fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleWarning::InvertedSpan { name, start, end, .. } => {
                write!(f, "'{}' ignored: starts at {} but ends at {}", name, start, end)
            }
        }
    }
}

/// What is happening now, derived from the task list and a single instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleView<'a> {
    pub today: Day,
    pub now: ClockTime,
    /// Today's blocks in ascending start order.
    pub agenda: Vec<&'a Task>,
    pub active: Option<&'a Task>,
    pub next: Option<&'a Task>,
    /// Elapsed share of the active block, in `[0, 100]`. Zero when nothing is active.
    pub progress_percent: f64,
    pub warnings: Vec<ScheduleWarning>,
}

/// Blocks scheduled on `day`, sorted by start time.
pub fn agenda_for(tasks: &[Task], day: Day) -> Vec<&Task> {
    let mut agenda: Vec<&Task> = tasks.iter().filter(|t| t.day == day).collect();
    agenda.sort_by_key(|t| t.start_time);
    agenda
}

/// All seven days, Monday first, each with its sorted agenda.
pub fn week_overview(tasks: &[Task]) -> Vec<(Day, Vec<&Task>)> {
    Day::ALL.iter().map(|&d| (d, agenda_for(tasks, d))).collect()
}

/// Resolves the active block, the next block and the active block's progress.
///
/// A block is active while `start <= now < end`. When blocks overlap, the one
/// that starts latest wins. The next block is the earliest one starting after
/// `now`. Seconds are ignored.
pub fn resolve<'a>(tasks: &'a [Task], now: &NaiveDateTime) -> ScheduleView<'a> {
    let today = Day::of(now);
    let current = ClockTime::of(now);
    let agenda = agenda_for(tasks, today);

    let mut active: Option<&Task> = None;
    let mut next: Option<&Task> = None;
    let mut warnings = Vec::new();

    for &t in &agenda {
        if !t.is_well_formed() {
            tracing::debug!(id = %t.id, "skipping block with inverted span");
            warnings.push(ScheduleWarning::InvertedSpan {
                id: t.id.clone(),
                name: t.name.clone(),
                start: t.start_time,
                end: t.end_time,
            });
            continue;
        }
        if t.start_time <= current && current < t.end_time {
            active = Some(t);
        } else if t.start_time > current && next.is_none() {
            next = Some(t);
        }
    }

    let progress_percent = active.map_or(0.0, |t| progress_percent(t, current));

    ScheduleView {
        today,
        now: current,
        agenda,
        active,
        next,
        progress_percent,
        warnings,
    }
}

/// Share of `task` elapsed at `now`, clamped to `[0, 100]`.
pub fn progress_percent(task: &Task, now: ClockTime) -> f64 {
    let total = task.duration_minutes();
    if total == 0 {
        return 0.0;
    }
    let elapsed = now.minutes_since_midnight() as f64 - task.start_time.minutes_since_midnight() as f64;
    (elapsed / total as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, day: Day, start: &str, end: &str) -> Task {
        Task {
            id: id.into(),
            day,
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            name: format!("task {id}"),
            note: None,
            completed: false,
            color: None,
        }
    }

    // 2026-10-19 is a Monday.
    fn monday_at(time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2026-10-19 {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn empty_schedule_has_nothing_active() {
        let view = resolve(&[], &monday_at("10:00:00"));
        assert_eq!(view.today, Day::Monday);
        assert!(view.active.is_none());
        assert!(view.next.is_none());
        assert_eq!(view.progress_percent, 0.0);
    }

    #[test]
    fn gap_between_blocks_reports_next_only() {
        let tasks = vec![
            task("b", Day::Monday, "11:00", "12:00"),
            task("a", Day::Monday, "09:00", "10:00"),
        ];
        let view = resolve(&tasks, &monday_at("10:30:00"));
        assert!(view.active.is_none());
        assert_eq!(view.next.map(|t| t.id.as_str()), Some("b"));
        assert_eq!(view.progress_percent, 0.0);
    }

    #[test]
    fn later_starting_overlap_wins() {
        let tasks = vec![
            task("A", Day::Monday, "09:00", "11:00"),
            task("B", Day::Monday, "10:00", "10:30"),
        ];
        let view = resolve(&tasks, &monday_at("10:15:00"));
        assert_eq!(view.active.map(|t| t.id.as_str()), Some("B"));
    }

    #[test]
    fn progress_boundaries() {
        let tasks = vec![task("a", Day::Monday, "09:00", "10:00")];

        let at_start = resolve(&tasks, &monday_at("09:00:00"));
        assert_eq!(at_start.active.map(|t| t.id.as_str()), Some("a"));
        assert_eq!(at_start.progress_percent, 0.0);

        let last_minute = resolve(&tasks, &monday_at("09:59:59"));
        assert!((last_minute.progress_percent - 98.333).abs() < 0.01);

        let at_end = resolve(&tasks, &monday_at("10:00:00"));
        assert!(at_end.active.is_none());
        assert_eq!(at_end.progress_percent, 0.0);
    }

    #[test]
    fn next_is_earliest_future_block() {
        let tasks = vec![
            task("late", Day::Monday, "15:00", "16:00"),
            task("soon", Day::Monday, "13:00", "14:00"),
            task("now", Day::Monday, "12:00", "13:00"),
        ];
        let view = resolve(&tasks, &monday_at("12:10:00"));
        assert_eq!(view.active.map(|t| t.id.as_str()), Some("now"));
        assert_eq!(view.next.map(|t| t.id.as_str()), Some("soon"));
        let ids: Vec<&str> = view.agenda.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["now", "soon", "late"]);
    }

    #[test]
    fn other_days_are_ignored() {
        let tasks = vec![task("tue", Day::Tuesday, "09:00", "17:00")];
        let view = resolve(&tasks, &monday_at("10:00:00"));
        assert!(view.agenda.is_empty());
        assert!(view.active.is_none());
        assert!(view.next.is_none());
    }

    #[test]
    fn inverted_blocks_are_excluded_with_warning() {
        let tasks = vec![
            task("bad", Day::Monday, "11:00", "09:00"),
            task("empty", Day::Monday, "12:00", "12:00"),
            task("ok", Day::Monday, "13:00", "14:00"),
        ];
        let view = resolve(&tasks, &monday_at("10:00:00"));
        assert!(view.active.is_none());
        assert_eq!(view.next.map(|t| t.id.as_str()), Some("ok"));
        assert_eq!(view.warnings.len(), 2);
        assert_eq!(view.agenda.len(), 3);
    }

    #[test]
    fn week_overview_starts_on_monday() {
        let tasks = vec![
            task("sun", Day::Sunday, "08:00", "09:00"),
            task("mon2", Day::Monday, "10:00", "11:00"),
            task("mon1", Day::Monday, "07:00", "08:00"),
        ];
        let week = week_overview(&tasks);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].0, Day::Monday);
        assert_eq!(week[0].1.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), ["mon1", "mon2"]);
        assert_eq!(week[6].1.len(), 1);
    }
}
