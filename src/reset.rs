//! Weekly clearing of completion flags, and the load-time migration that must
//! run before it.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::models::{RawTask, Task};
use crate::store::TaskStore;
use crate::week::WeekTracker;

/// Whether the store still carries last week's completion flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    UpToDate,
    PendingReset,
}

pub fn evaluate(tracker: &WeekTracker, now: &NaiveDateTime) -> ResetState {
    if tracker.is_reset_due(now) {
        ResetState::PendingReset
    } else {
        ResetState::UpToDate
    }
}

/// Result of a reset that actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetOutcome {
    pub week_start: NaiveDate,
    /// Number of blocks that were marked completed before the reset.
    pub cleared: usize,
}

/// Clears every completion flag and advances the tracker, if a new week has begun.
///
/// Both halves happen under the same exclusive borrow, so nothing can observe
/// the store between them.
pub fn apply_weekly_reset(
    store: &mut TaskStore,
    tracker: &mut WeekTracker,
    now: &NaiveDateTime,
) -> Option<ResetOutcome> {
    match evaluate(tracker, now) {
        ResetState::UpToDate => {
            tracing::debug!(last = ?tracker.last_reset_date(), "completion flags up to date");
            None
        }
        ResetState::PendingReset => {
            let cleared = store.reset_all_completed();
            let week_start = tracker.mark_reset(now);
            tracing::info!(%week_start, cleared, "new week, cleared completion flags");
            Some(ResetOutcome { week_start, cleared })
        }
    }
}

/// A stored record that could not be turned into a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Quarantined {
    pub record: Value,
    pub reason: String,
}

/// Tasks recovered from storage, plus what had to be set aside.
#[derive(Debug, Default, Clone)]
pub struct Migration {
    pub tasks: Vec<Task>,
    pub quarantined: Vec<Quarantined>,
    /// Records that lacked a `completed` field and were defaulted to false.
    pub defaulted: usize,
}

/// Normalizes raw stored records into typed tasks.
///
/// Records with malformed fields or an id already seen are quarantined with a
/// warning instead of failing the whole load.
pub fn migrate_records(records: Vec<Value>) -> Migration {
    let mut migration = Migration::default();
    let mut seen = HashSet::new();

    for record in records {
        let parsed = serde_json::from_value::<RawTask>(record.clone())
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                let defaulted = raw.completed.is_none();
                raw.normalize().map(|t| (t, defaulted)).map_err(|e| e.to_string())
            });

        match parsed {
            Ok((task, _)) if seen.contains(&task.id) => {
                let reason = format!("duplicate id {}", task.id);
                tracing::warn!(%reason, "quarantined stored task");
                migration.quarantined.push(Quarantined { record, reason });
            }
            Ok((task, defaulted)) => {
                if defaulted {
                    migration.defaulted += 1;
                }
                seen.insert(task.id.clone());
                migration.tasks.push(task);
            }
            Err(reason) => {
                tracing::warn!(%reason, "quarantined stored task");
                migration.quarantined.push(Quarantined { record, reason });
            }
        }
    }

    if migration.defaulted > 0 {
        tracing::info!(count = migration.defaulted, "defaulted missing completion flags");
    }
    migration
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, TaskDraft};
    use serde_json::json;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn completed_store() -> (TaskStore, String) {
        let mut store = TaskStore::new();
        let id = store
            .add(TaskDraft {
                day: Day::Monday,
                start_time: "09:00".parse().unwrap(),
                end_time: "10:00".parse().unwrap(),
                name: "Standup".into(),
                note: None,
                color: None,
            })
            .id
            .clone();
        store.toggle_completed(&id);
        (store, id)
    }

    #[test]
    fn first_run_resets_and_records_week() {
        let (mut store, id) = completed_store();
        let mut tracker = WeekTracker::default();
        let outcome = apply_weekly_reset(&mut store, &mut tracker, &at("2026-10-21 12:00")).unwrap();
        assert_eq!(outcome.cleared, 1);
        assert_eq!(outcome.week_start, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert!(!store.get(&id).unwrap().completed);
    }

    #[test]
    fn second_check_in_same_week_keeps_toggles() {
        let (mut store, id) = completed_store();
        let mut tracker = WeekTracker::default();
        apply_weekly_reset(&mut store, &mut tracker, &at("2026-10-19 08:00"));
        store.toggle_completed(&id);

        assert_eq!(evaluate(&tracker, &at("2026-10-25 22:00")), ResetState::UpToDate);
        assert!(apply_weekly_reset(&mut store, &mut tracker, &at("2026-10-25 22:00")).is_none());
        assert!(store.get(&id).unwrap().completed);

        assert_eq!(evaluate(&tracker, &at("2026-10-26 00:01")), ResetState::PendingReset);
        assert!(apply_weekly_reset(&mut store, &mut tracker, &at("2026-10-26 00:01")).is_some());
        assert!(!store.get(&id).unwrap().completed);
    }

    #[test]
    fn migration_defaults_missing_completed() {
        let migration = migrate_records(vec![
            json!({"id": "1", "day": "Monday", "startTime": "09:00", "endTime": "10:00", "name": "Check Emails", "note": "Reply to urgent matters"}),
            json!({"id": "2", "day": "Monday", "startTime": "10:00", "endTime": "12:00", "name": "Deep Work", "completed": true}),
        ]);
        assert_eq!(migration.tasks.len(), 2);
        assert_eq!(migration.defaulted, 1);
        assert!(!migration.tasks[0].completed);
        assert!(migration.tasks[1].completed);
        assert!(migration.quarantined.is_empty());
    }

    #[test]
    fn migration_quarantines_bad_and_duplicate_records() {
        let migration = migrate_records(vec![
            json!({"id": "1", "day": "Monday", "startTime": "9:00", "endTime": "10:00", "name": "Bad time"}),
            json!({"id": "2", "day": "Someday", "startTime": "09:00", "endTime": "10:00", "name": "Bad day"}),
            json!({"id": "3", "day": "Friday", "startTime": "09:00", "endTime": "10:00", "name": "Good"}),
            json!({"id": "3", "day": "Friday", "startTime": "11:00", "endTime": "12:00", "name": "Dup"}),
            json!("not even an object"),
            json!({"id": "4", "day": "Friday", "startTime": "13:00", "endTime": "14:00", "name": ""}),
        ]);
        assert_eq!(migration.tasks.len(), 1);
        assert_eq!(migration.tasks[0].name, "Good");
        assert_eq!(migration.quarantined.len(), 5);
        assert!(migration.quarantined[4].reason.contains("empty name"));
        assert!(migration.quarantined[2].reason.contains("duplicate"));
    }
}
