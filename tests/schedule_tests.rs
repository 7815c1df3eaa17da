use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use focusflow::clock::FixedClock;
use focusflow::planner::Planner;
use focusflow::schedule::resolve;
use focusflow::storage::{JsonStorage, Persistence};
use focusflow::week::WeekTracker;
use serde_json::json;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_new_week_clears_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let storage = JsonStorage::at(&path);
    fs::write(
        &path,
        json!([{"id": "1", "day": "Monday", "startTime": "09:00", "endTime": "10:00", "name": "Standup", "completed": true}]).to_string(),
    )
    .unwrap();
    storage.save_last_reset_date(date("2026-10-12")).unwrap();

    let planner = Planner::open(Box::new(storage.clone()), Box::new(FixedClock(at("2026-10-19 08:00")))).unwrap();

    assert!(!planner.store().get("1").unwrap().completed);
    assert_eq!(planner.last_reset_date(), Some(date("2026-10-19")));
    assert_eq!(storage.load_last_reset_date().unwrap(), Some(date("2026-10-19")));
    let on_disk = storage.load_records().unwrap().unwrap();
    assert_eq!(on_disk[0]["completed"], false);

    let view = planner.view();
    assert!(view.active.is_none());
    assert_eq!(view.next.map(|t| t.id.as_str()), Some("1"));
}

#[test]
fn test_same_week_keeps_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let storage = JsonStorage::at(&path);
    fs::write(
        &path,
        json!([{"id": "1", "day": "Monday", "startTime": "09:00", "endTime": "10:00", "name": "Standup", "completed": true}]).to_string(),
    )
    .unwrap();
    storage.save_last_reset_date(date("2026-10-19")).unwrap();

    // Sunday still belongs to the week starting 2026-10-19.
    let planner = Planner::open(Box::new(storage), Box::new(FixedClock(at("2026-10-25 21:00")))).unwrap();
    assert!(planner.store().get("1").unwrap().completed);
}

#[test]
fn test_legacy_and_malformed_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let storage = JsonStorage::at(&path);
    storage.save_last_reset_date(date("2026-10-19")).unwrap();
    fs::write(
        &path,
        json!([
            {"id": "1", "day": "Tuesday", "startTime": "09:00", "endTime": "10:00", "name": "Legacy", "note": ""},
            {"id": "2", "day": "Tuesday", "startTime": "9:30", "endTime": "10:00", "name": "Broken"},
            {"id": "3", "day": "Tuesday", "startTime": "10:30", "endTime": "10:00", "name": "Inverted", "completed": false}
        ])
        .to_string(),
    )
    .unwrap();

    let planner = Planner::open(Box::new(storage.clone()), Box::new(FixedClock(at("2026-10-20 09:45")))).unwrap();
    assert_eq!(planner.tasks().len(), 2);
    assert_eq!(planner.unreadable().len(), 1);

    let view = planner.view();
    assert_eq!(view.active.map(|t| t.id.as_str()), Some("1"));
    assert!(view.next.is_none());
    assert_eq!(view.warnings.len(), 1);
    assert!((view.progress_percent - 75.0).abs() < f64::EPSILON);

    // Migration wrote the defaulted flag back and kept the broken record.
    let on_disk = storage.load_records().unwrap().unwrap();
    assert_eq!(on_disk.len(), 3);
    assert_eq!(on_disk[0]["completed"], false);
    assert!(on_disk.iter().any(|r| r["startTime"] == "9:30"));
}

#[test]
fn test_reset_due_lifecycle() {
    let mut tracker = WeekTracker::default();
    let now = at("2026-10-22 15:00");
    assert!(tracker.is_reset_due(&now));
    tracker.mark_reset(&now);
    assert!(!tracker.is_reset_due(&now));
    assert!(tracker.is_reset_due(&at("2026-10-26 00:00")));
}

#[test]
fn test_overlap_and_boundaries() {
    let tasks: Vec<focusflow::models::Task> = serde_json::from_value(json!([
        {"id": "A", "day": "Monday", "startTime": "09:00", "endTime": "11:00", "name": "Long"},
        {"id": "B", "day": "Monday", "startTime": "10:00", "endTime": "10:30", "name": "Short"},
        {"id": "C", "day": "Monday", "startTime": "13:00", "endTime": "14:00", "name": "Afternoon"}
    ]))
    .unwrap();

    let view = resolve(&tasks, &at("2026-10-19 10:15"));
    assert_eq!(view.active.map(|t| t.id.as_str()), Some("B"));
    assert_eq!(view.next.map(|t| t.id.as_str()), Some("C"));
    assert!((view.progress_percent - 50.0).abs() < 1e-9);

    let view = resolve(&tasks, &at("2026-10-19 12:00"));
    assert!(view.active.is_none());
    assert_eq!(view.next.map(|t| t.id.as_str()), Some("C"));

    let view = resolve(&tasks, &at("2026-10-19 13:59"));
    assert!((view.progress_percent - 98.333_333).abs() < 1e-3);

    let view = resolve(&tasks, &at("2026-10-19 14:00"));
    assert!(view.active.is_none());
    assert!(view.next.is_none());
}
