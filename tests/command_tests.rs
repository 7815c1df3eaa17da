use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use focusflow::clock::FixedClock;
use focusflow::commands::*;
use focusflow::planner::Planner;
use focusflow::storage::{JsonStorage, Persistence};

// 2026-10-21 is a Wednesday.
const NOW: &str = "2026-10-21 10:15";

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn open(path: &Path, now: &str) -> Planner {
    Planner::open(Box::new(JsonStorage::at(path)), Box::new(FixedClock(at(now)))).unwrap()
}

fn with_test_db<F>(f: F)
where
    F: FnOnce(PathBuf),
{
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tasks.json");
    // Start from an empty schedule rather than the demo blocks.
    fs::write(&db_path, "[]").unwrap();
    f(db_path);
}

#[test]
fn test_add_and_list() {
    with_test_db(|path| {
        let mut planner = open(&path, NOW);
        cmd_add(&mut planner, "Deep Work".into(), None, "10:00".into(), "12:00".into(), Some("Coding session".into()), Some("emerald".into()), true).unwrap();

        let planner = open(&path, NOW);
        let tasks = planner.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Deep Work");
        assert_eq!(tasks[0].day.to_string(), "Wednesday");
        assert_eq!(tasks[0].note.as_deref(), Some("Coding session"));
        assert!(!tasks[0].completed);
        assert!(cmd_list(&planner, None).is_ok());
        assert!(cmd_list(&planner, Some("fri".into())).is_ok());
    });
}

#[test]
fn test_add_rejects_bad_input() {
    with_test_db(|path| {
        let mut planner = open(&path, NOW);
        assert!(cmd_add(&mut planner, "Late".into(), None, "25:00".into(), "26:00".into(), None, None, true).is_err());
        assert!(cmd_add(&mut planner, "Backwards".into(), None, "12:00".into(), "11:00".into(), None, None, true).is_err());
        assert!(cmd_add(&mut planner, "Nowhere".into(), Some("Someday".into()), "09:00".into(), "10:00".into(), None, None, true).is_err());
        assert!(planner.tasks().is_empty());
    });
}

#[test]
fn test_toggle_by_prefix_persists() {
    with_test_db(|path| {
        let mut planner = open(&path, NOW);
        cmd_add(&mut planner, "Standup".into(), Some("Wednesday".into()), "09:00".into(), "09:15".into(), None, None, true).unwrap();
        let id = planner.tasks()[0].id.clone();

        cmd_toggle(&mut planner, &id[..6], true).unwrap();
        assert!(open(&path, NOW).tasks()[0].completed);

        cmd_toggle(&mut planner, &id, true).unwrap();
        assert!(!open(&path, NOW).tasks()[0].completed);
    });
}

#[test]
fn test_unknown_ids_are_no_ops() {
    with_test_db(|path| {
        let mut planner = open(&path, NOW);
        cmd_add(&mut planner, "Only".into(), None, "09:00".into(), "10:00".into(), None, None, true).unwrap();

        cmd_remove(&mut planner, "does-not-exist", true).unwrap();
        cmd_toggle(&mut planner, "does-not-exist", true).unwrap();
        cmd_edit(&mut planner, "does-not-exist", Some("x".into()), None, None, None, None, None, true).unwrap();

        let tasks = open(&path, NOW).tasks().to_vec();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Only");
        assert!(!tasks[0].completed);
    });
}

#[test]
fn test_edit_keeps_completion() {
    with_test_db(|path| {
        let mut planner = open(&path, NOW);
        cmd_add(&mut planner, "Read".into(), None, "20:00".into(), "21:00".into(), None, None, true).unwrap();
        let id = planner.tasks()[0].id.clone();
        cmd_toggle(&mut planner, &id, true).unwrap();

        cmd_edit(&mut planner, &id, Some("Read a book".into()), Some("Thursday".into()), Some("20:30".into()), None, Some("fiction".into()), Some("sky".into()), true).unwrap();

        let task = open(&path, NOW).tasks()[0].clone();
        assert_eq!(task.id, id);
        assert_eq!(task.name, "Read a book");
        assert_eq!(task.day.to_string(), "Thursday");
        assert_eq!(task.start_time.to_string(), "20:30");
        assert_eq!(task.end_time.to_string(), "21:00");
        assert_eq!(task.color.as_deref(), Some("sky"));
        assert!(task.completed);

        assert!(cmd_edit(&mut planner, &id, None, None, Some("21:30".into()), None, None, None, true).is_err());
    });
}

#[test]
fn test_remove() {
    with_test_db(|path| {
        let mut planner = open(&path, NOW);
        cmd_add(&mut planner, "A".into(), None, "09:00".into(), "10:00".into(), None, None, true).unwrap();
        cmd_add(&mut planner, "B".into(), None, "10:00".into(), "11:00".into(), None, None, true).unwrap();
        let id = planner.tasks()[0].id.clone();

        cmd_remove(&mut planner, &id, true).unwrap();

        let tasks = open(&path, NOW).tasks().to_vec();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "B");
    });
}

#[test]
fn test_first_run_seeds_demo_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh").join("tasks.json");
    // A Monday, during "Deep Work".
    let planner = open(&path, "2026-10-19 11:00");
    assert_eq!(planner.tasks().len(), 3);
    let view = planner.view();
    assert_eq!(view.active.map(|t| t.name.as_str()), Some("Deep Work"));
    assert_eq!(view.progress_percent, 50.0);
    assert!(path.exists());
    assert!(JsonStorage::at(&path).load_last_reset_date().unwrap().is_some());
}

#[test]
fn test_wipe_removes_files() {
    with_test_db(|path| {
        let planner = open(&path, NOW);
        drop(planner);
        let storage = JsonStorage::at(&path);
        assert!(storage.reset_path().exists());

        cmd_wipe(&storage, true).unwrap();
        assert!(!path.exists());
        assert!(!storage.reset_path().exists());
    });
}
