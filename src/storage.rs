use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::Task;

/// Durable home for the task list and the last reset date.
pub trait Persistence {
    /// Raw task records, or `None` if nothing has ever been saved.
    fn load_records(&self) -> Result<Option<Vec<Value>>>;
    /// Writes `tasks` followed by records that could not be loaded, untouched.
    fn save_tasks(&self, tasks: &[Task], unreadable: &[Value]) -> Result<()>;
    fn load_last_reset_date(&self) -> Result<Option<NaiveDate>>;
    fn save_last_reset_date(&self, date: NaiveDate) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetRecord {
    last_reset_date: NaiveDate,
}

/// JSON files in the user's data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    tasks_path: PathBuf,
}

impl JsonStorage {
    /// Uses the tasks database path in the following order:
    /// 1. `FOCUSFLOW_DB` environment variable.
    /// 2. `~/.local/share/focusflow/tasks.json` (on Linux).
    /// 3. `./tasks.json` (fallback).
    pub fn from_env() -> JsonStorage {
        let tasks_path = std::env::var("FOCUSFLOW_DB").map(PathBuf::from).unwrap_or_else(|_| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("focusflow");
            p.push("tasks.json");
            p
        });
        JsonStorage { tasks_path }
    }

    pub fn at(tasks_path: impl Into<PathBuf>) -> JsonStorage {
        JsonStorage {
            tasks_path: tasks_path.into(),
        }
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    /// Located in the same directory as the tasks database.
    pub fn reset_path(&self) -> PathBuf {
        let mut p = self.tasks_path.clone();
        p.pop();
        p.push("last_reset.json");
        p
    }

    /// Deletes the tasks and reset-date files.
    pub fn delete_database(&self) -> Result<()> {
        for path in [self.tasks_path.clone(), self.reset_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
                tracing::info!(path = %path.display(), "removed");
            }
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    Ok(Some(s))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(contents.as_bytes())?;
    Ok(())
}

fn to_records(tasks: &[Task], unreadable: &[Value]) -> Result<Vec<Value>> {
    let mut records = Vec::with_capacity(tasks.len() + unreadable.len());
    for t in tasks {
        records.push(serde_json::to_value(t)?);
    }
    records.extend(unreadable.iter().cloned());
    Ok(records)
}

impl Persistence for JsonStorage {
    fn load_records(&self) -> Result<Option<Vec<Value>>> {
        match read_file(&self.tasks_path)? {
            Some(s) if s.trim().is_empty() => Ok(Some(Vec::new())),
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn save_tasks(&self, tasks: &[Task], unreadable: &[Value]) -> Result<()> {
        let s = serde_json::to_string_pretty(&to_records(tasks, unreadable)?)?;
        write_file(&self.tasks_path, &s)?;
        tracing::debug!(path = %self.tasks_path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    fn load_last_reset_date(&self) -> Result<Option<NaiveDate>> {
        match read_file(&self.reset_path())? {
            Some(s) => {
                let record: ResetRecord = serde_json::from_str(&s)?;
                Ok(Some(record.last_reset_date))
            }
            None => Ok(None),
        }
    }

    fn save_last_reset_date(&self, date: NaiveDate) -> Result<()> {
        let s = serde_json::to_string_pretty(&ResetRecord { last_reset_date: date })?;
        write_file(&self.reset_path(), &s)
    }
}

/// Keeps everything in memory. Starts out as an empty, already-saved database.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RefCell<Option<Vec<Value>>>,
    last_reset_date: RefCell<Option<NaiveDate>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage {
            records: RefCell::new(Some(Vec::new())),
            last_reset_date: RefCell::new(None),
        }
    }

    /// A database that has never been written.
    pub fn fresh() -> MemoryStorage {
        MemoryStorage::default()
    }

    pub fn with_records(records: Vec<Value>, last_reset_date: Option<NaiveDate>) -> MemoryStorage {
        MemoryStorage {
            records: RefCell::new(Some(records)),
            last_reset_date: RefCell::new(last_reset_date),
        }
    }

    pub fn records(&self) -> Vec<Value> {
        self.records.borrow().clone().unwrap_or_default()
    }
}

impl Persistence for MemoryStorage {
    fn load_records(&self) -> Result<Option<Vec<Value>>> {
        Ok(self.records.borrow().clone())
    }

    fn save_tasks(&self, tasks: &[Task], unreadable: &[Value]) -> Result<()> {
        *self.records.borrow_mut() = Some(to_records(tasks, unreadable)?);
        Ok(())
    }

    fn load_last_reset_date(&self) -> Result<Option<NaiveDate>> {
        Ok(*self.last_reset_date.borrow())
    }

    fn save_last_reset_date(&self, date: NaiveDate) -> Result<()> {
        *self.last_reset_date.borrow_mut() = Some(date);
        Ok(())
    }
}
