use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{Task, TaskDraft};
use crate::reset::{apply_weekly_reset, migrate_records, Quarantined, ResetOutcome};
use crate::schedule::{resolve, ScheduleView};
use crate::storage::Persistence;
use crate::store::TaskStore;
use crate::week::WeekTracker;

/// The records a brand-new database starts with.
pub fn demo_records() -> Vec<Value> {
    vec![
        json!({"id": "1", "day": "Monday", "startTime": "09:00", "endTime": "10:00", "name": "Check Emails", "note": "Reply to urgent matters"}),
        json!({"id": "2", "day": "Monday", "startTime": "10:00", "endTime": "12:00", "name": "Deep Work", "note": "Coding session"}),
        json!({"id": "3", "day": "Monday", "startTime": "12:00", "endTime": "13:00", "name": "Lunch Break", "note": "Relax"}),
    ]
}

/// Owns the task store and the week tracker and keeps them on disk.
///
/// Every mutation goes through `&mut self`, and [`Planner::open`] runs the weekly
/// reset check before handing the planner out, so no read or toggle can ever
/// see the store half-way through a reset.
pub struct Planner {
    store: TaskStore,
    tracker: WeekTracker,
    unreadable: Vec<Quarantined>,
    persistence: Box<dyn Persistence>,
    clock: Box<dyn Clock>,
    checked_on: NaiveDate,
}

impl Planner {
    /// Loads, migrates and reset-checks the stored schedule.
    pub fn open(persistence: Box<dyn Persistence>, clock: Box<dyn Clock>) -> Result<Planner> {
        let now = clock.now();
        let (migration, seeded) = match persistence.load_records()? {
            Some(records) => (migrate_records(records), false),
            None => {
                tracing::info!("no saved schedule, starting from demo blocks");
                (migrate_records(demo_records()), true)
            }
        };
        let tracker = WeekTracker::new(persistence.load_last_reset_date()?);

        let mut planner = Planner {
            store: TaskStore::from_tasks(migration.tasks)?,
            tracker,
            unreadable: migration.quarantined,
            persistence,
            clock,
            checked_on: now.date(),
        };
        let reset = planner.run_reset_check(&now)?;
        if reset.is_none() && (seeded || migration.defaulted > 0) {
            planner.persist()?;
        }
        Ok(planner)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Derives the current/next view from memory. Never touches storage.
    pub fn view(&self) -> ScheduleView<'_> {
        resolve(self.store.all(), &self.clock.now())
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.all()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn last_reset_date(&self) -> Option<NaiveDate> {
        self.tracker.last_reset_date()
    }

    /// Stored records that were set aside at load time. They are written back unchanged.
    pub fn unreadable(&self) -> &[Quarantined] {
        &self.unreadable
    }

    /// Resolves a full id or unique id prefix to the stored id.
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        self.store.find_by_prefix(prefix).map(|t| t.id.clone())
    }

    pub fn add(&mut self, draft: TaskDraft) -> Result<Task> {
        draft.validate()?;
        self.check_weekly_reset()?;
        let task = self.store.add(draft).clone();
        self.persist()?;
        tracing::debug!(id = %task.id, "added block");
        Ok(task)
    }

    /// Replaces the editable fields of `id`, keeping its id and completion flag.
    pub fn update(&mut self, id: &str, draft: TaskDraft) -> Result<Task> {
        draft.validate()?;
        self.check_weekly_reset()?;
        let completed = self
            .store
            .get(id)
            .map(|t| t.completed)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let task = draft.into_task(id.to_string(), completed);
        self.store.update(task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Returns false if there was no such task.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        self.check_weekly_reset()?;
        let removed = self.store.delete(id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Returns the new flag, or `None` if there was no such task.
    pub fn toggle(&mut self, id: &str) -> Result<Option<bool>> {
        self.check_weekly_reset()?;
        let flipped = self.store.toggle_completed(id);
        if flipped.is_some() {
            self.persist()?;
        }
        Ok(flipped)
    }

    /// Runs the weekly reset check against the clock.
    ///
    /// Every mutation calls this first, so nothing is saved on top of last
    /// week's flags while a reset is still owed.
    pub fn check_weekly_reset(&mut self) -> Result<Option<ResetOutcome>> {
        let now = self.clock.now();
        let outcome = self.run_reset_check(&now)?;
        self.checked_on = now.date();
        Ok(outcome)
    }

    /// Call on every refresh; re-checks the reset once per calendar day.
    pub fn tick(&mut self) -> Result<Option<ResetOutcome>> {
        if self.clock.now().date() == self.checked_on {
            return Ok(None);
        }
        self.check_weekly_reset()
    }

    /// Applies a due reset and saves it. If either write fails the store and
    /// tracker are put back as they were, so memory never runs ahead of disk and
    /// the reset is retried by the next check.
    fn run_reset_check(&mut self, now: &NaiveDateTime) -> Result<Option<ResetOutcome>> {
        let before = (self.store.clone(), self.tracker.clone());
        let Some(outcome) = apply_weekly_reset(&mut self.store, &mut self.tracker, now) else {
            return Ok(None);
        };
        let saved = self
            .persist()
            .and_then(|()| self.persistence.save_last_reset_date(outcome.week_start));
        if let Err(e) = saved {
            tracing::warn!(error = %e, "could not save weekly reset, rolled back");
            (self.store, self.tracker) = before;
            return Err(e);
        }
        Ok(Some(outcome))
    }

    fn persist(&self) -> Result<()> {
        let unreadable: Vec<Value> = self.unreadable.iter().map(|q| q.record.clone()).collect();
        self.persistence.save_tasks(self.store.all(), &unreadable)
    }
}
