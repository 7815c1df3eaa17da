use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Task, TaskDraft};

/// In-memory collection of schedule blocks.
///
/// The store only mutates memory; callers flush to storage after each change.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> TaskStore {
        TaskStore::default()
    }

    /// Builds a store from already-normalized tasks, rejecting duplicate ids.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<TaskStore> {
        let mut store = TaskStore::new();
        for t in tasks {
            store.insert(t)?;
        }
        Ok(store)
    }

    /// Adds a new block with a freshly generated id. `completed` starts false.
    pub fn add(&mut self, draft: TaskDraft) -> &Task {
        let id = Uuid::new_v4().to_string();
        self.tasks.push(draft.into_task(id, false));
        &self.tasks[self.tasks.len() - 1]
    }

    /// Inserts a task whose id is supplied by the caller.
    ///
    /// Colliding ids are rejected rather than overwritten.
    pub fn insert(&mut self, task: Task) -> Result<()> {
        if self.get(&task.id).is_some() {
            return Err(Error::DuplicateId(task.id));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Replaces the task sharing `task.id`. Returns false if there was none.
    pub fn update(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(t) => {
                *t = task;
                true
            }
            None => false,
        }
    }

    /// Removes the task with `id`. Returns false if there was none.
    pub fn delete(&mut self, id: &str) -> bool {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != len_before
    }

    /// Flips `completed` and returns the new value, or `None` if `id` is unknown.
    pub fn toggle_completed(&mut self, id: &str) -> Option<bool> {
        let t = self.tasks.iter_mut().find(|t| t.id == id)?;
        t.completed = !t.completed;
        Some(t.completed)
    }

    /// Clears every completion flag. Returns how many were set.
    pub fn reset_all_completed(&mut self) -> usize {
        let mut cleared = 0;
        for t in self.tasks.iter_mut().filter(|t| t.completed) {
            t.completed = false;
            cleared += 1;
        }
        cleared
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolves an exact id or a unique id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Task> {
        if let Some(t) = self.get(prefix) {
            return Ok(t);
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(t), None) if !prefix.is_empty() => Ok(t),
            (Some(_), _) => Err(Error::AmbiguousId(prefix.to_string())),
            (None, _) => Err(Error::TaskNotFound(prefix.to_string())),
        }
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
