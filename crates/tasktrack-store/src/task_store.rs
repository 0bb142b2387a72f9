use crate::error::StoreError;
use crate::lockfile;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tasktrack_core::task::{Task, TaskId, TaskPriority, TaskStatus};

/// The task list and its JSON file.
///
/// Mutations only touch the in-memory list; nothing reaches disk until
/// [`flush`](Self::flush). The file is a pretty-printed JSON array and a
/// missing file reads as an empty list.
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    /// Highest id this store has seen or issued; ids are never handed out twice.
    high_water: TaskId,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tasks: Vec::new(),
            high_water: 0,
        }
    }

    /// Create a store and load its file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory list with the file contents.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let tasks: Vec<Task> = match fs::read_to_string(&self.path) {
            Ok(data) if data.trim().is_empty() => Vec::new(),
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };
        check_ids(&tasks)?;
        let max_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.high_water = self.high_water.max(max_id);
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        self.tasks = tasks;
        Ok(())
    }

    /// Write the whole list to the file.
    pub fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.tasks)?;
        lockfile::write_atomic(&self.path, json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), count = self.tasks.len(), "flushed tasks");
        Ok(())
    }

    /// Insert a task, numbering it first if it carries the unassigned id.
    ///
    /// Returns the id the task is stored under.
    pub fn add(&mut self, mut task: Task) -> Result<TaskId, StoreError> {
        if !task.is_assigned() {
            task.id = self.next_id()?;
        } else if self.position(task.id).is_some() {
            return Err(StoreError::Conflict(task.id));
        }
        self.high_water = self.high_water.max(task.id);
        let id = task.id;
        self.tasks.push(task);
        Ok(id)
    }

    /// Replace a stored task wholesale.
    pub fn update(&mut self, task: Task) -> Result<(), StoreError> {
        let index = self.position(task.id).ok_or(StoreError::NotFound(task.id))?;
        self.tasks[index] = task;
        Ok(())
    }

    /// Remove a task. Returns `false` if there was nothing to remove.
    pub fn delete(&mut self, id: TaskId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get_by_id(&self, id: TaskId) -> Option<Task> {
        self.tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn get_all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get_by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.filter(|t| t.status == status)
    }

    pub fn get_by_priority(&self, priority: TaskPriority) -> Vec<Task> {
        self.filter(|t| t.priority == priority)
    }

    pub fn get_by_category(&self, category: &str) -> Vec<Task> {
        self.filter(|t| t.has_category(category))
    }

    /// Open tasks whose due date falls before `today`.
    pub fn get_overdue(&self, today: NaiveDate) -> Vec<Task> {
        self.filter(|t| t.is_overdue(today))
    }

    /// Case-insensitive substring match against descriptions.
    pub fn search(&self, term: &str) -> Vec<Task> {
        let needle = term.to_lowercase();
        self.filter(|t| t.description.to_lowercase().contains(&needle))
    }

    /// Append a category if the task does not already carry it.
    pub fn add_category(&mut self, id: TaskId, category: &str) -> Result<(), StoreError> {
        let task = self.get_mut(id)?;
        if !task.add_category(category) {
            // Already present: still counts as a touch of the record.
            task.touch(Utc::now());
        }
        Ok(())
    }

    pub fn update_status(&mut self, id: TaskId, status: TaskStatus) -> Result<(), StoreError> {
        self.get_mut(id)?.set_status(status);
        Ok(())
    }

    pub fn update_priority(&mut self, id: TaskId, priority: TaskPriority) -> Result<(), StoreError> {
        self.get_mut(id)?.set_priority(priority);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn next_id(&mut self) -> Result<TaskId, StoreError> {
        self.high_water = self
            .high_water
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted(self.high_water))?;
        Ok(self.high_water)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TaskId) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn filter(&self, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
        self.tasks.iter().filter(|t| predicate(t)).cloned().collect()
    }
}

/// Every stored task must carry a positive id no other record uses.
fn check_ids(tasks: &[Task]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !task.is_assigned() {
            return Err(StoreError::CorruptFile(format!(
                "task '{}' has id 0",
                task.description
            )));
        }
        if !seen.insert(task.id) {
            return Err(StoreError::CorruptFile(format!(
                "id {} appears more than once",
                task.id
            )));
        }
    }
    Ok(())
}
