//! High-level task store for daylist.
//!
//! `TaskStore` exclusively owns the canonical task list. Every mutation
//! rewrites the persisted snapshot synchronously and publishes a fresh
//! immutable snapshot to subscribers; consumers never hold an independent
//! copy of the list, only snapshots derived from it.

use crate::id::generate_id;
use crate::storage::Storage;
use crate::types::{Direction, Status, Task, ValidationError, normalize_days};
use chrono::{Local, Utc};
use eyre::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Validation error.
    Validation(ValidationError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Validation(e) => write!(f, "validation error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// The main daylist store.
pub struct TaskStore {
    storage: Storage,
    tasks: Vec<Task>,
    snapshot_tx: watch::Sender<Arc<Vec<Task>>>,
}

impl TaskStore {
    /// Initialize a new store in the given directory.
    pub fn init(root: &Path) -> Result<Self> {
        let storage = Storage::init(root)?;
        Self::from_storage(storage)
    }

    /// Open an existing store, rehydrating the task list from disk.
    pub fn open(root: &Path) -> Result<Self> {
        let storage = Storage::open(root)?;
        Self::from_storage(storage)
    }

    fn from_storage(storage: Storage) -> Result<Self> {
        let tasks = storage.load_tasks()?;
        let (snapshot_tx, _) = watch::channel(Arc::new(tasks.clone()));

        Ok(Self {
            storage,
            tasks,
            snapshot_tx,
        })
    }

    /// Subscribe to task list snapshots. The receiver sees the current
    /// snapshot immediately and a fresh one after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Task>>> {
        self.snapshot_tx.subscribe()
    }

    /// The current immutable snapshot of the task list.
    pub fn tasks(&self) -> Arc<Vec<Task>> {
        self.snapshot_tx.borrow().clone()
    }

    /// Get a task by ID.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of tasks in the list.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Persist the current list and publish a fresh snapshot.
    ///
    /// A write failure is logged and the in-memory mutation stands; no store
    /// operation is fatal.
    fn persist_and_notify(&mut self) {
        if let Err(e) = self.storage.save_tasks(&self.tasks) {
            log::warn!("Failed to persist task list: {}", e);
        }
        self.snapshot_tx.send_replace(Arc::new(self.tasks.clone()));
    }

    /// Add a task to the end of the list.
    ///
    /// The new task starts undone with a count of 1. An empty day set means
    /// the task applies every day.
    pub fn add(&mut self, text: &str, days: &[u8]) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: generate_id(text, now),
            text: text.to_string(),
            status: Status::Undone,
            days: normalize_days(days),
            count: 1,
        };

        // Validate before persisting
        task.validate().map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        self.tasks.push(task.clone());
        self.persist_and_notify();

        Ok(task)
    }

    /// Remove the task with the given ID. No-op returning `false` if the ID
    /// is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);

        if self.tasks.len() == before {
            log::debug!("delete: no task with id {}", id);
            return false;
        }

        self.persist_and_notify();
        true
    }

    /// Replace the text of the task with the given ID in place. `Ok(false)`
    /// if the ID is unknown.
    pub fn edit(&mut self, id: &str, text: &str) -> Result<bool> {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            log::debug!("edit: no task with id {}", id);
            return Ok(false);
        };

        let mut updated = self.tasks[index].clone();
        updated.text = text.to_string();
        updated.validate().map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        self.tasks[index] = updated;
        self.persist_and_notify();

        Ok(true)
    }

    /// Toggle the task's status undone <-> completed. Returns the new status,
    /// or `None` if the ID is unknown.
    pub fn toggle(&mut self, id: &str) -> Option<Status> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.status = task.status.toggled();
        let status = task.status;

        self.persist_and_notify();
        Some(status)
    }

    /// Swap the task at `index` with its neighbor in the given direction.
    /// Bounds-checked no-op returning `false` when either index is out of
    /// range.
    pub fn move_task(&mut self, index: usize, direction: Direction) -> bool {
        if index >= self.tasks.len() {
            return false;
        }

        let neighbor = match direction {
            Direction::Up => match index.checked_sub(1) {
                Some(i) => i,
                None => return false,
            },
            Direction::Down => index + 1,
        };

        if neighbor >= self.tasks.len() {
            return false;
        }

        self.tasks.swap(index, neighbor);
        self.persist_and_notify();
        true
    }

    /// Run the daily reset if `today` differs from the recorded last-reset
    /// date. Returns whether a reset fired.
    ///
    /// The date strings are compared for equality only. A process reopened
    /// days later catches up with exactly one reset, never one per missed
    /// day, and repeated checks within the same day are no-ops.
    pub fn reset_if_due_on(&mut self, today: &str) -> Result<bool> {
        let last_reset = match self.storage.last_reset() {
            Ok(last) => last,
            Err(e) => {
                log::warn!("Failed to read last reset date: {}", e);
                None
            }
        };
        if last_reset.as_deref() == Some(today) {
            return Ok(false);
        }

        for task in &mut self.tasks {
            task.status = Status::Undone;
            task.count += 1;
        }

        if let Err(e) = self.storage.set_last_reset(today) {
            log::warn!("Failed to record reset date: {}", e);
        }
        self.persist_and_notify();

        log::info!("Daily reset applied for {} ({} tasks)", today, self.tasks.len());
        Ok(true)
    }

    /// Run the daily reset against the current local date.
    pub fn reset_if_due(&mut self) -> Result<bool> {
        self.reset_if_due_on(&Local::now().date_naive().to_string())
    }
}
